//! PRP earnings report over an inclusive day range.

use crate::error::{OrmError, OrmResult};
use crate::filter::{FilterKey, FilterSet, end_of_day, start_of_day};
use crate::models::{PrpTreatment, non_blank};
use chrono::{DateTime, NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Inclusive calendar-day range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> OrmResult<Self> {
        if from > to {
            return Err(OrmError::validation(format!(
                "from_date {from} is after to_date {to}"
            )));
        }
        Ok(Self { from, to })
    }

    /// The `n` days ending with `today`, `today` included.
    pub fn last_days(today: NaiveDate, n: u32) -> Self {
        let back = TimeDelta::days(i64::from(n.max(1)) - 1);
        Self {
            from: today - back,
            to: today,
        }
    }

    /// Number of days covered, never less than one.
    pub fn days(&self) -> i64 {
        ((self.to - self.from).num_days() + 1).max(1)
    }

    pub fn contains(&self, treatment: &PrpTreatment) -> bool {
        treatment.date >= start_of_day(self.from) && treatment.date <= end_of_day(self.to)
    }

    /// Filters that select this range from the treatment list.
    pub fn to_filter_set(&self) -> FilterSet {
        FilterSet::new()
            .set(FilterKey::FromDate, start_of_day(self.from))
            .set(FilterKey::ToDate, end_of_day(self.to))
    }
}

/// Earnings on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyEarnings {
    pub date: NaiveDate,
    pub total: i64,
}

/// Summary of PRP earnings over a [`DateRange`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrpReport {
    pub range: DateRange,
    pub total_earnings: i64,
    pub treatment_count: usize,
    pub days: i64,
    pub daily_average: f64,
    pub weekly_average: f64,
    pub monthly_average: f64,
    pub daily: Vec<DailyEarnings>,
}

impl PrpReport {
    /// Summarize the treatments that fall inside `range`. Others are ignored.
    pub fn build(range: DateRange, treatments: &[PrpTreatment]) -> Self {
        let mut per_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
        let mut total_earnings = 0;
        let mut treatment_count = 0;

        for t in treatments.iter().filter(|t| range.contains(t)) {
            total_earnings += t.treatment.total_paid;
            treatment_count += 1;
            *per_day.entry(t.date.date_naive()).or_default() += t.treatment.total_paid;
        }

        let days = range.days();
        let total = total_earnings as f64;
        let days_f = days as f64;

        Self {
            range,
            total_earnings,
            treatment_count,
            days,
            daily_average: total / days_f,
            weekly_average: total / (days_f / 7.0).max(1.0),
            monthly_average: total / (days_f / 30.0).max(1.0),
            daily: per_day
                .into_iter()
                .map(|(date, total)| DailyEarnings { date, total })
                .collect(),
        }
    }
}

/// Query-string shape of the report endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrpReportQuery {
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

impl PrpReportQuery {
    /// Days the report covers when no bound is given.
    pub const DEFAULT_DAYS: u32 = 30;

    /// Resolve the range. A missing `to_date` is `today`; a missing
    /// `from_date` goes back [`Self::DEFAULT_DAYS`] from `to_date`.
    pub fn to_range(&self, today: NaiveDate) -> OrmResult<DateRange> {
        let to = match non_blank(self.to_date.clone()) {
            Some(raw) => parse_day(&raw)?,
            None => today,
        };
        let from = match non_blank(self.from_date.clone()) {
            Some(raw) => parse_day(&raw)?,
            None => DateRange::last_days(to, Self::DEFAULT_DAYS).from,
        };
        DateRange::new(from, to)
    }
}

fn parse_day(raw: &str) -> OrmResult<NaiveDate> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.date_naive());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| OrmError::validation(format!("invalid date '{raw}'")))
}
