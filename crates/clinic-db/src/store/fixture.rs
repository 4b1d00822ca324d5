//! Deterministic seed data for [`MemoryStore`](super::MemoryStore).

use super::memory::Tables;
use crate::models::{Appointment, AppointmentType, Doctor, Notification, Patient, PrpTreatmentRow};
use chrono::{DateTime, TimeZone, Utc};

fn at(month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, month, day, hour, minute, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

fn doctor(id: i64, first_name: &str, last_name: &str, specialty: &str) -> Doctor {
    Doctor {
        id,
        first_name: first_name.into(),
        last_name: last_name.into(),
        specialty: Some(specialty.into()),
        created_at: at(1, 1, 8, 0),
    }
}

fn appointment_type(id: i64, name: &str, color: &str, duration: i32) -> AppointmentType {
    AppointmentType {
        id,
        name: name.into(),
        color: color.into(),
        duration,
    }
}

fn patient(id: i64, first_name: &str, last_name: &str, phone: &str, created_day: u32) -> Patient {
    Patient {
        id,
        first_name: first_name.into(),
        last_name: last_name.into(),
        phone: phone.into(),
        email: None,
        gender: None,
        created_at: at(1, created_day, 9, 0),
        updated_at: at(1, created_day, 9, 0),
    }
}

fn appointment(
    id: i64,
    patient_id: i64,
    doctor_id: i64,
    appointment_type_id: i64,
    date: DateTime<Utc>,
    duration: i32,
    status: &str,
) -> Appointment {
    Appointment {
        id,
        patient_id,
        doctor_id,
        appointment_type_id,
        date,
        duration,
        status: status.into(),
        notes: None,
        created_at: at(1, 1, 8, 0),
        updated_at: at(1, 1, 8, 0),
    }
}

fn prp(id: i64, appointment_id: i64, session_number: i32, price: i64, discount: i64) -> PrpTreatmentRow {
    PrpTreatmentRow {
        id,
        appointment_id,
        session_number,
        session_count: 3,
        price,
        discount,
        total_paid: price - price * discount / 100,
        notes: None,
    }
}

/// Two doctors, three appointment types, four patients, eight appointments
/// between January and March 2025, four PRP sessions and three notifications.
pub(crate) fn seed() -> Tables {
    let mut patients = vec![
        patient(1, "Ayşe", "Yılmaz", "+90 532 111 22 33", 2),
        patient(2, "Can", "Öztürk", "+90 533 222 33 44", 5),
        patient(3, "Zeynep", "Kaya", "+90 534 333 44 55", 9),
        patient(4, "Emre", "Şahin", "+90 535 444 55 66", 12),
    ];
    patients[0].email = Some("ayse@example.com".into());
    patients[0].gender = Some("female".into());

    let mut appointments = vec![
        appointment(1, 1, 1, 1, at(1, 6, 9, 0), 30, "completed"),
        appointment(2, 1, 1, 2, at(1, 13, 10, 0), 45, "completed"),
        appointment(3, 2, 2, 2, at(1, 20, 11, 0), 45, "completed"),
        appointment(4, 3, 1, 3, at(2, 3, 14, 30), 15, "cancelled"),
        appointment(5, 1, 1, 2, at(2, 10, 10, 0), 45, "completed"),
        appointment(6, 4, 2, 2, at(2, 17, 15, 0), 45, "completed"),
        appointment(7, 2, 2, 1, at(3, 3, 9, 30), 30, "confirmed"),
        appointment(8, 3, 1, 1, at(3, 10, 16, 0), 30, "pending"),
    ];
    appointments[3].notes = Some("Patient called to cancel".into());

    Tables {
        doctors: vec![
            doctor(1, "Mehmet", "Demir", "Dermatology"),
            doctor(2, "Elif", "Aydın", "Aesthetic Medicine"),
        ],
        appointment_types: vec![
            appointment_type(1, "Consultation", "#3b82f6", 30),
            appointment_type(2, "PRP", "#ef4444", 45),
            appointment_type(3, "Follow-up", "#10b981", 15),
        ],
        patients,
        appointments,
        prp_treatments: vec![
            prp(1, 2, 1, 3000, 0),
            prp(2, 3, 1, 3000, 10),
            prp(3, 5, 2, 3000, 0),
            prp(4, 6, 1, 2500, 20),
        ],
        notifications: vec![
            Notification {
                id: 1,
                user_id: None,
                title: "Clinic closed".into(),
                message: "The clinic is closed on 1 May.".into(),
                kind: "info".into(),
                is_read: false,
                created_at: at(3, 1, 8, 0),
            },
            Notification {
                id: 2,
                user_id: Some(1),
                title: "New appointment".into(),
                message: "Zeynep Kaya booked a consultation.".into(),
                kind: "appointment".into(),
                is_read: false,
                created_at: at(3, 2, 8, 0),
            },
            Notification {
                id: 3,
                user_id: Some(1),
                title: "Payment received".into(),
                message: "PRP session paid.".into(),
                kind: "payment".into(),
                is_read: true,
                created_at: at(2, 17, 16, 0),
            },
        ],
        ..Tables::default()
    }
    .with_sequences()
}
