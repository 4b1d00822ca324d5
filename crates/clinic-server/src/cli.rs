use crate::config::Backend;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Serve,
    Migrate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help(HelpTopic),
    Serve(ServeArgs),
    Migrate(MigrateArgs),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeArgs {
    pub config: PathBuf,
    pub database: Option<String>,
    pub store: Option<Backend>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrateArgs {
    pub config: PathBuf,
    pub database: Option<String>,
}

const DEFAULT_CONFIG: &str = "clinic.toml";

/// Parse `argv`. No subcommand means `serve`.
pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1).map(|s| s.as_str()).peekable();

    match it.peek().copied() {
        None => parse_serve(it),
        Some("-h" | "--help") => Ok(Command::Help(HelpTopic::Root)),
        Some("help") => {
            it.next();
            let topic = match it.next() {
                None => HelpTopic::Root,
                Some("serve") => HelpTopic::Serve,
                Some("migrate") => HelpTopic::Migrate,
                Some(other) => anyhow::bail!("unknown help topic: {other}"),
            };
            Ok(Command::Help(topic))
        }
        Some("serve") => {
            it.next();
            parse_serve(it)
        }
        Some("migrate") => {
            it.next();
            parse_migrate(it)
        }
        Some(first) if first.starts_with('-') => parse_serve(it),
        Some(first) => anyhow::bail!("unknown command: {first}"),
    }
}

fn parse_serve<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut config = PathBuf::from(DEFAULT_CONFIG);
    let mut database: Option<String> = None;
    let mut store: Option<Backend> = None;

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Serve)),
            "--config" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--config requires a value");
                };
                config = PathBuf::from(v);
            }
            _ if token.starts_with("--config=") => {
                config = PathBuf::from(token.trim_start_matches("--config="));
            }
            "--database" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--database requires a value");
                };
                database = Some(v.to_string());
            }
            _ if token.starts_with("--database=") => {
                database = Some(token.trim_start_matches("--database=").to_string());
            }
            "--store" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--store requires a value");
                };
                store = Some(v.parse()?);
            }
            _ if token.starts_with("--store=") => {
                store = Some(token.trim_start_matches("--store=").parse()?);
            }
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    Ok(Command::Serve(ServeArgs {
        config,
        database,
        store,
    }))
}

fn parse_migrate<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut config = PathBuf::from(DEFAULT_CONFIG);
    let mut database: Option<String> = None;

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Migrate)),
            "--config" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--config requires a value");
                };
                config = PathBuf::from(v);
            }
            _ if token.starts_with("--config=") => {
                config = PathBuf::from(token.trim_start_matches("--config="));
            }
            "--database" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--database requires a value");
                };
                database = Some(v.to_string());
            }
            _ if token.starts_with("--database=") => {
                database = Some(token.trim_start_matches("--database=").to_string());
            }
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    Ok(Command::Migrate(MigrateArgs { config, database }))
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
clinic-server - REST API for patients, appointments, PRP treatments and notifications

USAGE:
  clinic-server [serve] [OPTIONS]
  clinic-server migrate [OPTIONS]

COMMANDS:
  serve         Run the HTTP server (default)
  migrate       Apply the embedded schema migrations and exit

Run `clinic-server help <command>` for more."
            );
        }
        HelpTopic::Serve => {
            println!(
                "\
USAGE:
  clinic-server serve [OPTIONS]

OPTIONS:
  --config <FILE>       Config file path (default: clinic.toml)
  --database <URL>      Override database.url from config
  --store <BACKEND>     postgres or memory (overrides store.backend)
  -h, --help            Print help

ENVIRONMENT:
  DATABASE_URL, CLINIC_HOST, CLINIC_PORT, CLINIC_STORE, RUST_LOG"
            );
        }
        HelpTopic::Migrate => {
            println!(
                "\
USAGE:
  clinic-server migrate [OPTIONS]

OPTIONS:
  --config <FILE>       Config file path (default: clinic.toml)
  --database <URL>      Database URL (overrides config)
  -h, --help            Print help"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_arguments_serves_with_defaults() {
        let cmd = parse_args(&args(&["clinic-server"])).unwrap();
        assert_eq!(
            cmd,
            Command::Serve(ServeArgs {
                config: PathBuf::from("clinic.toml"),
                database: None,
                store: None,
            })
        );
    }

    #[test]
    fn serve_flags_without_subcommand() {
        let cmd = parse_args(&args(&[
            "clinic-server",
            "--store=memory",
            "--config",
            "deploy/clinic.toml",
        ]))
        .unwrap();
        let Command::Serve(serve) = cmd else {
            panic!("expected serve");
        };
        assert_eq!(serve.store, Some(Backend::Memory));
        assert_eq!(serve.config, PathBuf::from("deploy/clinic.toml"));
    }

    #[test]
    fn parse_migrate_with_database() {
        let cmd = parse_args(&args(&[
            "clinic-server",
            "migrate",
            "--database=postgres://localhost/clinic",
        ]))
        .unwrap();
        let Command::Migrate(m) = cmd else {
            panic!("expected migrate");
        };
        assert_eq!(m.database.as_deref(), Some("postgres://localhost/clinic"));
    }

    #[test]
    fn help_command_and_flags() {
        for flag in ["help", "-h", "--help"] {
            assert_eq!(
                parse_args(&args(&["clinic-server", flag])).unwrap(),
                Command::Help(HelpTopic::Root)
            );
        }
        assert_eq!(
            parse_args(&args(&["clinic-server", "help", "migrate"])).unwrap(),
            Command::Help(HelpTopic::Migrate)
        );
        assert_eq!(
            parse_args(&args(&["clinic-server", "serve", "--help"])).unwrap(),
            Command::Help(HelpTopic::Serve)
        );
        assert!(parse_args(&args(&["clinic-server", "help", "seed"])).is_err());
    }

    #[test]
    fn rejects_unknown_input() {
        assert!(parse_args(&args(&["clinic-server", "seed"])).is_err());
        assert!(parse_args(&args(&["clinic-server", "--store", "sqlite"])).is_err());
        assert!(parse_args(&args(&["clinic-server", "migrate", "--store=memory"])).is_err());
    }
}
