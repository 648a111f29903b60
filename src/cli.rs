use std::path::PathBuf;

pub const USAGE: &str = "Usage: ts-calendar [--config <path>] [--port <n>] [--database <path>] [--init-db]";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOptions {
    pub config: Option<PathBuf>,
    pub port: Option<u16>,
    pub database: Option<PathBuf>,
    pub init_db: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliMode {
    Serve(CliOptions),
    InitDb(CliOptions),
    Help,
}

fn value_for<I: Iterator<Item = String>>(flag: &str, args: &mut I) -> Result<String, String> {
    match args.next() {
        Some(value) if !value.starts_with("--") => Ok(value),
        _ => Err(format!("Missing value for {}", flag)),
    }
}

pub fn parse_args<I>(args: I) -> Result<CliMode, String>
where
    I: IntoIterator<Item = String>,
{
    let mut options = CliOptions::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                options.config = Some(PathBuf::from(value_for("--config", &mut args)?));
            }
            "--database" => {
                options.database = Some(PathBuf::from(value_for("--database", &mut args)?));
            }
            "--port" => {
                let raw = value_for("--port", &mut args)?;
                let port = raw
                    .parse::<u16>()
                    .map_err(|_| format!("Invalid port '{}'.", raw))?;
                options.port = Some(port);
            }
            "--init-db" => options.init_db = true,
            "--help" | "-h" => return Ok(CliMode::Help),
            _ => return Err(format!("Unknown argument: {}", arg)),
        }
    }

    if options.init_db {
        Ok(CliMode::InitDb(options))
    } else {
        Ok(CliMode::Serve(options))
    }
}

pub fn parse_cli_mode() -> Result<CliMode, String> {
    parse_args(std::env::args().skip(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliMode, String> {
        parse_args(args.iter().map(|arg| arg.to_string()))
    }

    #[test]
    fn no_arguments_serves_with_defaults() {
        assert_eq!(parse(&[]), Ok(CliMode::Serve(CliOptions::default())));
    }

    #[test]
    fn overrides_are_collected() {
        let mode = parse(&["--port", "8080", "--database", "/tmp/cal.db"]).unwrap();

        assert_eq!(
            mode,
            CliMode::Serve(CliOptions {
                port: Some(8080),
                database: Some(PathBuf::from("/tmp/cal.db")),
                ..CliOptions::default()
            })
        );
    }

    #[test]
    fn init_db_switches_mode() {
        let mode = parse(&["--init-db", "--config", "custom.toml"]).unwrap();

        assert!(matches!(mode, CliMode::InitDb(ref opts) if opts.config == Some(PathBuf::from("custom.toml"))));
    }

    #[test]
    fn rejects_bad_port_and_unknown_flags() {
        assert_eq!(parse(&["--port", "http"]), Err("Invalid port 'http'.".to_string()));
        assert_eq!(parse(&["--port"]), Err("Missing value for --port".to_string()));
        assert_eq!(parse(&["--verbose"]), Err("Unknown argument: --verbose".to_string()));
    }

    #[test]
    fn help_short_circuits() {
        assert_eq!(parse(&["--port", "1", "--help", "--bogus"]), Ok(CliMode::Help));
    }
}
