//! Stellar Tales command-line entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Parse CLI args
//!   3. Load config
//!   4. Resolve effective log level (CLI `-v` flags > env > config)
//!   5. Init logger once
//!   6. Build service clients
//!   7. Run the requested command

use stellar_tales::enrich::{ContentField, SessionHandle};
use stellar_tales::error::AppError;
use stellar_tales::model::Subject;
use stellar_tales::service::HttpStellarTales;
use stellar_tales::{config, logger};
use tracing::{debug, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present; the file is optional.
    let _ = dotenvy::dotenv();

    let args = match parse_cli_args(std::env::args().skip(1))? {
        Parsed::Help => {
            print_usage();
            return Ok(());
        }
        Parsed::Run(args) => args,
    };

    let config = config::load(args.config_path.as_deref())?;

    let effective_log_level = args.log_level.unwrap_or(config.log_level.as_str());
    logger::init(effective_log_level, args.log_level.is_some())?;

    info!(version = env!("CARGO_PKG_VERSION"), "stellar-tales starting");
    let app = HttpStellarTales::from_config(&config)?;

    match args.command {
        Command::Apod { attempts } => {
            let budget = attempts.unwrap_or(app.default_attempts());
            let picture = app.resolve_picture_of_day(budget).await?;
            println!("{} ({})", picture.title, picture.date);
            println!("{}", picture.url);
            if let Some(credit) = &picture.attribution {
                println!("Credit: {credit}");
            }
            println!();
            println!("{}", picture.explanation);
        }
        Command::Search { query } => {
            let results = app.search(&query).await?;
            if results.is_empty() {
                println!("No results for '{query}'.");
            }
            for subject in results {
                println!("{} [{}]", subject.display_name, subject.category);
                println!("  {}", subject.summary);
                println!("  {}", subject.image_url);
            }
        }
        Command::Enrich { name, fields } => {
            let subject = Subject::named(name);
            let handle = match fields {
                Some(fields) => app.enrich_subject(subject, fields),
                None => app.enrich_subject_default(subject),
            };
            print_session(handle).await;
        }
    }

    Ok(())
}

/// Report progress as fields settle, then print every field's text.
async fn print_session(mut handle: SessionHandle) {
    let total = handle.snapshot().fields.len();
    while handle.changed().await {
        let pending = handle.snapshot().pending();
        debug!(pending, total, "enrichment progress");
        if pending == 0 {
            break;
        }
    }

    let session = handle.wait().await;
    let subject = session.enriched_subject();
    println!("{} [{}]", subject.display_name, subject.category);
    if let Some(m) = subject.magnitude {
        println!("Apparent magnitude: {m}");
    }
    if let Some(ly) = subject.distance.as_ref().and_then(|d| d.light_years) {
        println!("Distance: {ly} light years");
    }
    for (field, state) in &session.fields {
        println!();
        println!("== {} ==", field.title());
        println!("{}", state.display_text().unwrap_or_default());
    }
}

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq)]
enum Command {
    Apod { attempts: Option<u32> },
    Search { query: String },
    Enrich { name: String, fields: Option<Vec<ContentField>> },
}

#[derive(Debug, PartialEq)]
struct CliArgs {
    log_level: Option<&'static str>,
    config_path: Option<String>,
    command: Command,
}

#[derive(Debug, PartialEq)]
enum Parsed {
    Help,
    Run(CliArgs),
}

fn print_usage() {
    println!("Usage: stellar-tales [OPTIONS] <COMMAND>");
    println!();
    println!("Commands:");
    println!("  apod [--attempts <N>]                  Resolve the latest picture of the day");
    println!("  search <QUERY>                         Look up a subject by name");
    println!("  enrich <NAME> [--fields <a,b,...>]     Fetch content fields for a subject");
    println!();
    println!("Options:");
    println!("  -h, --help                 Print help");
    println!("  -f, --config <PATH>        Path to configuration file (default: config/default.toml)");
    println!("  -v, -vv, -vvv, -vvvv       Increase logging verbosity");
}

fn parse_cli_args(args: impl IntoIterator<Item = String>) -> Result<Parsed, AppError> {
    let mut verbosity = 0u8;
    let mut config_path = None;
    let mut attempts = None;
    let mut fields = None;
    let mut positional: Vec<String> = Vec::new();

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if arg == "--" {
            positional.extend(iter.by_ref());
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => return Ok(Parsed::Help),
            "-f" | "--config" => {
                let path = iter.next().ok_or_else(|| AppError::Usage("-f/--config requires a path argument".into()))?;
                config_path = Some(path);
            }
            "--attempts" => {
                let raw = iter.next().ok_or_else(|| AppError::Usage("--attempts requires a number".into()))?;
                let n = raw
                    .parse::<u32>()
                    .map_err(|_| AppError::Usage(format!("--attempts expects a whole number, got '{raw}'")))?;
                attempts = Some(n);
            }
            "--fields" => {
                let raw = iter.next().ok_or_else(|| AppError::Usage("--fields requires a list".into()))?;
                let parsed = raw
                    .split(',')
                    .filter(|s| !s.trim().is_empty())
                    .map(str::parse::<ContentField>)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(AppError::Usage)?;
                fields = Some(parsed);
            }
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            a if a.starts_with('-') && a.len() > 1 => {
                return Err(AppError::Usage(format!("unknown option '{a}'")));
            }
            other => positional.push(other.to_string()),
        }
    }

    // Each -v raises verbosity one tier:
    //   -v      → warn
    //   -vv     → info
    //   -vvv    → debug
    //   -vvvv+  → trace
    let log_level = match verbosity {
        0 => None,
        1 => Some("warn"),
        2 => Some("info"),
        3 => Some("debug"),
        _ => Some("trace"),
    };

    let mut positional = positional.into_iter();
    let command = match positional.next().as_deref() {
        Some("apod") => Command::Apod { attempts },
        Some("search") => Command::Search { query: join_rest(positional, "search")? },
        Some("enrich") => Command::Enrich { name: join_rest(positional, "enrich")?, fields },
        Some(other) => return Err(AppError::Usage(format!("unknown command '{other}'"))),
        None => return Err(AppError::Usage("missing command (try --help)".into())),
    };

    Ok(Parsed::Run(CliArgs { log_level, config_path, command }))
}

fn join_rest(rest: impl Iterator<Item = String>, command: &str) -> Result<String, AppError> {
    let joined = rest.collect::<Vec<_>>().join(" ");
    if joined.trim().is_empty() {
        return Err(AppError::Usage(format!("{command} requires a subject name")));
    }
    Ok(joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Parsed, AppError> {
        parse_cli_args(args.iter().map(|s| s.to_string()))
    }

    fn run_args(args: &[&str]) -> CliArgs {
        match parse(args).unwrap() {
            Parsed::Run(a) => a,
            Parsed::Help => panic!("unexpected help"),
        }
    }

    #[test]
    fn apod_with_budget() {
        let a = run_args(&["apod", "--attempts", "4"]);
        assert_eq!(a.command, Command::Apod { attempts: Some(4) });
        assert!(a.log_level.is_none());
    }

    #[test]
    fn search_joins_words() {
        let a = run_args(&["-vvv", "search", "Crab", "Nebula"]);
        assert_eq!(a.command, Command::Search { query: "Crab Nebula".into() });
        assert_eq!(a.log_level, Some("debug"));
    }

    #[test]
    fn enrich_with_fields_and_config() {
        let a = run_args(&["-f", "alt.toml", "enrich", "Vega", "--fields", "history,measurements"]);
        assert_eq!(a.config_path.as_deref(), Some("alt.toml"));
        assert_eq!(
            a.command,
            Command::Enrich {
                name: "Vega".into(),
                fields: Some(vec![ContentField::NarrativeHistory, ContentField::StructuredMeasurements]),
            }
        );
    }

    #[test]
    fn help_short_circuits() {
        assert_eq!(parse(&["search", "-h"]).unwrap(), Parsed::Help);
    }

    #[test]
    fn usage_errors() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["launch"]).is_err());
        assert!(parse(&["search"]).is_err());
        assert!(parse(&["apod", "--attempts", "many"]).is_err());
        assert!(parse(&["enrich", "Vega", "--fields", "horoscope"]).is_err());
        assert!(parse(&["--frobnicate", "apod"]).is_err());
    }

    #[test]
    fn double_dash_ends_options() {
        let a = run_args(&["search", "--", "-v"]);
        assert_eq!(a.command, Command::Search { query: "-v".into() });
    }
}
