use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use studycoor_core::{
    constants::UTC_OFFSET_ENV, describe_token, wire::render_yaml, Bottle, CalculationRecord,
    ComplianceEngine, CoreConfig, DosingFrequency, VisitRecord,
};
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser)]
#[command(name = "studycoor")]
#[command(about = "StudyCoor medication compliance CLI")]
struct Cli {
    /// Study calendar UTC offset (e.g. +10:00). Falls back to STUDYCOOR_UTC_OFFSET, then UTC.
    #[arg(long, global = true)]
    utc_offset: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute compliance for one drug over one window
    Compute {
        /// YAML calculation record; when given, the other inputs are ignored
        #[arg(long)]
        file: Option<PathBuf>,
        /// Window start (YYYY-MM-DD or RFC 3339)
        #[arg(long, required_unless_present = "file")]
        start: Option<String>,
        /// Window end (YYYY-MM-DD or RFC 3339)
        #[arg(long, required_unless_present = "file")]
        end: Option<String>,
        /// QD, BID, TID, QID or PRN
        #[arg(long)]
        frequency: Option<DosingFrequency>,
        #[arg(long, default_value_t = 0.0)]
        dispensed: f64,
        #[arg(long, default_value_t = 0.0)]
        returned: f64,
        #[arg(long, default_value_t = 0.0)]
        missed: f64,
        #[arg(long, default_value_t = 0.0)]
        extra: f64,
        #[arg(long, default_value_t = 0)]
        hold_days: i64,
        /// Keep fractional doses instead of rounding
        #[arg(long)]
        partial: bool,
        /// Expected doses per day for PRN
        #[arg(long)]
        prn_target: Option<f64>,
        /// Expected doses on the first day
        #[arg(long)]
        first_day: Option<i64>,
        /// Expected doses on the last day
        #[arg(long)]
        last_day: Option<i64>,
        /// Bottle as LABEL=DISPENSED[/RETURNED]; repeatable, replaces the aggregate counts
        #[arg(long = "bottle", value_parser = parse_bottle)]
        bottles: Vec<Bottle>,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Compute compliance for every drug in a visit
    Visit {
        /// YAML visit record
        #[arg(long)]
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// List dosing frequencies
    Frequencies,
    /// Describe a flag token (e.g. UNDERUSE, HOLD_DAYS:3)
    DescribeFlag { token: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
    Yaml,
}

/// Parse `LABEL=DISPENSED[/RETURNED]`.
fn parse_bottle(value: &str) -> Result<Bottle, String> {
    let (label, counts) = value
        .split_once('=')
        .ok_or_else(|| format!("expected LABEL=DISPENSED[/RETURNED], got '{value}'"))?;
    let label = label.trim();
    if label.is_empty() {
        return Err("bottle label cannot be empty".into());
    }

    let (dispensed, returned) = match counts.split_once('/') {
        Some((d, r)) => (d, r),
        None => (counts, "0"),
    };
    let number = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|_| format!("invalid bottle count '{}'", s.trim()))
    };

    Ok(Bottle::new(label, number(dispensed)?, number(returned)?))
}

fn emit<T: Serialize>(
    value: &T,
    format: Format,
    text: impl FnOnce(&T) -> Result<String, std::fmt::Error>,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        Format::Text => print!("{}", text(value)?),
        Format::Json => println!("{}", serde_json::to_string_pretty(value)?),
        Format::Yaml => print!("{}", render_yaml(value)?),
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = CoreConfig::from_env_value(
        cli.utc_offset
            .clone()
            .or_else(|| std::env::var(UTC_OFFSET_ENV).ok()),
    )?;

    match cli.command {
        Some(Commands::Compute {
            file,
            start,
            end,
            frequency,
            dispensed,
            returned,
            missed,
            extra,
            hold_days,
            partial,
            prn_target,
            first_day,
            last_day,
            bottles,
            format,
        }) => {
            let record = match file {
                Some(path) => {
                    tracing::debug!(path = %path.display(), "reading calculation record");
                    CalculationRecord::parse(&std::fs::read_to_string(path)?)?
                }
                None => CalculationRecord {
                    start_date: start.unwrap_or_default(),
                    end_date: end.unwrap_or_default(),
                    frequency,
                    dispensed,
                    returned,
                    missed_doses: missed,
                    extra_doses: extra,
                    hold_days,
                    partial_dose_enabled: partial.then_some(true),
                    prn_target_per_day: prn_target,
                    first_day_expected_override: first_day,
                    last_day_expected_override: last_day,
                    bottles,
                    study_defaults: None,
                    drug_defaults: None,
                },
            };
            let result = ComplianceEngine::compute(&record.to_input()?, cfg.calendar())?;
            emit(&result, format, render::compliance_text)?;
        }
        Some(Commands::Visit { file, format }) => {
            tracing::debug!(path = %file.display(), "reading visit record");
            let record = VisitRecord::parse(&std::fs::read_to_string(file)?)?;
            let result = record.to_visit()?.compute(cfg.calendar())?;
            emit(&result, format, render::visit_text)?;
        }
        Some(Commands::Frequencies) => {
            for frequency in DosingFrequency::ALL {
                let per_day = frequency
                    .doses_per_day()
                    .map_or_else(|| "target".to_string(), |n| n.to_string());
                println!("{:<4} {:<18} {}", frequency.code(), frequency.label(), per_day);
            }
        }
        Some(Commands::DescribeFlag { token }) => {
            println!("{}", describe_token(&token));
        }
        None => {
            println!("Use 'studycoor --help' for commands");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bottle_reads_label_and_counts() {
        let bottle = parse_bottle("B1=30/4").expect("bottle");
        assert_eq!(bottle, Bottle::new("B1", 30.0, 4.0));
    }

    #[test]
    fn parse_bottle_defaults_returned_to_zero() {
        assert_eq!(parse_bottle("B2=28").expect("bottle"), Bottle::new("B2", 28.0, 0.0));
    }

    #[test]
    fn parse_bottle_rejects_malformed_values() {
        assert!(parse_bottle("30/4").is_err());
        assert!(parse_bottle("=30").is_err());
        assert!(parse_bottle("B1=thirty").is_err());
    }

    #[test]
    fn compute_requires_dates_without_file() {
        assert!(Cli::try_parse_from(["studycoor", "compute", "--dispensed", "10"]).is_err());
        assert!(Cli::try_parse_from(["studycoor", "compute", "--file", "calc.yaml"]).is_ok());
    }

    #[test]
    fn compute_parses_frequency_and_repeated_bottles() {
        let cli = Cli::try_parse_from([
            "studycoor",
            "--utc-offset",
            "+10:00",
            "compute",
            "--start",
            "2025-01-01",
            "--end",
            "2025-01-10",
            "--frequency",
            "bid",
            "--bottle",
            "A=10",
            "--bottle",
            "B=12/2",
            "--format",
            "json",
        ])
        .expect("parse args");

        assert_eq!(cli.utc_offset.as_deref(), Some("+10:00"));
        match cli.command {
            Some(Commands::Compute {
                frequency,
                bottles,
                format,
                ..
            }) => {
                assert_eq!(frequency, Some(DosingFrequency::Bid));
                assert_eq!(bottles.len(), 2);
                assert_eq!(format, Format::Json);
            }
            _ => panic!("expected compute"),
        }
    }
}
