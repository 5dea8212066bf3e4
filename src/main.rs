use clap::Parser;
use market_snapshot::app::{self, RunOptions};
use std::process::ExitCode;

/// Fetch market data, render the report and email it
#[derive(Debug, Parser)]
#[command(name = "market-report", version)]
struct Cli {
    /// Report label used in the subject line
    #[arg(default_value = "daily")]
    kind: String,

    /// Print the HTML report instead of sending it
    #[arg(long)]
    dry_run: bool,

    /// Print the resolved snapshot as JSON before sending
    #[arg(long, conflicts_with = "dry_run")]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "market_snapshot=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = RunOptions {
        kind: cli.kind,
        dry_run: cli.dry_run,
        print_json: cli.json,
    };

    match app::run(options).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_daily() {
        let cli = Cli::try_parse_from(["market-report"]).unwrap();
        assert_eq!(cli.kind, "daily");
        assert!(!cli.dry_run);
        assert!(!cli.json);
    }

    #[test]
    fn test_json_and_dry_run_conflict() {
        assert!(Cli::try_parse_from(["market-report", "--json", "--dry-run"]).is_err());
        assert!(Cli::try_parse_from(["market-report", "weekly", "--json"]).is_ok());
        assert!(Cli::try_parse_from(["market-report", "--dry-run"]).is_ok());
    }
}
