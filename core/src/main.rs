use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use webinar_probe::{run_suites, ApiClient, ProbeConfig, SuiteKind};

/// Run expectation suites against the webinar API
#[derive(Parser, Debug)]
#[command(name = "webinar-probe")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Origin of the API under test; requests go to <ORIGIN>/api/<path>
    /// [default: $WEBINAR_API_ORIGIN or http://localhost:3000]
    #[arg(long)]
    origin: Option<String>,

    /// Per-request timeout in seconds [default: $WEBINAR_API_TIMEOUT_SECS or 10]
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,

    /// Account used to obtain a bearer token for protected suites
    #[arg(long, env = "WEBINAR_API_EMAIL", default_value = "admin@wowadmin.com")]
    email: String,

    /// Password for --email
    #[arg(long, env = "WEBINAR_API_PASS", default_value = "", hide_env_values = true)]
    pass: String,

    /// Suites to run (all when omitted)
    #[arg(value_enum)]
    suites: Vec<SuiteKind>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ProbeConfig::from_env();
    if let Some(origin) = cli.origin {
        config.origin = origin;
    }
    if let Some(secs) = cli.timeout_secs {
        config.timeout_secs = secs;
    }
    tracing::debug!(?config, "resolved configuration");

    let client = match ApiClient::from_config(&config) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("[ERROR] {err}");
            return ExitCode::from(2);
        }
    };

    let suites = if cli.suites.is_empty() {
        SuiteKind::ALL.to_vec()
    } else {
        cli.suites
    };

    let report = match run_suites(&client, &suites, &cli.email, &cli.pass) {
        Ok(report) => report,
        Err(err) => {
            tracing::error!(email = %cli.email, error = %err, "login failed");
            eprintln!("[ERROR] login as {} failed: {err}", cli.email);
            return ExitCode::from(2);
        }
    };

    println!("{report}");
    ExitCode::from(report.exit_code() as u8)
}
