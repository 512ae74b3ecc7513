//! `designflow` -- start a design generation and print the result.
//!
//! Submits one generation request to the design backend, polls the job
//! until it finishes, then prints the hierarchy as an indented tree (or,
//! with `--json`, the laid-out graph).
//!
//! # Environment variables
//!
//! | Variable               | Required | Default                     | Description                       |
//! |------------------------|----------|-----------------------------|-----------------------------------|
//! | `DESIGN_API_URL`       | no       | `http://localhost:5000/api` | Backend base URL                  |
//! | `DESIGN_API_TOKEN`     | no       | --                          | Bearer token for every request    |
//! | `REQUEST_TIMEOUT_SECS` | no       | `30`                        | Per-request HTTP timeout          |
//! | `POLL_INTERVAL_MS`     | no       | `3000`                      | Delay between status checks       |
//! | `POLL_MAX_ATTEMPTS`    | no       | --                          | Give up after this many checks    |
//! | `LAYOUT_SPACING_X`     | no       | `320`                       | Horizontal distance between depths |
//! | `LAYOUT_SPACING_Y`     | no       | `260`                       | Vertical distance between siblings |

use designflow_client::outcome::PollOutcome;
use designflow_studio::cli::{self, CliOptions};
use designflow_studio::config::StudioConfig;
use designflow_studio::render;
use designflow_studio::session::DesignSession;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let options = match cli::parse_options(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(()) => {
            eprintln!("{}", cli::USAGE);
            std::process::exit(2);
        }
    };

    let config = match StudioConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("designflow: {e}");
            std::process::exit(2);
        }
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "designflow_studio=info,designflow_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(message) = run(&options, &config).await {
        eprintln!("designflow: {message}");
        std::process::exit(1);
    }
}

async fn run(options: &CliOptions, config: &StudioConfig) -> Result<(), String> {
    tracing::info!(api_url = %config.api_url, "Starting designflow");

    let session = DesignSession::from_config(config).map_err(|e| e.to_string())?;
    let handle = session
        .generate(&options.to_request())
        .await
        .map_err(|e| e.to_string())?;

    let outcome = tokio::select! {
        outcome = handle.outcome() => outcome,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, cancelling poll");
            session.shutdown().await;
            return Err("interrupted".to_string());
        }
    };

    match outcome {
        Some(PollOutcome::Resolved { .. }) => {}
        Some(PollOutcome::Failed { error, .. }) => return Err(error.to_string()),
        Some(PollOutcome::TimedOut { attempts, .. }) => {
            return Err(format!("job did not finish after {attempts} status checks"));
        }
        None => return Err("poll was cancelled".to_string()),
    }

    if options.json {
        let output = render::render_layout_json(session.summary().await, &session.layout().await)
            .map_err(|e| e.to_string())?;
        println!("{output}");
    } else {
        print!("{}", render::render_tree(&session.snapshot().await));
    }

    session.shutdown().await;
    Ok(())
}
