//! winbarrier: replay debugger sessions against the window proxy.
//!
//! Reads script steps (see `script`) from a file or stdin, drives them
//! through proxy connections over an in-memory host, and prints every
//! message a connection posts as one JSON line on stdout. Logs go to
//! stderr.

mod cli;
mod script;
mod session;

use std::path::Path;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use winbarrier_common::{BarrierError, ConfigError};
use winbarrier_config::BarrierConfig;

use crate::cli::Args;
use crate::script::parse_line;
use crate::session::Session;

fn load_config(path: Option<&Path>) -> Result<BarrierConfig, ConfigError> {
    match path {
        Some(path) => {
            let config = winbarrier_config::load_from_path(path)?;
            winbarrier_config::validation::validate(&config)?;
            Ok(config)
        }
        None => winbarrier_config::load_config(),
    }
}

fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: &Args, config: BarrierConfig) -> Result<(), BarrierError> {
    let input: Box<dyn AsyncRead + Unpin + Send> = match &args.script {
        Some(path) => Box::new(tokio::fs::File::open(path).await?),
        None => Box::new(tokio::io::stdin()),
    };

    let (output_tx, mut output_rx) = mpsc::unbounded_channel::<String>();
    let writer = tokio::spawn(async move {
        while let Some(line) = output_rx.recv().await {
            println!("{line}");
        }
    });

    let mut session = Session::new(config, output_tx);
    let mut lines = BufReader::new(input).lines();
    let mut line_no = 0usize;
    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let step = match parse_line(&line) {
            Ok(Some(step)) => step,
            Ok(None) => continue,
            Err(e) => {
                warn!(line = line_no, "{e}");
                continue;
            }
        };
        if let Err(e) = session.apply(step).await {
            warn!(line = line_no, "step failed: {e}");
        }
    }

    info!(
        connections = session.connection_count(),
        host_windows = session.host().windows().map(|w| w.len()).unwrap_or(0),
        "input finished"
    );
    session.finish().await;
    let _ = writer.await;
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let (config, load_error) = match load_config(args.config.as_deref()) {
        Ok(config) => (config, None),
        Err(e) => (BarrierConfig::default(), Some(e)),
    };

    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.as_str().to_string());
    init_logging(&level);

    if let Some(e) = load_error {
        warn!("{e}; using default config");
    }

    if let Err(e) = run(&args, config).await {
        error!("{e}");
        std::process::exit(1);
    }
}
