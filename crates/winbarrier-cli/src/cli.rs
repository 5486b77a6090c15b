use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "winbarrier",
    about = "Replay debugger sessions against an access-controlled window proxy"
)]
pub struct Args {
    /// Config file (defaults to the platform config directory).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level, overriding the config file. RUST_LOG wins over both.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Script of JSON steps, one per line. Reads stdin when omitted.
    pub script: Option<PathBuf>,
}
