use std::path::PathBuf;

use clap::Parser;

use crate::utils::version;

#[derive(Parser, Debug)]
#[command(author, version = version(), about)]
pub struct Cli {
    #[arg(
        short,
        long,
        value_name = "COUNT",
        help = "Number of messages in the synthetic conversation",
        default_value_t = 500
    )]
    pub messages: u64,

    #[arg(
        short,
        long,
        value_name = "MILLIS",
        help = "Simulated store latency per fetch, in milliseconds",
        default_value_t = 0
    )]
    pub latency_ms: u64,

    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Replay session events from a JSON file instead of the built-in tour"
    )]
    pub script: Option<PathBuf>,
}
