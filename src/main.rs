//! `birdlog` - bird sighting log service and tools.

use clap::Parser;

use birdlog::cli::{self, Cli};
use birdlog::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbosity());
    cli::run(cli).await
}
