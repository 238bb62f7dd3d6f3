use clap::Parser;
use socat_dsg::cli::{run, Cli};
use socat_dsg::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
