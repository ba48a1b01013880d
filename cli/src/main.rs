use anyhow::Result;
use clap::Parser;
use search_cli::{run, Cli};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    for line in run(Cli::parse())? {
        println!("{line}");
    }
    Ok(())
}
