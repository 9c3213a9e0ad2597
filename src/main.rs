use anyhow::Result;
use clap::Parser;
use deepreport_rs::cli;
use deepreport_rs::launch;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();
    let topic = args.topic.clone();
    let config = args.into_config()?;

    // RUST_LOG优先，否则按verbose选择日志级别；日志写到stderr，stdout只留给报告
    let default_level = if config.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    launch(&config, &topic).await?;
    Ok(())
}
