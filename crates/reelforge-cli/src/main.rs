use anyhow::Result;
use clap::Parser;

mod args;
mod blueprint_source;
mod cmd;
mod output;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = args::Cli::parse();
    output::init(cli.json);
    init_tracing(cli.json);

    if let Err(e) = cmd::dispatch(cli).await {
        output::eprintln_line(&format!("error: {e}"));
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing(json: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        let _ = tracing_subscriber::fmt().with_env_filter(filter()).json().try_init();
    } else {
        let _ = tracing_subscriber::fmt().with_env_filter(filter()).try_init();
    }
}
