use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use effects_tour::{Destination, Host, LogSink, TourConfig};
use tokio::task::LocalSet;

#[derive(Parser)]
#[command(name = "effects-tour")]
#[command(about = "Headless tour of effect handlers and side-effect states")]
struct Cli {
    /// JSON config file; defaults apply to missing fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Screen to open on top of the home screen
    #[arg(long, value_enum)]
    screen: Option<Destination>,

    /// How long to run before shutting down
    #[arg(long, default_value_t = 10)]
    seconds: u64,

    /// Button to click, one per tick; repeatable
    #[arg(long = "click", value_name = "LABEL")]
    clicks: Vec<String>,

    /// List the screens and exit
    #[arg(long)]
    list: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.list {
        for d in Destination::ALL {
            let name = clap::ValueEnum::to_possible_value(&d)
                .map(|v| v.get_name().to_string())
                .unwrap_or_default();
            println!("{name:<26} {}", d.title());
        }
        return Ok(());
    }

    let config = TourConfig::load(cli.config.as_deref()).context("loading tour config")?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_filter)).init();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("building the tokio runtime")?;
    LocalSet::new().block_on(&runtime, run(cli, config))
}

async fn run(cli: Cli, config: TourConfig) -> anyhow::Result<()> {
    let tick = config.tick();
    let total = Duration::from_secs(cli.seconds);

    let mut host = Host::new(config, Rc::new(LogSink));
    host.start();
    if let Some(screen) = cli.screen {
        host.view_model().navigate_to(screen);
    }

    let mut elapsed = Duration::ZERO;
    for label in &cli.clicks {
        host.run_for(tick).await?;
        elapsed += tick;
        host.click(label)?;
    }
    host.run_for(total.saturating_sub(elapsed)).await?;

    log::info!("shutting down after {}s", cli.seconds);
    host.stop();
    Ok(())
}
