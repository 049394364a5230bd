//! deckcheck - layout verification for the markdown slide deck

use clap::{Parser, Subcommand};
use deckcheck_e2e::{E2eError, E2eResult, HarnessConfig, TestRunner};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

/// Render a slide deck in headless Chromium and check its layout
#[derive(Parser)]
#[command(name = "deckcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Directory holding the deck application
    #[arg(long, env = "DECKCHECK_ROOT", global = true)]
    root: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, env = "DECKCHECK_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Chrome/Chromium executable
    #[arg(long, env = "DECKCHECK_CHROME", global = true)]
    chrome: Option<PathBuf>,

    /// Show the browser window
    #[arg(long, global = true)]
    headful: bool,

    /// Disable the Chromium sandbox (containers)
    #[arg(long, global = true)]
    no_sandbox: bool,

    /// Deck aspect ratio, e.g. 16:9
    #[arg(long, global = true)]
    aspect_ratio: Option<String>,

    /// Directory for the JSON results
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check image-grid slides for overflow, bounds, captions and sizes
    Render,

    /// Report header, content and footer geometry for text-heavy slides
    Align,
}

impl Cli {
    fn harness_config(&self) -> E2eResult<HarnessConfig> {
        let mut config = match &self.config {
            Some(path) => HarnessConfig::from_file(path)?,
            None => HarnessConfig::default(),
        };

        if let Some(root) = &self.root {
            config.server.root_dir = root.clone();
        }
        if let Some(chrome) = &self.chrome {
            config.browser.chrome_executable = Some(chrome.clone());
        }
        if self.headful {
            config.browser.headless = false;
        }
        if self.no_sandbox {
            config.browser.sandbox = false;
        }
        if let Some(ratio) = &self.aspect_ratio {
            config.deck.aspect_ratio = ratio.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.log_json);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(E2eError::Violations(report)) => {
            eprintln!("{}", report);
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

/// Logs go to stderr so stdout carries only results
fn init_logging(verbose: bool, json: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: &Cli) -> E2eResult<()> {
    let config = cli.harness_config()?;
    info!(
        "deckcheck v{} serving {}",
        env!("CARGO_PKG_VERSION"),
        config.server.root_dir.display()
    );
    let runner = TestRunner::with_config(config);

    match cli.command {
        Commands::Render => {
            let report = runner.run_render_check().await?;
            if let Some(dir) = &cli.output {
                report.write_to(dir)?;
            }
            report.into_result()?;
            println!("Render checks passed.");
        }
        Commands::Align => {
            let report = runner.run_alignment().await?;
            if let Some(dir) = &cli.output {
                report.write_to(dir)?;
            }
            println!("{}", report.render());
        }
    }

    Ok(())
}
