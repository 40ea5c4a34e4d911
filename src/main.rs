use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use swag_e2e::browser::{BrowserDriver, BrowserKind, WebDriver, WebDriverConfig};
use swag_e2e::fixtures::FixtureSet;
use swag_e2e::runner::{ConsoleEventListener, RunConfig, Runner};
use swag_e2e::scenarios;
use swag_e2e::selectors::SelectorRegistry;

#[derive(Parser)]
#[command(name = "swag-e2e")]
#[command(version = "0.1.0")]
#[command(about = "Declarative end-to-end tests for the Swag Labs storefront", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run scenarios from the built-in catalog
    Run {
        /// Filter scenarios by tags (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        tags: Option<Vec<String>>,

        /// Browser engine (chromium, firefox, webkit)
        #[arg(short, long, default_value = "chromium")]
        browser: String,

        /// Run with a visible browser window
        #[arg(long, default_value = "false")]
        headed: bool,

        /// Additional attempts granted to retryable failures
        #[arg(long, default_value = "1")]
        retries: u32,

        /// Per-wait timeout in milliseconds
        #[arg(long, default_value = "10000")]
        timeout_ms: u64,

        /// Overall budget per scenario attempt, in milliseconds
        #[arg(long, default_value = "90000")]
        scenario_timeout_ms: u64,

        /// Output directory for reports and artifacts
        #[arg(short, long, default_value = "./reports")]
        output: PathBuf,

        /// Capture screenshots for passing scenarios too
        #[arg(long, default_value = "false")]
        always_capture: bool,

        /// Directory holding users.yaml and steps.yaml
        #[arg(short, long, default_value = "./fixtures")]
        fixtures: PathBuf,
    },

    /// Validate fixtures and the selector map without opening a browser
    Validate {
        /// Directory holding users.yaml and steps.yaml
        #[arg(short, long, default_value = "./fixtures")]
        fixtures: PathBuf,
    },

    /// List the scenario catalog
    List {
        /// Filter scenarios by tags (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        tags: Option<Vec<String>>,
    },
}

fn load_fixtures(dir: &Path) -> anyhow::Result<FixtureSet> {
    let users = dir.join("users.yaml");
    let steps = dir.join("steps.yaml");
    FixtureSet::load(&users, &steps)
        .with_context(|| format!("loading fixtures from {}", dir.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            tags,
            browser,
            headed,
            retries,
            timeout_ms,
            scenario_timeout_ms,
            output,
            always_capture,
            fixtures,
        } => {
            if timeout_ms == 0 || scenario_timeout_ms == 0 {
                anyhow::bail!("timeouts must be positive");
            }
            let browser = BrowserKind::from_str(&browser)?;
            let selectors = Arc::new(SelectorRegistry::storefront()?);
            let fixture_set = Arc::new(load_fixtures(&fixtures)?);

            let tags = tags.unwrap_or_default();
            println!("{} Running the scenario catalog", "▶".green().bold());
            println!("  Browser: {}", browser.as_str().cyan());
            if !tags.is_empty() {
                println!("  Tags: {}", tags.join(", ").yellow());
            }
            println!("  Output: {}", output.display().to_string().cyan());

            let config = RunConfig {
                browser,
                headless: !headed,
                timeout_ms,
                scenario_timeout_ms,
                retries,
                output_dir: output,
                always_capture,
                tags,
            };

            let (runner, receiver) = Runner::new(config, selectors, fixture_set);
            let listener = tokio::spawn(ConsoleEventListener::listen(receiver));

            let driver = WebDriver::new(WebDriverConfig {
                browser,
                headless: !headed,
                ..WebDriverConfig::default()
            })
            .await
            .context("launching the browser")?;
            let driver: Arc<dyn BrowserDriver> = Arc::new(driver);

            let result = runner.run(driver.clone(), &scenarios::catalog()).await;

            if let Err(e) = driver.close().await {
                log::warn!("browser close failed: {e}");
            }
            drop(runner);
            let _ = listener.await;

            let summary = result?;
            if summary.failed > 0 {
                std::process::exit(1);
            }
        }

        Commands::Validate { fixtures } => {
            SelectorRegistry::storefront()?;
            let fixture_set = load_fixtures(&fixtures)?;
            println!(
                "{} Selector map and fixtures are valid ({} products, {} filters)",
                "✓".green().bold(),
                fixture_set.steps().products.len(),
                fixture_set.steps().filters.len()
            );
        }

        Commands::List { tags } => {
            let filter = tags.unwrap_or_default();
            for scenario in scenarios::catalog() {
                if scenario.matches(&filter) {
                    println!(
                        "{}  [{}]",
                        scenario.name.white().bold(),
                        scenario.tags.join(", ").dimmed()
                    );
                }
            }
        }
    }

    Ok(())
}
