use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use product_modal_e2e::config::{resolve_base_url, Environment, SuiteConfig, Viewport};
use product_modal_e2e::fixture::read_fixture;
use product_modal_e2e::report::{ScenarioReport, SuiteReport};
use product_modal_e2e::scenario::{run_scenario, Scenario};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Storefront environment: local, network or production
    #[arg(long, env = "ENVIRONMENT", default_value = "local")]
    environment: Environment,

    /// Base URL of the storefront; overrides the environment's URL variable
    #[arg(long, env = "BASE_URL")]
    base_url: Option<String>,

    /// Run Chrome headless (default: headless on CI)
    #[arg(long, env = "HEADLESS", num_args = 0..=1, default_missing_value = "true")]
    headless: Option<bool>,

    /// Pass --no-sandbox to Chrome
    #[arg(long, env = "NO_SANDBOX")]
    no_sandbox: bool,

    /// Chrome executable to launch
    #[arg(long, env = "CHROME_PATH")]
    chrome_path: Option<String>,

    /// Connect to a running Chrome on this remote debugging port
    #[arg(long, env = "CHROME_DEBUG_PORT")]
    debug_port: Option<u16>,

    #[arg(long, env = "VIEWPORT", default_value = "1920x1080")]
    viewport: Viewport,

    /// Seconds before a scenario is abandoned
    #[arg(long, env = "SCENARIO_TIMEOUT", default_value_t = 60)]
    scenario_timeout: u64,

    /// Seconds a single expectation or click may wait
    #[arg(long, env = "EXPECT_TIMEOUT", default_value_t = 30)]
    expect_timeout: u64,

    #[arg(long, env = "FIXTURES_DIR", default_value = "test-data")]
    fixtures_dir: PathBuf,

    #[arg(long, env = "REPORT_DIR", default_value = "e2e-report")]
    report_dir: PathBuf,

    /// Fixture of the color the product is shown in first
    #[arg(long, default_value = "white_tshirt")]
    primary: String,

    /// Fixture of the color switched to
    #[arg(long, default_value = "navy_tshirt")]
    secondary: String,

    /// Scenarios to run (comma separated); all when omitted
    #[arg(long = "scenario", value_delimiter = ',')]
    scenarios: Vec<Scenario>,
}

impl Args {
    fn into_config(self) -> anyhow::Result<(SuiteConfig, String, String, Vec<Scenario>)> {
        let base_url = match self.base_url {
            Some(url) => url,
            None => resolve_base_url(self.environment, |name| std::env::var(name).ok())?,
        };

        let mut config = SuiteConfig::new(base_url);
        config.environment = self.environment;
        if let Some(headless) = self.headless {
            config.headless = headless;
        }
        config.no_sandbox |= self.no_sandbox;
        config.chrome_path = self.chrome_path;
        config.debug_port = self.debug_port;
        config.viewport = self.viewport;
        config.timeouts.scenario = Duration::from_secs(self.scenario_timeout);
        config.timeouts.expect = Duration::from_secs(self.expect_timeout);
        config.fixtures_dir = self.fixtures_dir;
        config.report_dir = self.report_dir;

        let scenarios = if self.scenarios.is_empty() {
            Scenario::ALL.to_vec()
        } else {
            self.scenarios
        };

        Ok((config, self.primary, self.secondary, scenarios))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let (config, primary, secondary, scenarios) = Args::parse().into_config()?;

    log::info!(
        "Testing {} storefront at {}",
        config.environment,
        config.base_url
    );

    let primary = read_fixture(&config.fixtures_dir, &primary)
        .await
        .context("Failed to load primary fixture")?;
    let secondary = read_fixture(&config.fixtures_dir, &secondary)
        .await
        .context("Failed to load secondary fixture")?;

    let mut suite = SuiteReport::new(config.environment, config.base_url.clone());

    for scenario in scenarios {
        let started_at = Utc::now();
        let report = match run_scenario(scenario, &config, &primary, &secondary).await {
            Ok(report) => report,
            Err(e) => {
                log::error!("Scenario {} could not run: {}", scenario, e);
                ScenarioReport::new(
                    scenario.name(),
                    started_at,
                    Duration::ZERO,
                    0,
                    Vec::new(),
                    Some(e.to_string()),
                )
            }
        };

        println!(
            "{} {} ({} checks, {:.1}s)",
            if report.is_success() { "PASS" } else { "FAIL" },
            report.name,
            report.checks,
            report.duration.as_secs_f64()
        );
        for failure in report.soft_failures.iter().chain(report.failure.iter()) {
            println!("    {}", failure);
        }

        suite.add(report);
    }

    let path = suite
        .write_to(&config.report_dir)
        .await
        .context("Failed to write report")?;
    println!(
        "{} passed, {} failed; report written to {}",
        suite.passed(),
        suite.failed(),
        path.display()
    );

    if !suite.is_success() {
        std::process::exit(1);
    }

    Ok(())
}
