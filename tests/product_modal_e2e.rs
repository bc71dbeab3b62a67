// E2E tests - run both product overlay scenarios against headless Chrome
// Uses a local storefront server for fast, network-independent testing


use product_modal_e2e::{
    read_fixture, run_scenario, ChromeDriver, ChromePage, ConnectionMode, ElementQuery,
    Environment, ProductFixture, ProductPage, Query, Scenario, SuiteConfig, SuiteError,
    SuiteReport, WaitOptions,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use storefront_server::StorefrontServer;

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("test-data")
}

async fn fixtures() -> anyhow::Result<(ProductFixture, ProductFixture)> {
    let white = read_fixture(&fixtures_dir(), "white_tshirt").await?;
    let navy = read_fixture(&fixtures_dir(), "navy_tshirt").await?;
    Ok((white, navy))
}

/// Headless config writing its report into `report_dir`
fn headless_config(url: String, report_dir: &Path) -> SuiteConfig {
    let mut config = SuiteConfig::new(url);
    config.headless = true;
    config.no_sandbox = true; // Required for CI environments
    config.timeouts.expect = Duration::from_secs(10);
    config.fixtures_dir = fixtures_dir();
    config.report_dir = report_dir.to_path_buf();
    config
}

#[tokio::test]
async fn test_overlay_options_and_details() -> anyhow::Result<()> {
    let server = StorefrontServer::start().await;
    server.wait_ready().await?;
    let report_dir = tempfile::tempdir()?;
    let config = headless_config(server.url(), report_dir.path());
    let (white, navy) = fixtures().await?;

    let report = run_scenario(Scenario::OverlayDetails, &config, &white, &navy).await?;

    println!("📊 {}: {} checks in {:?}", report.name, report.checks, report.duration);
    assert!(report.is_success(), "Scenario failed: {:?}", report);
    assert!(report.checks > 10);
    assert!(report.screenshot.is_none());

    Ok(())
}

#[tokio::test]
async fn test_color_switch_updates_images_and_sizes() -> anyhow::Result<()> {
    let server = StorefrontServer::start().await;
    server.wait_ready().await?;
    let report_dir = tempfile::tempdir()?;
    let config = headless_config(server.url(), report_dir.path());
    let (white, navy) = fixtures().await?;

    let report = run_scenario(Scenario::ColorSwitch, &config, &white, &navy).await?;

    println!("📊 {}: {} checks in {:?}", report.name, report.checks, report.duration);
    assert!(report.is_success(), "Scenario failed: {:?}", report);

    Ok(())
}

#[tokio::test]
async fn test_unchanged_sizes_fail_with_screenshot() -> anyhow::Result<()> {
    // NAVY disables the same size as WHITE
    let server = StorefrontServer::start_with_navy_disabled(&["XL"]).await;
    server.wait_ready().await?;
    let report_dir = tempfile::tempdir()?;
    let config = headless_config(server.url(), report_dir.path());
    let (white, navy) = fixtures().await?;

    let report = run_scenario(Scenario::ColorSwitch, &config, &white, &navy).await?;

    assert!(!report.is_success());
    let failure = report.failure.clone().unwrap_or_default();
    assert!(
        failure.contains("Size availability"),
        "Unexpected failure: {}",
        failure
    );

    let screenshot = report.screenshot.clone().expect("Screenshot should be captured");
    assert_eq!(screenshot, report_dir.path().join("color-switch-failure.png"));
    let metadata = tokio::fs::metadata(&screenshot).await?;
    assert!(metadata.len() > 0, "Screenshot file should not be empty");

    Ok(())
}

#[tokio::test]
async fn test_wrong_fixture_fails_scenario() -> anyhow::Result<()> {
    let server = StorefrontServer::start().await;
    server.wait_ready().await?;
    let report_dir = tempfile::tempdir()?;
    let mut config = headless_config(server.url(), report_dir.path());
    config.timeouts.expect = Duration::from_secs(2);
    let (mut white, navy) = fixtures().await?;
    white.number_of_images = 5;

    let report = run_scenario(Scenario::OverlayDetails, &config, &white, &navy).await?;

    assert!(!report.is_success());
    assert!(report
        .failure
        .as_deref()
        .unwrap_or_default()
        .contains("expected 5 but found 3"));

    Ok(())
}

#[tokio::test]
async fn test_suite_report_written() -> anyhow::Result<()> {
    let server = StorefrontServer::start().await;
    server.wait_ready().await?;
    let report_dir = tempfile::tempdir()?;
    let config = headless_config(server.url(), report_dir.path());
    let (white, navy) = fixtures().await?;

    let mut suite = SuiteReport::new(Environment::Local, config.base_url.clone());
    for scenario in Scenario::ALL {
        suite.add(run_scenario(scenario, &config, &white, &navy).await?);
    }
    let path = suite.write_to(&config.report_dir).await?;

    assert!(suite.is_success());
    let written: serde_json::Value = serde_json::from_str(&tokio::fs::read_to_string(&path).await?)?;
    assert_eq!(written["scenarios"].as_array().map(Vec::len), Some(2));
    assert_eq!(written["scenarios"][1]["name"], "color-switch");
    assert_eq!(written["scenarios"][1]["status"], "passed");

    Ok(())
}

#[tokio::test]
async fn test_chrome_page_primitives() -> anyhow::Result<()> {
    let server = StorefrontServer::start().await;
    server.wait_ready().await?;

    let driver = ChromeDriver::new(ConnectionMode::Sandboxed {
        chrome_path: None,
        no_sandbox: true,
        headless: true,
    })
    .await?;
    let tab = driver.navigate(&server.url()).await?;
    let query = ChromePage::new(tab).with_action_timeout(
        WaitOptions::new()
            .with_timeout(Duration::from_secs(2))
            .with_poll_interval(Duration::from_millis(50)),
    );
    let page = ProductPage::new(query, "white");

    // Overlay is hidden until the product image is clicked
    assert!(!page.query().is_visible(&page.overlay().first()).await?);
    page.click_product_image().await?;
    assert!(page.query().is_visible(&page.overlay().first()).await?);

    assert_eq!(page.image_count().await?, 3);
    assert_eq!(page.sizes_count().await?, 4);
    assert_eq!(page.colors_count().await?, 2);
    assert_eq!(
        page.query().attribute(&page.size(3), "disabled").await?,
        Some(String::new())
    );
    assert_eq!(page.query().attribute(&page.size(0), "disabled").await?, None);
    assert_eq!(
        page.query().text(&page.size(1)).await?.as_deref(),
        Some("M")
    );
    assert_eq!(
        page.query()
            .computed_style(&page.footer().first(), "position")
            .await?,
        "sticky"
    );

    // Disabled buttons cannot be clicked
    let err = page.query().click(&page.size(3)).await.unwrap_err();
    assert!(matches!(err, SuiteError::NotInteractable(_)), "{}", err);

    // Missing elements time out as not found
    let err = page
        .query()
        .click(&Query::css("button.checkout").first())
        .await
        .unwrap_err();
    assert!(matches!(err, SuiteError::ElementNotFound(_)), "{}", err);

    page.select_tab("material").await?;
    let texts = page.query().all_texts(page.tab_content()).await?;
    assert_eq!(texts, vec!["100% organic cotton.".to_string()]);

    let png = ChromeDriver::screenshot(page.query().page()).await?;
    assert!(png.starts_with(b"\x89PNG"), "Screenshot should be a PNG");

    driver.close().await?;
    Ok(())
}
