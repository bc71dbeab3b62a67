//! Product overlay scenarios
//!
//! Each scenario is a sequence of steps over a [`ProductPage`]. The steps are
//! generic over the element-query collaborator; [`run_scenario`] binds them to
//! a real Chrome page and turns the outcome into a [`ScenarioReport`].

use crate::browser::{ChromeDriver, ChromePage};
use crate::config::SuiteConfig;
use crate::error::{Result, SuiteError};
use crate::expect::Expectations;
use crate::fixture::{ProductFixture, Tab};
use crate::product_page::ProductPage;
use crate::query::ElementQuery;
use crate::report::ScenarioReport;
use crate::verify::{
    are_maps_not_equal, available_sizes, collect_color_sources, color_checker, missing_fragments,
    observed_size_labels, price_label, selected_swatch_mismatches, size_checker,
    OVERLAY_IMAGE_STYLE,
};
use chrono::{DateTime, Utc};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    /// Overlay options and article details match the first fixture
    OverlayDetails,
    /// Switching color changes the images and the size availability
    ColorSwitch,
}

impl Scenario {
    pub const ALL: [Scenario; 2] = [Scenario::OverlayDetails, Scenario::ColorSwitch];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::OverlayDetails => "overlay-details",
            Scenario::ColorSwitch => "color-switch",
        }
    }

    /// Run the scenario's steps on an already loaded storefront page
    pub async fn execute<Q: ElementQuery>(
        &self,
        page: &mut ProductPage<Q>,
        primary: &ProductFixture,
        secondary: &ProductFixture,
        expect: &mut Expectations,
    ) -> Result<()> {
        match self {
            Scenario::OverlayDetails => overlay_options_and_details(page, primary, expect).await,
            Scenario::ColorSwitch => {
                color_switch_updates_images_and_sizes(page, primary, secondary, expect).await
            }
        }
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown scenario '{}' (expected overlay-details or color-switch)",
                    s
                )
            })
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Click the product image and expect the overlay to show up
pub async fn open_overlay<Q: ElementQuery>(
    page: &ProductPage<Q>,
    expect: &mut Expectations,
) -> Result<()> {
    page.click_product_image().await?;
    expect
        .to_be_visible(
            page.query(),
            &page.overlay().first(),
            "The product overlay should be visible",
        )
        .await
}

/// Image count, sources and inline style of the overlay slideshow
pub async fn check_overlay_images<Q: ElementQuery>(
    page: &ProductPage<Q>,
    fixture: &ProductFixture,
    expect: &mut Expectations,
) -> Result<()> {
    expect
        .to_have_count(
            page.query(),
            page.overlay_images(),
            fixture.number_of_images,
            &format!("Number of {} overlay images", fixture.color),
        )
        .await?;

    let count = page.image_count().await?;
    for i in 0..count {
        let image = page.image(i);
        let src = page
            .query()
            .attribute(&image, "src")
            .await?
            .unwrap_or_default();
        expect.check_contains(&src, &fixture.color, &format!("Source of image {}", i))?;

        let style = page.query().inline_style(&image).await?;
        expect.check_contains(&style, OVERLAY_IMAGE_STYLE, &format!("Style of image {}", i))?;
    }

    Ok(())
}

pub async fn overlay_options_and_details<Q: ElementQuery>(
    page: &ProductPage<Q>,
    fixture: &ProductFixture,
    expect: &mut Expectations,
) -> Result<()> {
    let query = page.query();

    open_overlay(page, expect).await?;
    check_overlay_images(page, fixture, expect).await?;

    expect
        .to_contain_text(
            query,
            &page.product_name().first(),
            &fixture.product_name,
            "Product name",
        )
        .await?;

    let price = page.price().first();
    expect
        .to_contain_text(query, &price, &fixture.currency, "Price currency")
        .await?;
    expect
        .soft_contain_text(
            query,
            &price,
            &price_label(&fixture.value, &fixture.currency),
            "Price",
        )
        .await?;

    let sources = collect_color_sources(page).await?;
    log::debug!("Color sources: {:?}", sources);
    expect.check(
        color_checker(&fixture.srcs_colors, &sources),
        format!(
            "Color swatches should offer {:?}, found {:?}",
            fixture.srcs_colors,
            sources.keys().collect::<Vec<_>>()
        ),
    )?;
    let mismatches = selected_swatch_mismatches(&sources, page.color());
    expect.check(mismatches.is_empty(), mismatches.join("; "))?;

    let labels = observed_size_labels(page).await?;
    expect.check(
        size_checker(&labels, &fixture.sizes),
        format!("Sizes should be {:?}, found {:?}", fixture.sizes, labels),
    )?;

    let footer = page.footer().first();
    let position = query.computed_style(&footer, "position").await?;
    expect.soft(
        position == "sticky",
        format!("Footer position should be sticky, was \"{}\"", position),
    );
    expect
        .soft_in_viewport(query, &footer, "Footer should be in the viewport")
        .await?;

    expect
        .to_contain_text(
            query,
            &page.footer_name().first(),
            &fixture.product_name,
            "Footer product name",
        )
        .await?;
    let add_to_cart = page.footer_add_to_cart().first();
    expect
        .to_contain_text(query, &add_to_cart, "Add to Cart", "Footer button")
        .await?;
    expect
        .to_be_visible(query, &add_to_cart, "Add to Cart should be visible")
        .await?;

    for tab in Tab::ALL {
        page.select_tab(tab.label()).await?;
        let texts = query.all_texts(page.tab_content()).await?;
        let missing = missing_fragments(fixture.tab_fragments(tab), &texts);
        expect.check(
            missing.is_empty(),
            format!("{} tab is missing {:?}", tab, missing),
        )?;
    }

    Ok(())
}

/// Switch from `first`'s color to `second`'s and expect new images and sizes
pub async fn color_switch_updates_images_and_sizes<Q: ElementQuery>(
    page: &mut ProductPage<Q>,
    first: &ProductFixture,
    second: &ProductFixture,
    expect: &mut Expectations,
) -> Result<()> {
    open_overlay(page, expect).await?;
    check_overlay_images(page, first, expect).await?;
    let before = available_sizes(page).await?;
    log::info!("Sizes for {}: {:?}", first.color, before);

    page.select_color_swatch(&second.color).await?;
    page.set_color(&second.color);

    check_overlay_images(page, second, expect).await?;
    let after = available_sizes(page).await?;
    log::info!("Sizes for {}: {:?}", second.color, after);

    expect.check(
        are_maps_not_equal(&before, &after),
        format!(
            "Size availability should change from {} to {}, both were {:?}",
            first.color, second.color, after
        ),
    )
}

/// Await `steps`, failing with [`SuiteError::Timeout`] once `limit` has passed
pub async fn within_limit<F>(scenario: Scenario, limit: Duration, steps: F) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    match tokio::time::timeout(limit, steps).await {
        Ok(result) => result,
        Err(_) => Err(SuiteError::Timeout(format!(
            "scenario {} exceeded {:?}",
            scenario, limit
        ))),
    }
}

/// Report of a finished run; an error outcome becomes the failure message
pub fn scenario_report(
    scenario: Scenario,
    started_at: DateTime<Utc>,
    duration: Duration,
    expect: Expectations,
    outcome: Result<()>,
) -> ScenarioReport {
    ScenarioReport::new(
        scenario.name(),
        started_at,
        duration,
        expect.checks(),
        expect.into_soft_failures(),
        outcome.err().map(|e| e.to_string()),
    )
}

/// Run `scenario` in a fresh browser against `config.base_url`
///
/// Launch and navigation failures are returned as errors. Anything that goes
/// wrong after the page loaded ends up in the report instead.
pub async fn run_scenario(
    scenario: Scenario,
    config: &SuiteConfig,
    primary: &ProductFixture,
    secondary: &ProductFixture,
) -> Result<ScenarioReport> {
    log::info!("Running scenario {}", scenario);

    let driver = ChromeDriver::new(config.connection_mode())
        .await?
        .with_viewport(config.viewport);

    let started_at = Utc::now();
    let start = Instant::now();

    let tab = driver.navigate(&config.base_url).await?;
    let wait = config.timeouts.wait_options();
    let mut page = ProductPage::new(
        ChromePage::new(tab.clone()).with_action_timeout(wait),
        &primary.color,
    );
    let mut expect = Expectations::new(wait);

    let outcome = within_limit(
        scenario,
        config.timeouts.scenario,
        scenario.execute(&mut page, primary, secondary, &mut expect),
    )
    .await;
    let checks = expect.checks();
    let mut report = scenario_report(scenario, started_at, start.elapsed(), expect, outcome);

    if report.is_success() {
        log::info!("Scenario {} passed ({} checks)", scenario, checks);
    } else {
        log::error!("Scenario {} failed", scenario);
        let path = config
            .report_dir
            .join(format!("{}-failure.png", scenario.name()));
        let captured = match tokio::fs::create_dir_all(&config.report_dir).await {
            Ok(()) => ChromeDriver::screenshot_to_file(&tab, &path).await,
            Err(e) => Err(SuiteError::Other(e.to_string())),
        };
        match captured {
            Ok(()) => report.screenshot = Some(path),
            Err(e) => log::warn!("Could not capture failure screenshot: {}", e),
        }
    }

    if let Err(e) = driver.close().await {
        log::warn!("Failed to close browser: {}", e);
    }

    Ok(report)
}
