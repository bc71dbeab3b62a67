pub mod browser;
pub mod config;
pub mod error;
pub mod expect;
pub mod fixture;
pub mod product_page;
pub mod query;
pub mod report;
pub mod scenario;
pub mod verify;
pub mod wait;

//  Re-export commonly used items
pub use browser::{ChromeDriver, ChromePage, ConnectionMode};
pub use config::{Environment, SuiteConfig, Timeouts, Viewport};
pub use error::{Result, SuiteError};
pub use expect::Expectations;
pub use fixture::{read_fixture, ProductFixture, Tab};
pub use product_page::{derive_queries, ColorQueries, ProductPage};
pub use query::{ElementQuery, ElementRef, Query, Selector};
pub use report::{ScenarioReport, ScenarioStatus, SuiteReport};
pub use scenario::{run_scenario, Scenario};
pub use verify::{
    are_maps_not_equal, available_sizes, collect_color_sources, color_checker, size_checker,
    ColorSources, SizeAvailability, SizeStatus,
};
pub use wait::{wait_for, WaitOptions};
