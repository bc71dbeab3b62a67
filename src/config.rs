//! Suite configuration
//!
//! The storefront under test is chosen by `ENVIRONMENT` (`local`, `network`
//! or `production`), each mapping to its own base URL variable. Values may
//! come from the process environment or a `.env` file.

use crate::browser::ConnectionMode;
use crate::error::{Result, SuiteError};
use crate::wait::{WaitOptions, DEFAULT_EXPECT_TIMEOUT, DEFAULT_POLL_INTERVAL, DEFAULT_SCENARIO_TIMEOUT};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Variables whose presence marks a CI run
const CI_VARS: &[&str] = &["CI", "GITHUB_ACTIONS", "GITLAB_CI", "JENKINS_HOME", "CIRCLECI"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Network,
    Production,
}

impl Environment {
    /// Name of the variable holding this environment's base URL
    pub fn base_url_var(&self) -> &'static str {
        match self {
            Environment::Local => "LOCAL_BASE_URL",
            Environment::Network => "NETWORK_BASE_URL",
            Environment::Production => "PRODUCTION_BASE_URL",
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Environment::Local),
            "network" => Ok(Environment::Network),
            "production" => Ok(Environment::Production),
            other => Err(format!(
                "unknown environment '{}' (expected local, network or production)",
                other
            )),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Environment::Local => "local",
            Environment::Network => "network",
            Environment::Production => "production",
        };
        f.write_str(name)
    }
}

/// Emulated viewport size, written `WIDTHxHEIGHT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

impl FromStr for Viewport {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("viewport '{}' must look like 1920x1080", s))?;
        let width = w
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid viewport width '{}': {}", w, e))?;
        let height = h
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid viewport height '{}': {}", h, e))?;
        if width == 0 || height == 0 {
            return Err(format!("viewport '{}' must be non-empty", s));
        }
        Ok(Self { width, height })
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Budget for one whole scenario
    pub scenario: Duration,
    /// Budget for a single polling expectation or click
    pub expect: Duration,
    pub poll_interval: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            scenario: DEFAULT_SCENARIO_TIMEOUT,
            expect: DEFAULT_EXPECT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl Timeouts {
    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(self.expect)
            .with_poll_interval(self.poll_interval)
    }
}

#[derive(Debug, Clone)]
pub struct SuiteConfig {
    pub environment: Environment,
    pub base_url: String,
    pub headless: bool,
    pub no_sandbox: bool,
    pub chrome_path: Option<String>,
    /// Connect to an already running Chrome instead of launching one
    pub debug_port: Option<u16>,
    pub viewport: Viewport,
    pub timeouts: Timeouts,
    pub fixtures_dir: PathBuf,
    pub report_dir: PathBuf,
}

impl SuiteConfig {
    /// Defaults for `base_url`, headless on CI
    pub fn new(base_url: impl Into<String>) -> Self {
        let ci = is_ci(|name| std::env::var(name).ok());
        Self {
            environment: Environment::default(),
            base_url: base_url.into(),
            headless: ci,
            no_sandbox: ci,
            chrome_path: None,
            debug_port: None,
            viewport: Viewport::default(),
            timeouts: Timeouts::default(),
            fixtures_dir: PathBuf::from("test-data"),
            report_dir: PathBuf::from("e2e-report"),
        }
    }

    pub fn connection_mode(&self) -> ConnectionMode {
        match self.debug_port {
            Some(port) => ConnectionMode::DebugPort(port),
            None => ConnectionMode::Sandboxed {
                chrome_path: self.chrome_path.clone(),
                no_sandbox: self.no_sandbox,
                headless: self.headless,
            },
        }
    }
}

/// Resolve the base URL for `environment` through `lookup`
pub fn resolve_base_url<F>(environment: Environment, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let var = environment.base_url_var();
    match lookup(var) {
        Some(url) if !url.trim().is_empty() => Ok(url.trim().to_string()),
        _ => Err(SuiteError::Config(format!(
            "{} is not set (required for the '{}' environment)",
            var, environment
        ))),
    }
}

/// Whether any well-known CI variable is present
pub fn is_ci<F>(lookup: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    CI_VARS.iter().any(|var| lookup(var).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!("local".parse::<Environment>().unwrap(), Environment::Local);
        assert_eq!(" Network ".parse::<Environment>().unwrap(), Environment::Network);
        assert_eq!(
            "PRODUCTION".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert!("staging".parse::<Environment>().is_err());
        assert_eq!(Environment::default(), Environment::Local);
    }

    #[test]
    fn test_resolve_base_url_per_environment() {
        let lookup = vars(&[
            ("LOCAL_BASE_URL", "http://localhost:8080/"),
            ("PRODUCTION_BASE_URL", " https://shop.example.com "),
        ]);

        assert_eq!(
            resolve_base_url(Environment::Local, &lookup).unwrap(),
            "http://localhost:8080/"
        );
        assert_eq!(
            resolve_base_url(Environment::Production, &lookup).unwrap(),
            "https://shop.example.com"
        );

        let err = resolve_base_url(Environment::Network, &lookup).unwrap_err();
        assert!(matches!(err, SuiteError::Config(msg) if msg.contains("NETWORK_BASE_URL")));
    }

    #[test]
    fn test_blank_base_url_is_missing() {
        let lookup = vars(&[("LOCAL_BASE_URL", "  ")]);
        assert!(resolve_base_url(Environment::Local, lookup).is_err());
    }

    #[test]
    fn test_viewport_parsing() {
        assert_eq!(
            "1024x768".parse::<Viewport>().unwrap(),
            Viewport {
                width: 1024,
                height: 768
            }
        );
        assert_eq!("320X480".parse::<Viewport>().unwrap().height, 480);
        assert!("1024".parse::<Viewport>().is_err());
        assert!("0x768".parse::<Viewport>().is_err());
        assert!("widexhigh".parse::<Viewport>().is_err());
        assert_eq!(Viewport::default().to_string(), "1920x1080");
    }

    #[test]
    fn test_ci_detection() {
        assert!(is_ci(vars(&[("GITHUB_ACTIONS", "true")])));
        assert!(!is_ci(vars(&[("HOME", "/root")])));
    }

    #[test]
    fn test_connection_mode() {
        let mut config = SuiteConfig::new("http://localhost:8080");
        config.headless = true;
        config.no_sandbox = true;
        assert_eq!(
            config.connection_mode(),
            ConnectionMode::Sandboxed {
                chrome_path: None,
                no_sandbox: true,
                headless: true,
            }
        );

        config.debug_port = Some(9222);
        assert_eq!(config.connection_mode(), ConnectionMode::DebugPort(9222));
    }

    #[test]
    fn test_wait_options_follow_timeouts() {
        let timeouts = Timeouts {
            expect: Duration::from_secs(5),
            ..Timeouts::default()
        };
        let options = timeouts.wait_options();
        assert_eq!(options.timeout, Duration::from_secs(5));
        assert_eq!(options.poll_interval, DEFAULT_POLL_INTERVAL);
    }
}
