//! Expected product data, one JSON file per product variant

use crate::error::{Result, SuiteError};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Content tabs of the product overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tab {
    Details,
    Fit,
    Material,
    Sustainability,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Details, Tab::Fit, Tab::Material, Tab::Sustainability];

    /// Text matched (case-insensitively) against the tab's label
    pub fn label(&self) -> &'static str {
        match self {
            Tab::Details => "Details",
            Tab::Fit => "Fit",
            Tab::Material => "Material",
            Tab::Sustainability => "Sustainability",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductFixture {
    /// Color token as it appears in image sources, e.g. `WHITE`
    pub color: String,
    pub number_of_images: usize,
    pub product_name: String,
    pub currency: String,
    /// Price amount; written either as a JSON string or a number
    #[serde(deserialize_with = "string_or_number")]
    pub value: String,
    /// Color tokens expected among the swatch image sources
    #[serde(default)]
    pub srcs_colors: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub details: Vec<String>,
    #[serde(default)]
    pub fit: Vec<String>,
    #[serde(default)]
    pub material: Vec<String>,
    #[serde(default)]
    pub sustainability: Vec<String>,
}

impl ProductFixture {
    /// Text fragments expected in the content of `tab`
    pub fn tab_fragments(&self, tab: Tab) -> &[String] {
        match tab {
            Tab::Details => &self.details,
            Tab::Fit => &self.fit,
            Tab::Material => &self.material,
            Tab::Sustainability => &self.sustainability,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SuiteError::Fixture(e.to_string()))
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number, got {}",
            other
        ))),
    }
}

/// Path of fixture `identifier` inside `dir`; `.json` is appended when missing
pub fn fixture_path(dir: &Path, identifier: &str) -> PathBuf {
    if identifier.ends_with(".json") {
        dir.join(identifier)
    } else {
        dir.join(format!("{}.json", identifier))
    }
}

/// Read and parse fixture `identifier` from `dir`
pub async fn read_fixture(dir: &Path, identifier: &str) -> Result<ProductFixture> {
    let path = fixture_path(dir, identifier);
    log::debug!("Reading fixture {}", path.display());

    let content = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| SuiteError::Fixture(format!("Failed to read {}: {}", path.display(), e)))?;

    serde_json::from_str(&content)
        .map_err(|e| SuiteError::Fixture(format!("Failed to parse {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: &str = r#"{
        "Color": "WHITE",
        "NumberOfImages": 3,
        "ProductName": "Basic T-Shirt",
        "Currency": "EUR",
        "Value": "19.99",
        "SrcsColors": ["WHITE", "NAVY"],
        "Sizes": ["S", "M", "L"],
        "Details": ["Crew neck"],
        "Fit": ["Regular fit"],
        "Material": ["100% cotton"],
        "Sustainability": ["Organic cotton"]
    }"#;

    #[test]
    fn test_parse_pascal_case_keys() {
        let fixture = ProductFixture::from_json(WHITE).unwrap();
        assert_eq!(fixture.color, "WHITE");
        assert_eq!(fixture.number_of_images, 3);
        assert_eq!(fixture.value, "19.99");
        assert_eq!(fixture.srcs_colors, vec!["WHITE", "NAVY"]);
        assert_eq!(fixture.tab_fragments(Tab::Material), ["100% cotton".to_string()]);
    }

    #[test]
    fn test_numeric_value() {
        let fixture = ProductFixture::from_json(
            r#"{"Color":"NAVY","NumberOfImages":2,"ProductName":"Tee","Currency":"EUR","Value":24.5}"#,
        )
        .unwrap();
        assert_eq!(fixture.value, "24.5");
        // Optional lists default to empty
        assert!(fixture.sizes.is_empty());
        assert!(fixture.tab_fragments(Tab::Fit).is_empty());
    }

    #[test]
    fn test_rejects_non_scalar_value() {
        let err = ProductFixture::from_json(
            r#"{"Color":"NAVY","NumberOfImages":2,"ProductName":"Tee","Currency":"EUR","Value":[1]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, SuiteError::Fixture(_)));
    }

    #[test]
    fn test_fixture_path_appends_extension() {
        let dir = Path::new("test-data");
        assert_eq!(fixture_path(dir, "white_tshirt"), dir.join("white_tshirt.json"));
        assert_eq!(fixture_path(dir, "navy.json"), dir.join("navy.json"));
    }

    #[tokio::test]
    async fn test_read_fixture_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("white.json"), WHITE)
            .await
            .unwrap();

        let fixture = read_fixture(dir.path(), "white").await.unwrap();
        assert_eq!(fixture.product_name, "Basic T-Shirt");

        let err = read_fixture(dir.path(), "missing").await.unwrap_err();
        assert!(matches!(err, SuiteError::Fixture(msg) if msg.contains("missing.json")));
    }

    #[test]
    fn test_tab_labels() {
        let labels: Vec<_> = Tab::ALL.iter().map(Tab::label).collect();
        assert_eq!(labels, ["Details", "Fit", "Material", "Sustainability"]);
    }
}
