//! Comparisons between what the overlay shows and what a fixture expects
//!
//! The checkers are pure functions over already collected values. The
//! `collect_*`/`available_sizes` readers gather those values through a
//! [`ProductPage`].

use crate::error::Result;
use crate::product_page::ProductPage;
use crate::query::ElementQuery;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Class carried by the swatch of the selected color
pub const SELECTED_SWATCH_CLASS: &str = "border-black";

/// Class carried by every other swatch
pub const UNSELECTED_SWATCH_CLASS: &str = "border-border-secondary";

/// Inline style every slideshow image must carry
pub const OVERLAY_IMAGE_STYLE: &str = "height: auto; width: 100vw; object-fit: contain";

/// Swatch image source → swatch class attribute
pub type ColorSources = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeStatus {
    Enabled,
    Disabled,
}

/// Size label (trimmed) → availability
pub type SizeAvailability = BTreeMap<String, SizeStatus>;

/// True iff every expected color token occurs in at least one swatch source
pub fn color_checker<S: AsRef<str>>(expected_colors: &[S], found_colors: &ColorSources) -> bool {
    expected_colors.iter().all(|color| {
        let color = color.as_ref();
        let found = found_colors.keys().any(|src| src.contains(color));
        log::debug!("Color {} found in swatch sources: {}", color, found);
        found
    })
}

/// True iff the distinct observed labels are exactly the expected labels
///
/// Observed labels are trimmed. Duplicates among observed labels count once,
/// so duplicated expected labels can never be satisfied.
pub fn size_checker<S, E>(observed: &[S], expected_sizes: &[E]) -> bool
where
    S: AsRef<str>,
    E: AsRef<str>,
{
    let mut found = BTreeSet::new();
    let mut unexpected = BTreeSet::new();

    for label in observed {
        let label = label.as_ref().trim();
        if expected_sizes.iter().any(|e| e.as_ref() == label) {
            found.insert(label);
        } else {
            unexpected.insert(label);
        }
    }

    log::debug!("Found sizes: {:?}, unexpected sizes: {:?}", found, unexpected);
    unexpected.is_empty() && found.len() == expected_sizes.len()
}

/// True unless both maps hold exactly the same entries
pub fn are_maps_not_equal<K: Ord, V: PartialEq>(
    first: &BTreeMap<K, V>,
    second: &BTreeMap<K, V>,
) -> bool {
    if first.len() != second.len() {
        return true;
    }
    // Same size, so a one-way scan covers both directions
    first
        .iter()
        .any(|(key, value)| second.get(key) != Some(value))
}

/// Each expected fragment missing from every observed text
pub fn missing_fragments<'a, S: AsRef<str>>(expected: &'a [S], observed: &[String]) -> Vec<&'a str> {
    expected
        .iter()
        .map(|fragment| fragment.as_ref())
        .filter(|fragment: &&str| !observed.iter().any(|text| text.contains(fragment)))
        .collect()
}

/// Swatches whose class does not match their selection state for `selected_color`
pub fn selected_swatch_mismatches(sources: &ColorSources, selected_color: &str) -> Vec<String> {
    sources
        .iter()
        .filter_map(|(src, class)| {
            let expected = if src.contains(selected_color) {
                SELECTED_SWATCH_CLASS
            } else {
                UNSELECTED_SWATCH_CLASS
            };
            (!class.contains(expected))
                .then(|| format!("The class for \"{}\" should contain \"{}\"", src, expected))
        })
        .collect()
}

/// Price text as the overlay renders it: `<value> <currency>`
pub fn price_label(value: &str, currency: &str) -> String {
    format!("{} {}", value, currency)
}

/// Read `src` and `class` of every color swatch; swatches without a source are skipped
pub async fn collect_color_sources<Q: ElementQuery>(page: &ProductPage<Q>) -> Result<ColorSources> {
    let mut sources = ColorSources::new();
    let count = page.colors_count().await?;

    for i in 0..count {
        let input = page.color_input(i);
        let src = page.query().attribute(&input, "src").await?;
        let class = page.query().attribute(&input, "class").await?;
        match src {
            Some(src) if !src.is_empty() => {
                sources.insert(src, class.unwrap_or_default());
            }
            _ => log::debug!("Color swatch {} has no src, skipping", i),
        }
    }

    Ok(sources)
}

/// Text of every size button, trimmed; buttons without text yield `""`
pub async fn observed_size_labels<Q: ElementQuery>(page: &ProductPage<Q>) -> Result<Vec<String>> {
    let count = page.sizes_count().await?;
    let mut labels = Vec::with_capacity(count);

    for i in 0..count {
        let text = page.query().text(&page.size(i)).await?;
        labels.push(text.map(|t| t.trim().to_string()).unwrap_or_default());
    }

    Ok(labels)
}

/// Availability of every labelled size button, by its `disabled` attribute
///
/// Buttons without a label are skipped; a repeated label keeps its last status.
pub async fn available_sizes<Q: ElementQuery>(page: &ProductPage<Q>) -> Result<SizeAvailability> {
    let mut sizes = SizeAvailability::new();
    let count = page.sizes_count().await?;

    for i in 0..count {
        let button = page.size(i);
        let label = page.query().text(&button).await?;
        let disabled = page.query().attribute(&button, "disabled").await?;
        let status = if disabled.is_some() {
            SizeStatus::Disabled
        } else {
            SizeStatus::Enabled
        };

        log::debug!("Size: {:?}, Status: {:?}", label, status);

        if let Some(label) = label.filter(|l| !l.is_empty()) {
            sizes.insert(label.trim().to_string(), status);
        }
    }

    Ok(sizes)
}
