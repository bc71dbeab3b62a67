//! Query expressions and the element-query capability
//!
//! A [`Query`] is an immutable description of how to find elements: an ordered
//! chain of selectors where every segment is resolved relative to the matches
//! of the previous one. Building, scoping and indexing queries never touches
//! the page; only the [`ElementQuery`] implementation does.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One segment of a query chain
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Selector {
    /// XPath expression. When scoped below another segment a leading `/` is
    /// evaluated relative to the parent match.
    Xpath(String),
    /// CSS selector, evaluated with `querySelectorAll` on each parent match
    Css(String),
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Xpath(expr) => write!(f, "xpath={}", expr),
            Selector::Css(expr) => write!(f, "css={}", expr),
        }
    }
}

/// A lazily evaluated element query (the `locate` primitive)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query {
    chain: Vec<Selector>,
}

impl Query {
    /// Query the whole document with an XPath expression
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self {
            chain: vec![Selector::Xpath(expr.into())],
        }
    }

    /// Query the whole document with a CSS selector
    pub fn css(expr: impl Into<String>) -> Self {
        Self {
            chain: vec![Selector::Css(expr.into())],
        }
    }

    /// Scope `child` to the matches of this query
    pub fn locator(&self, child: Query) -> Self {
        let mut chain = self.chain.clone();
        chain.extend(child.chain);
        Self { chain }
    }

    /// Reference the element at `index` among this query's matches (the `nth` primitive)
    pub fn nth(&self, index: usize) -> ElementRef {
        ElementRef {
            query: self.clone(),
            index,
        }
    }

    /// Shorthand for `nth(0)`
    pub fn first(&self) -> ElementRef {
        self.nth(0)
    }

    pub fn chain(&self) -> &[Selector] {
        &self.chain
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, selector) in self.chain.iter().enumerate() {
            if i > 0 {
                write!(f, " >> ")?;
            }
            write!(f, "{}", selector)?;
        }
        Ok(())
    }
}

/// A handle to one element of a query's matches, resolved at interaction time
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef {
    query: Query,
    index: usize,
}

impl ElementRef {
    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [nth={}]", self.query, self.index)
    }
}

/// Element query and interaction primitives offered by a live page
///
/// Every call is a suspension point. Implementations report a missing element
/// as [`SuiteError::ElementNotFound`](crate::SuiteError::ElementNotFound) and
/// a hidden or disabled click target as
/// [`SuiteError::NotInteractable`](crate::SuiteError::NotInteractable).
#[async_trait]
pub trait ElementQuery: Send + Sync {
    /// Number of elements currently matching `query`
    async fn count(&self, query: &Query) -> Result<usize>;

    /// Attribute value, `None` when the attribute is absent
    async fn attribute(&self, element: &ElementRef, name: &str) -> Result<Option<String>>;

    /// Text content of the element, `None` when it has none
    async fn text(&self, element: &ElementRef) -> Result<Option<String>>;

    /// Text content of every match, in document order
    async fn all_texts(&self, query: &Query) -> Result<Vec<String>>;

    async fn click(&self, element: &ElementRef) -> Result<()>;

    /// Computed style property (e.g. `position`)
    async fn computed_style(&self, element: &ElementRef, property: &str) -> Result<String>;

    /// The element's inline `style` declaration text
    async fn inline_style(&self, element: &ElementRef) -> Result<String>;

    async fn is_visible(&self, element: &ElementRef) -> Result<bool>;

    async fn is_in_viewport(&self, element: &ElementRef) -> Result<bool>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_appends_chain() {
        let overlay = Query::css("div.shared-modal");
        let name = overlay.locator(Query::xpath("//div[@class=\"product-detail__name\"]"));

        assert_eq!(name.chain().len(), 2);
        assert_eq!(name.chain()[0], Selector::Css("div.shared-modal".to_string()));
        // Scoping leaves the parent untouched
        assert_eq!(overlay.chain().len(), 1);
    }

    #[test]
    fn test_nth_keeps_query() {
        let sizes = Query::xpath("//button");
        let third = sizes.nth(2);
        assert_eq!(third.query(), &sizes);
        assert_eq!(third.index(), 2);
        assert_eq!(sizes.first().index(), 0);
    }

    #[test]
    fn test_display() {
        let q = Query::css("footer").locator(Query::css(".name"));
        assert_eq!(q.to_string(), "css=footer >> css=.name");
        assert_eq!(q.nth(1).to_string(), "css=footer >> css=.name [nth=1]");
    }

    #[test]
    fn test_selector_serializes_for_page_scripts() {
        let json = serde_json::to_value(Query::xpath("//img").locator(Query::css("a")).chain())
            .unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"kind": "xpath", "value": "//img"},
                {"kind": "css", "value": "a"}
            ])
        );
    }
}
