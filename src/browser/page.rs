//! [`ElementQuery`] over a live Chrome page
//!
//! Each primitive evaluates a small script in the page: the query chain is
//! resolved from scratch (XPath snapshots and `querySelectorAll`), so handles
//! never go stale across re-renders.

use crate::error::{Result, SuiteError};
use crate::query::{ElementQuery, ElementRef, Query};
use crate::wait::{wait_for, WaitOptions};
use async_trait::async_trait;
use chromiumoxide::page::Page;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};

const RESOLVE_JS: &str = r#"
const __resolve = (chain) => {
    let roots = [document];
    for (const sel of chain) {
        const next = [];
        for (const root of roots) {
            if (sel.kind === 'css') {
                next.push(...root.querySelectorAll(sel.value));
            } else {
                let expr = sel.value;
                if (root !== document && expr.startsWith('/')) {
                    expr = '.' + expr;
                }
                const snap = document.evaluate(
                    expr, root, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
                for (let i = 0; i < snap.snapshotLength; i++) {
                    next.push(snap.snapshotItem(i));
                }
            }
        }
        roots = [...new Set(next)];
    }
    return roots;
};
const __visible = (el) => {
    const rect = el.getBoundingClientRect();
    const style = getComputedStyle(el);
    return rect.width > 0 && rect.height > 0 && style.visibility !== 'hidden';
};
"#;

/// Clicks `el` unless it is hidden or disabled
const CLICK_JS: &str = "(() => { \
    if (!__visible(el) || el.disabled) { return 'blocked'; } \
    el.scrollIntoView({ block: 'center', inline: 'center' }); \
    el.click(); \
    return 'clicked'; \
})()";

/// One click attempt: missing or blocked targets are retried
fn click_outcome(attempt: Result<String>, blocked: &AtomicBool) -> Result<Option<()>> {
    match attempt {
        Ok(outcome) if outcome == "clicked" => Ok(Some(())),
        Ok(_) => {
            blocked.store(true, Ordering::Relaxed);
            Ok(None)
        }
        Err(SuiteError::ElementNotFound(_)) => {
            blocked.store(false, Ordering::Relaxed);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Script outcome: whether the element resolved, and the computed value
#[derive(Debug, Deserialize)]
struct Probe<T> {
    found: bool,
    #[serde(default)]
    count: usize,
    value: Option<T>,
}

pub struct ChromePage {
    page: Page,
    action: WaitOptions,
}

impl ChromePage {
    pub fn new(page: Page) -> Self {
        Self {
            page,
            action: WaitOptions::default(),
        }
    }

    /// How long `click` waits for its target to appear
    pub fn with_action_timeout(mut self, action: WaitOptions) -> Self {
        self.action = action;
        self
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    async fn evaluate<T: DeserializeOwned>(&self, script: String) -> Result<Probe<T>> {
        let result = self
            .page
            .evaluate(script.as_str())
            .await
            .map_err(|e| SuiteError::Script(format!("Evaluation failed: {}", e)))?;

        result
            .into_value::<Probe<T>>()
            .map_err(|e| SuiteError::Script(format!("Failed to deserialize result: {}", e)))
    }

    /// Evaluate `body` with `els` bound to the resolved matches of `query`
    fn script_for_query(query: &Query, body: &str) -> Result<String> {
        let chain = serde_json::to_string(query.chain())
            .map_err(|e| SuiteError::Script(format!("Failed to encode query: {}", e)))?;
        Ok(format!(
            "(() => {{ {} const els = __resolve({}); {} }})()",
            RESOLVE_JS, chain, body
        ))
    }

    /// Evaluate `expr` with `el` bound to the referenced element
    fn script_for_element(element: &ElementRef, expr: &str) -> Result<String> {
        let body = format!(
            "const el = els[{}]; \
             if (!el) {{ return {{ found: false, count: els.length }}; }} \
             return {{ found: true, count: els.length, value: ({}) }};",
            element.index(),
            expr
        );
        Self::script_for_query(element.query(), &body)
    }

    async fn on_element<T: DeserializeOwned>(&self, element: &ElementRef, expr: &str) -> Result<T> {
        let probe = self
            .evaluate::<T>(Self::script_for_element(element, expr)?)
            .await?;
        if !probe.found {
            log::debug!(
                "{} not found ({} match(es) for query)",
                element,
                probe.count
            );
            return Err(SuiteError::ElementNotFound(element.to_string()));
        }
        probe
            .value
            .ok_or_else(|| SuiteError::Script(format!("No value returned for {}", element)))
    }
}

#[async_trait]
impl ElementQuery for ChromePage {
    async fn count(&self, query: &Query) -> Result<usize> {
        let script = Self::script_for_query(query, "return { found: true, count: els.length };")?;
        let probe = self.evaluate::<serde_json::Value>(script).await?;
        log::debug!("count({}) = {}", query, probe.count);
        Ok(probe.count)
    }

    async fn attribute(&self, element: &ElementRef, name: &str) -> Result<Option<String>> {
        let name = serde_json::to_string(name)
            .map_err(|e| SuiteError::Script(format!("Failed to encode attribute: {}", e)))?;
        // Wrapped so that an absent attribute is distinguishable from a missing value
        let (value,): (Option<String>,) = self
            .on_element(element, &format!("[el.getAttribute({})]", name))
            .await?;
        Ok(value)
    }

    async fn text(&self, element: &ElementRef) -> Result<Option<String>> {
        let (value,): (Option<String>,) = self.on_element(element, "[el.textContent]").await?;
        Ok(value)
    }

    async fn all_texts(&self, query: &Query) -> Result<Vec<String>> {
        let script = Self::script_for_query(
            query,
            "return { found: true, count: els.length, value: els.map(e => e.textContent || '') };",
        )?;
        Ok(self
            .evaluate::<Vec<String>>(script)
            .await?
            .value
            .unwrap_or_default())
    }

    async fn click(&self, element: &ElementRef) -> Result<()> {
        log::debug!("click {}", element);
        let this = self;
        let blocked = AtomicBool::new(false);
        let seen_blocked = &blocked;
        wait_for(
            &self.action,
            &format!("{} to be clickable", element),
            move || async move {
                let attempt = this.on_element::<String>(element, CLICK_JS).await;
                click_outcome(attempt, seen_blocked)
            },
        )
        .await
        .map_err(|e| match e {
            SuiteError::Timeout(_) if blocked.load(Ordering::Relaxed) => {
                SuiteError::NotInteractable(element.to_string())
            }
            SuiteError::Timeout(_) => SuiteError::ElementNotFound(element.to_string()),
            other => other,
        })
    }

    async fn computed_style(&self, element: &ElementRef, property: &str) -> Result<String> {
        let property = serde_json::to_string(property)
            .map_err(|e| SuiteError::Script(format!("Failed to encode property: {}", e)))?;
        self.on_element(
            element,
            &format!("getComputedStyle(el).getPropertyValue({})", property),
        )
        .await
    }

    async fn inline_style(&self, element: &ElementRef) -> Result<String> {
        self.on_element(element, "el.style.cssText").await
    }

    async fn is_visible(&self, element: &ElementRef) -> Result<bool> {
        self.on_element(element, "__visible(el)").await
    }

    async fn is_in_viewport(&self, element: &ElementRef) -> Result<bool> {
        self.on_element(
            element,
            "(() => { \
                const r = el.getBoundingClientRect(); \
                return r.width > 0 && r.height > 0 \
                    && r.top < window.innerHeight && r.bottom > 0 \
                    && r.left < window.innerWidth && r.right > 0; \
            })()",
        )
        .await
    }
}
