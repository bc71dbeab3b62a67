//! Scenario expectations
//!
//! Hard expectations stop the scenario with [`SuiteError::Assertion`]. Soft
//! expectations are recorded and the scenario keeps going; the report lists
//! them at the end. Page-bound expectations poll until they hold or their
//! timeout passes.

use crate::error::{Result, SuiteError};
use crate::query::{ElementQuery, ElementRef, Query};
use crate::wait::{wait_for, WaitOptions};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct Expectations {
    options: WaitOptions,
    checks: usize,
    soft_failures: Vec<String>,
}

impl Expectations {
    pub fn new(options: WaitOptions) -> Self {
        Self {
            options,
            checks: 0,
            soft_failures: Vec::new(),
        }
    }

    /// Number of expectations evaluated so far
    pub fn checks(&self) -> usize {
        self.checks
    }

    pub fn soft_failures(&self) -> &[String] {
        &self.soft_failures
    }

    pub fn into_soft_failures(self) -> Vec<String> {
        self.soft_failures
    }

    pub fn check(&mut self, condition: bool, message: impl Into<String>) -> Result<()> {
        self.checks += 1;
        if condition {
            Ok(())
        } else {
            let message = message.into();
            log::error!("Expectation failed: {}", message);
            Err(SuiteError::Assertion(message))
        }
    }

    pub fn soft(&mut self, condition: bool, message: impl Into<String>) {
        self.checks += 1;
        if !condition {
            let message = message.into();
            log::warn!("Soft expectation failed: {}", message);
            self.soft_failures.push(message);
        }
    }

    /// Hard-check that `haystack` contains `needle`
    pub fn check_contains(&mut self, haystack: &str, needle: &str, what: &str) -> Result<()> {
        self.check(
            haystack.contains(needle),
            format!("{}: expected \"{}\" to contain \"{}\"", what, haystack, needle),
        )
    }

    pub async fn to_be_visible<Q>(
        &mut self,
        query: &Q,
        element: &ElementRef,
        message: &str,
    ) -> Result<()>
    where
        Q: ElementQuery + ?Sized,
    {
        let held = self
            .poll(&format!("{} to be visible", element), move || async move {
                absent_as_false(query.is_visible(element).await)
            })
            .await?;
        self.check(held, message)
    }

    pub async fn to_have_count<Q>(
        &mut self,
        query: &Q,
        target: &Query,
        expected: usize,
        message: &str,
    ) -> Result<()>
    where
        Q: ElementQuery + ?Sized,
    {
        let last_seen = AtomicUsize::new(0);
        let last = &last_seen;
        let held = self
            .poll(
                &format!("{} to have {} match(es)", target, expected),
                move || async move {
                    let count = query.count(target).await?;
                    last.store(count, Ordering::Relaxed);
                    Ok(count == expected)
                },
            )
            .await?;
        self.check(
            held,
            format!(
                "{}: expected {} but found {}",
                message,
                expected,
                last_seen.load(Ordering::Relaxed)
            ),
        )
    }

    pub async fn to_contain_text<Q>(
        &mut self,
        query: &Q,
        element: &ElementRef,
        fragment: &str,
        message: &str,
    ) -> Result<()>
    where
        Q: ElementQuery + ?Sized,
    {
        let held = self.poll_contains_text(query, element, fragment).await?;
        self.check(held, format!("{}: \"{}\" not found in {}", message, fragment, element))
    }

    pub async fn soft_contain_text<Q>(
        &mut self,
        query: &Q,
        element: &ElementRef,
        fragment: &str,
        message: &str,
    ) -> Result<()>
    where
        Q: ElementQuery + ?Sized,
    {
        let held = self.poll_contains_text(query, element, fragment).await?;
        self.soft(held, format!("{}: \"{}\" not found in {}", message, fragment, element));
        Ok(())
    }

    pub async fn soft_in_viewport<Q>(
        &mut self,
        query: &Q,
        element: &ElementRef,
        message: &str,
    ) -> Result<()>
    where
        Q: ElementQuery + ?Sized,
    {
        let held = self
            .poll(&format!("{} to be in viewport", element), move || async move {
                absent_as_false(query.is_in_viewport(element).await)
            })
            .await?;
        self.soft(held, message);
        Ok(())
    }

    async fn poll_contains_text<Q>(
        &self,
        query: &Q,
        element: &ElementRef,
        fragment: &str,
    ) -> Result<bool>
    where
        Q: ElementQuery + ?Sized,
    {
        self.poll(&format!("{} to contain \"{}\"", element, fragment), move || async move {
            let text = absent_as_none(query.text(element).await)?;
            Ok(text.unwrap_or_default().contains(fragment))
        })
        .await
    }

    /// Poll `probe` until it reports `true`; a timeout yields `Ok(false)`
    async fn poll<F, Fut>(&self, waited_for: &str, mut probe: F) -> Result<bool>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<bool>>,
    {
        match wait_for(&self.options, waited_for, || {
            let attempt = probe();
            async move { Ok(attempt.await?.then_some(())) }
        })
        .await
        {
            Ok(()) => Ok(true),
            Err(SuiteError::Timeout(msg)) => {
                log::debug!("Gave up waiting for {}", msg);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

/// A missing element reads as `false`; other collaborator errors propagate
fn absent_as_false(result: Result<bool>) -> Result<bool> {
    match result {
        Err(SuiteError::ElementNotFound(_)) => Ok(false),
        other => other,
    }
}

fn absent_as_none(result: Result<Option<String>>) -> Result<Option<String>> {
    match result {
        Err(SuiteError::ElementNotFound(_)) => Ok(None),
        other => other,
    }
}
