//! # Validation Pipeline
//!
//! Ordered rule chains evaluated against request headers and body fields.
//!
//! A rule pairs a field key with a predicate. The predicate sees the field
//! value (`None` when absent) and returns `None` to accept or an outcome code
//! to reject. The first rejection ends the chain.

use crate::request::WireRequest;
use crate::route::RouteDefinition;
use crate::status::OutcomeCode;
use std::fmt;
use std::sync::Arc;

/// Predicate deciding whether a field value is acceptable
pub type Predicate = Arc<dyn Fn(Option<&str>) -> Option<OutcomeCode> + Send + Sync>;

/// A field key and the predicate applied to its value
#[derive(Clone)]
pub struct ValidationRule {
    key: String,
    predicate: Predicate,
}

impl fmt::Debug for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationRule")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl ValidationRule {
    /// Create a rule from any predicate
    pub fn new<F>(key: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(Option<&str>) -> Option<OutcomeCode> + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Reject with `code` when the field is absent
    pub fn required(key: impl Into<String>, code: OutcomeCode) -> Self {
        Self::new(key, move |value| value.is_none().then_some(code))
    }

    /// Reject with `code` unless the field equals `expected`
    pub fn equals(key: impl Into<String>, expected: impl Into<String>, code: OutcomeCode) -> Self {
        let expected = expected.into();
        Self::new(key, move |value| {
            (value != Some(expected.as_str())).then_some(code)
        })
    }

    /// Field key this rule reads
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Apply the predicate to a field value
    #[must_use]
    pub fn evaluate(&self, value: Option<&str>) -> Option<OutcomeCode> {
        (self.predicate)(value)
    }
}

/// Run `rules` in order, returning the first rejection
fn first_failure<'r, 'v, I, F>(rules: I, lookup: F) -> Option<OutcomeCode>
where
    I: IntoIterator<Item = &'r ValidationRule>,
    F: Fn(&str) -> Option<&'v str>,
{
    rules
        .into_iter()
        .find_map(|rule| rule.evaluate(lookup(rule.key())))
}

/// Evaluate header rules: the route's own first, then the base rules
#[must_use]
pub fn check_headers(
    route: &RouteDefinition,
    base_rules: &[ValidationRule],
    request: &WireRequest,
) -> Option<OutcomeCode> {
    first_failure(route.header_rules.iter().chain(base_rules), |key| request.header(key))
}

/// Evaluate the route's query rules against the JSON body
#[must_use]
pub fn check_query(route: &RouteDefinition, request: &WireRequest) -> Option<OutcomeCode> {
    first_failure(&route.query_rules, |key| request.query_field(key))
}
