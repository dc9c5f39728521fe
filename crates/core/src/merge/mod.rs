//! Merge engine: fragments in, one [`ApiView`] per API grouping out.
//!
//! The pipeline is a sequence of pure stages over owned values:
//!
//! 1. `flatten`: combine same-id groupings across fragments
//! 2. `substitute`: resolve `${name}` placeholders, then combine groupings
//!    whose resolved ids coincide
//! 3. `filter::exclude`: drop mounts matching an exclusion pattern
//! 4. `filter::restrict_scope`: keep endpoints published to the requested scope
//! 5. `resources`: build the resource tree, declare URI parameters and
//!    resolve traits and security schemes
//!
//! Every stage either succeeds for the whole grouping set or returns the
//! first [`MergeError`]; a partial view is never produced.

mod filter;
mod flatten;
mod resources;
mod substitute;

use regex::Regex;
use tracing::debug;

use restdoc_model::{DocumentationItem, Endpoint, Fragment, Scope};

use crate::error::MergeError;
use crate::template::TemplateValues;
use crate::view::ApiView;

/// Everything the caller controls about a merge.
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Mount paths to leave out.
    pub exclusions: ExclusionSet,
    /// Audience to document; [`Scope::ALL`] keeps every endpoint.
    pub scope: Scope,
    /// Values for `${name}` placeholders.
    pub templates: TemplateValues,
}

impl MergeOptions {
    /// No exclusions, every scope, no template values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the exclusion set.
    pub fn exclusions(mut self, exclusions: ExclusionSet) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Restrict to `scope`.
    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Replace the template values.
    pub fn templates(mut self, templates: TemplateValues) -> Self {
        self.templates = templates;
        self
    }
}

/// Regular expressions matched against whole normalized mount paths.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    patterns: Vec<Regex>,
}

impl ExclusionSet {
    /// Compile `patterns`, each anchored at both ends.
    pub fn new<I, S>(patterns: I) -> Result<Self, MergeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                Regex::new(&format!("^(?:{pattern})$")).map_err(|source| {
                    MergeError::InvalidExclusionPattern {
                        pattern: pattern.to_string(),
                        source,
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Whether no pattern was supplied.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether any pattern matches all of `path`.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(path))
    }
}

/// Endpoint tagged with the fragment it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SourcedEndpoint {
    pub origin: String,
    pub endpoint: Endpoint,
}

/// Grouping combined across fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Grouping {
    pub id: Option<String>,
    pub title: Option<String>,
    pub version: Option<String>,
    pub base_path: Option<String>,
    pub documentation: Vec<DocumentationItem>,
    pub endpoints: Vec<SourcedEndpoint>,
    pub origins: Vec<String>,
}

impl Grouping {
    pub fn label(&self) -> &str {
        self.id.as_deref().unwrap_or("<default>")
    }
}

/// Merge `fragments` into one view per grouping, in first-seen grouping order.
pub fn merge(fragments: &[Fragment], options: &MergeOptions) -> Result<Vec<ApiView>, MergeError> {
    let groupings = flatten::flatten(fragments);
    let groupings = substitute::substitute(groupings, &options.templates)?;
    let groupings = flatten::regroup(groupings);
    let groupings = filter::exclude(groupings, &options.exclusions);
    let groupings = filter::restrict_scope(groupings, &options.scope);

    let views = groupings
        .into_iter()
        .map(resources::build_view)
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        fragments = fragments.len(),
        views = views.len(),
        scope = %options.scope,
        "Merged fragments."
    );
    Ok(views)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusion_must_match_whole_path() {
        let set = ExclusionSet::new([".*/v2/.*"]).unwrap();
        assert!(set.is_excluded("/mount/api/v2/widgets"));
        assert!(!set.is_excluded("/mount/api/v1/widgets"));

        let literal = ExclusionSet::new(["/widgets"]).unwrap();
        assert!(!literal.is_excluded("/widgets/{id}"));
    }

    #[test]
    fn test_invalid_exclusion_pattern() {
        let err = ExclusionSet::new(["/widgets/("]).unwrap_err();
        assert!(matches!(err, MergeError::InvalidExclusionPattern { ref pattern, .. } if pattern == "/widgets/("));
    }

    #[test]
    fn test_alternation_is_anchored_as_a_whole() {
        let set = ExclusionSet::new(["/a|/b"]).unwrap();
        assert!(set.is_excluded("/a"));
        assert!(set.is_excluded("/b"));
        assert!(!set.is_excluded("/a/x"));
    }
}
