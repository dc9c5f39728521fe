//! `${name}` placeholder substitution.
//!
//! A `$` that does not open a placeholder is kept literally, and `$${`
//! produces a literal `${`. Substituted values are inserted verbatim and are
//! not scanned again.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// `${name}`, its `$${name}` escape, or an unterminated `${name`.
#[allow(clippy::expect_used)]
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(\$)?\{([^}]*)(\})?").expect("placeholder pattern compiles")
});

/// Caller-supplied values for template placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateValues {
    values: BTreeMap<String, String>,
}

/// Placeholder with no value in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedPlaceholder {
    /// Placeholder name, without `${` and `}`.
    pub placeholder: String,
}

impl TemplateValues {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` to `value`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Builder form of [`TemplateValues::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Value of `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replace every `${name}` in `text`. Fails on the first placeholder
    /// without a value or without a closing brace.
    pub fn substitute(&self, text: &str) -> Result<String, UnresolvedPlaceholder> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            out.push_str(&text[last..whole.start()]);
            last = whole.end();

            if caps.get(1).is_some() {
                out.push_str(&whole.as_str()[1..]);
                continue;
            }
            let name = caps.get(2).map_or("", |m| m.as_str());
            let unresolved = || UnresolvedPlaceholder {
                placeholder: name.to_string(),
            };
            if caps.get(3).is_none() {
                return Err(unresolved());
            }
            out.push_str(self.get(name).ok_or_else(unresolved)?);
        }

        out.push_str(&text[last..]);
        Ok(out)
    }
}

impl<K, V> FromIterator<(K, V)> for TemplateValues
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
