//! Per-compilation-unit snapshots of discovered API metadata.

use serde::{Deserialize, Serialize};

use crate::endpoint::{Endpoint, Scope};
use crate::error::ModelError;

/// Titled block of API-level prose.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentationItem {
    /// Section heading.
    pub title: String,
    /// Section body.
    pub content: String,
}

impl DocumentationItem {
    /// Item titled `title`.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// One logical API and the endpoints it owns.
///
/// A grouping without an id is the implicit default grouping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiGrouping {
    /// Grouping id; may contain `${name}` placeholders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Human-readable API title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// API version label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Base URI the API is served from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    /// API-level prose sections.
    #[serde(default)]
    pub documentation: Vec<DocumentationItem>,
    /// Endpoints owned by the grouping.
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

impl ApiGrouping {
    /// The implicit default grouping.
    pub fn implicit() -> Self {
        Self::default()
    }

    /// Explicit grouping with `id`.
    pub fn named(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Set the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the version.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the base URI.
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    /// Append a documentation item.
    pub fn document(mut self, item: DocumentationItem) -> Self {
        self.documentation.push(item);
        self
    }

    /// Append an endpoint.
    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoints.push(endpoint);
        self
    }

    /// Whether this is the implicit default grouping.
    pub fn is_implicit(&self) -> bool {
        self.id.is_none()
    }
}

/// Everything extraction found in one compiled source unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    /// Name of the source unit the fragment was extracted from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    /// Groupings in extraction order.
    #[serde(default)]
    pub groupings: Vec<ApiGrouping>,
}

impl Default for Fragment {
    fn default() -> Self {
        Self {
            origin: None,
            groupings: vec![ApiGrouping::implicit()],
        }
    }
}

impl Fragment {
    /// Fragment of `origin` holding only the implicit grouping.
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: Some(origin.into()),
            ..Self::default()
        }
    }

    /// Add an endpoint to the implicit default grouping.
    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        match self.groupings.iter_mut().find(|g| g.is_implicit()) {
            Some(default) => default.endpoints.push(endpoint),
            None => self
                .groupings
                .push(ApiGrouping::implicit().endpoint(endpoint)),
        }
        self
    }

    /// Append a grouping.
    pub fn grouping(mut self, grouping: ApiGrouping) -> Self {
        self.groupings.push(grouping);
        self
    }

    /// Name used in diagnostics.
    pub fn origin_label(&self) -> &str {
        self.origin.as_deref().unwrap_or("<unknown>")
    }

    /// Endpoints across every grouping.
    pub fn endpoint_count(&self) -> usize {
        self.groupings.iter().map(|g| g.endpoints.len()).sum()
    }

    /// Parse a persisted fragment. `origin` names the source in errors and
    /// fills in a missing origin.
    pub fn from_json(json: &str, origin: &str) -> Result<Self, ModelError> {
        let mut fragment: Fragment =
            serde_json::from_str(json).map_err(|source| ModelError::MalformedFragment {
                origin: origin.to_string(),
                source,
            })?;
        if fragment.origin.is_none() {
            fragment.origin = Some(origin.to_string());
        }
        fragment.normalize();
        Ok(fragment)
    }

    /// Serialize as pretty JSON.
    pub fn to_json(&self) -> Result<String, ModelError> {
        serde_json::to_string_pretty(self).map_err(|source| ModelError::MalformedFragment {
            origin: self.origin_label().to_string(),
            source,
        })
    }

    /// Restore the invariants that hand-written JSON may omit: at least one
    /// grouping, and at least one scope per endpoint.
    fn normalize(&mut self) {
        if self.groupings.is_empty() {
            self.groupings.push(ApiGrouping::implicit());
        }
        for endpoint in self.groupings.iter_mut().flat_map(|g| g.endpoints.iter_mut()) {
            if endpoint.scopes.is_empty() {
                endpoint.scopes.push(Scope::public());
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::endpoint::HttpMethod;

    #[test]
    fn test_default_fragment_has_implicit_grouping() {
        let fragment = Fragment::default();
        assert_eq!(fragment.groupings.len(), 1);
        assert!(fragment.groupings[0].is_implicit());
    }

    #[test]
    fn test_endpoint_lands_in_implicit_grouping() {
        let fragment = Fragment::new("Widgets.java")
            .grouping(ApiGrouping::named("Other"))
            .endpoint(Endpoint::new(HttpMethod::Get, "/widgets"));
        assert_eq!(fragment.groupings.len(), 2);
        assert_eq!(fragment.groupings[0].endpoints.len(), 1);
        assert!(fragment.groupings[1].endpoints.is_empty());
    }

    #[test]
    fn test_from_json_normalizes() {
        let fragment = Fragment::from_json(
            r#"{ "groupings": [ { "endpoints": [ { "method": "GET", "paths": ["/a"], "scopes": [] } ] } ] }"#,
            "A.java",
        )
        .unwrap();
        assert_eq!(fragment.origin.as_deref(), Some("A.java"));
        assert_eq!(fragment.groupings[0].endpoints[0].scopes, vec![Scope::public()]);

        let empty = Fragment::from_json(r#"{ "origin": "B.java" }"#, "b.json").unwrap();
        assert_eq!(empty.origin.as_deref(), Some("B.java"));
        assert_eq!(empty.groupings.len(), 1);
    }

    #[test]
    fn test_malformed_fragment_names_origin() {
        let err = Fragment::from_json("{ not json", "broken.json").unwrap_err();
        assert!(matches!(err, ModelError::MalformedFragment { ref origin, .. } if origin == "broken.json"));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_json_round_trip_keeps_order() {
        let fragment = Fragment::new("Traits.java").endpoint(
            Endpoint::new(HttpMethod::Get, "/experimentaldeprecated3")
                .stability("experimental")
                .stability("deprecated"),
        );
        let back = Fragment::from_json(&fragment.to_json().unwrap(), "x").unwrap();
        assert_eq!(back, fragment);
    }
}
