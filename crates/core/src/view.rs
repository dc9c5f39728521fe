//! Render-ready views produced by the merge engine.

use serde::Serialize;

use restdoc_model::{DocumentationItem, Endpoint, StabilityTrait, TypeNode};

/// Everything needed to render one API grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiView {
    /// Grouping id; `None` for the implicit default grouping.
    pub id: Option<String>,
    /// Grouping title, falling back to the id.
    pub title: String,
    /// API version label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Base URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    /// API-level prose sections.
    pub documentation: Vec<DocumentationItem>,
    /// Root resources in first-declared order.
    pub resources: Vec<Resource>,
    /// Stability traits used by any method: `experimental` and `deprecated`
    /// first, then other traits in first-seen order.
    pub traits: Vec<StabilityTrait>,
    /// Security schemes used by any method, deduplicated in first-seen order.
    pub security_schemes: Vec<SecurityScheme>,
    /// Fragment origins that contributed to the view.
    pub origins: Vec<String>,
}

/// Security scheme declaration with every scope any method requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityScheme {
    /// Scheme name.
    pub name: String,
    /// Scopes in first-seen order.
    pub scopes: Vec<String>,
}

/// Node of the resource tree, one per distinct normalized endpoint path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resource {
    /// Full normalized path.
    pub path: String,
    /// Path relative to the parent resource, with a leading `/`.
    pub relative_path: String,
    /// Parameters first introduced by this resource's relative path.
    pub uri_parameters: Vec<UriParameter>,
    /// Methods mounted on exactly this path.
    pub methods: Vec<ResourceMethod>,
    /// Nested resources.
    pub children: Vec<Resource>,
}

/// URI template parameter declared by a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UriParameter {
    /// Parameter name.
    pub name: String,
    /// Zero-based segment index within the full path.
    pub position: usize,
    /// First non-empty description among the endpoints using it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Allowed literals, when enumerated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<String>>,
    /// First known type among the endpoints using it.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<TypeNode>,
}

/// An endpoint as mounted on one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceMethod {
    /// The documented operation.
    pub endpoint: Endpoint,
    /// Stability traits, deduplicated in declaration order.
    pub traits: Vec<StabilityTrait>,
    /// Fragment the endpoint came from.
    pub origin: String,
}

impl ApiView {
    /// Whether the view renders the implicit default grouping.
    pub fn is_default(&self) -> bool {
        self.id.is_none()
    }

    /// Label used in logs and diagnostics.
    pub fn label(&self) -> &str {
        self.id.as_deref().unwrap_or("<default>")
    }

    /// Every resource in pre-order.
    pub fn walk(&self) -> Vec<&Resource> {
        let mut out = Vec::new();
        let mut stack: Vec<&Resource> = self.resources.iter().rev().collect();
        while let Some(resource) = stack.pop() {
            out.push(resource);
            stack.extend(resource.children.iter().rev());
        }
        out
    }

    /// Resource with the full path `path`.
    pub fn resource(&self, path: &str) -> Option<&Resource> {
        self.walk().into_iter().find(|r| r.path == path)
    }

    /// Methods across the whole tree.
    pub fn method_count(&self) -> usize {
        self.walk().iter().map(|r| r.methods.len()).sum()
    }
}

impl ResourceMethod {
    /// Handler name.
    pub fn operation(&self) -> &str {
        &self.endpoint.operation
    }
}
