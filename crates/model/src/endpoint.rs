//! Documented operations and their annotations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::TypeNode;

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
    /// `HEAD`
    Head,
    /// `OPTIONS`
    Options,
}

impl HttpMethod {
    /// Upper-case wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }

    /// Lower-case key used by RAML method entries.
    pub fn key(self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
            HttpMethod::Head => "head",
            HttpMethod::Options => "options",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audience an endpoint is published to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scope(String);

impl Scope {
    /// Sentinel selecting every endpoint regardless of its scopes.
    pub const ALL: &'static str = "all";
    /// Default audience of an endpoint with no explicit scopes.
    pub const PUBLIC: &'static str = "public";
    /// Internal-only audience.
    pub const PRIVATE: &'static str = "private";

    /// Scope with an arbitrary name.
    pub fn new(scope: impl Into<String>) -> Self {
        Self(scope.into())
    }

    /// The [`Scope::ALL`] sentinel.
    pub fn all() -> Self {
        Self::new(Self::ALL)
    }

    /// The [`Scope::PUBLIC`] scope.
    pub fn public() -> Self {
        Self::new(Self::PUBLIC)
    }

    /// Scope name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the [`Scope::ALL`] sentinel.
    pub fn is_all(&self) -> bool {
        self.0 == Self::ALL
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::all()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stability tag such as `experimental` or `deprecated`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StabilityTrait(String);

impl StabilityTrait {
    /// Name of the experimental trait.
    pub const EXPERIMENTAL: &'static str = "experimental";
    /// Name of the deprecated trait.
    pub const DEPRECATED: &'static str = "deprecated";
    /// Known traits in declaration order. Other traits follow them.
    pub const KNOWN: [&str; 2] = [Self::EXPERIMENTAL, Self::DEPRECATED];

    /// Trait with an arbitrary name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The experimental trait.
    pub fn experimental() -> Self {
        Self::new(Self::EXPERIMENTAL)
    }

    /// The deprecated trait.
    pub fn deprecated() -> Self {
        Self::new(Self::DEPRECATED)
    }

    /// Trait name as it appears in `is` lists.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Position among [`StabilityTrait::KNOWN`], if any.
    pub fn known_rank(&self) -> Option<usize> {
        Self::KNOWN.iter().position(|known| *known == self.0)
    }

    /// Description emitted with the trait declaration.
    pub fn description(&self) -> String {
        match self.0.as_str() {
            Self::EXPERIMENTAL => {
                "The method is experimental and may change without notice.".to_string()
            }
            Self::DEPRECATED => "The method is deprecated and will be removed.".to_string(),
            other => format!("The method is marked {other}."),
        }
    }
}

impl fmt::Display for StabilityTrait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Security scheme required to call an endpoint, with named parameter lists
/// (for OAuth 2.0, the `scopes` list) kept in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityRequirement {
    /// Scheme name, e.g. [`SecurityRequirement::OAUTH2`].
    pub scheme: String,
    /// Named value lists, as declared.
    #[serde(default)]
    pub parameters: Vec<(String, Vec<String>)>,
}

impl SecurityRequirement {
    /// Scheme name of OAuth 2.0 requirements.
    pub const OAUTH2: &'static str = "oauth_2_0";
    /// Parameter holding the OAuth 2.0 scopes.
    pub const SCOPES: &'static str = "scopes";

    /// Requirement on `scheme` with no parameters.
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            parameters: Vec::new(),
        }
    }

    /// OAuth 2.0 requirement granting `scopes`.
    pub fn oauth2<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Self::OAUTH2).parameter(Self::SCOPES, scopes)
    }

    /// Append a named value list.
    pub fn parameter<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters
            .push((name.into(), values.into_iter().map(Into::into).collect()));
        self
    }

    /// Values of the first parameter named `name`.
    pub fn values(&self, name: &str) -> &[String] {
        self.parameters
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, values)| values.as_slice())
            .unwrap_or_default()
    }

    /// The `scopes` list, empty when absent.
    pub fn scopes(&self) -> &[String] {
        self.values(Self::SCOPES)
    }
}

/// Path or query parameter of an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Name as it appears in the URI template or query string.
    pub name: String,
    /// Value type, when known.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<TypeNode>,
    /// Prose description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Allowed literal values when the parameter is enumerated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<String>>,
    /// Query parameters may be optional; path parameters never are.
    #[serde(default = "default_true")]
    pub required: bool,
}

fn default_true() -> bool {
    true
}

impl Parameter {
    /// Required parameter with no type or description.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
            description: None,
            allowed_values: None,
            required: true,
        }
    }

    /// Set the type. An enumeration also supplies the allowed values unless
    /// they were set already.
    pub fn with_type(mut self, ty: TypeNode) -> Self {
        if let TypeNode::Enumeration { literals, .. } = &ty {
            self.allowed_values.get_or_insert_with(|| literals.clone());
        }
        self.ty = Some(ty);
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the parameter as not required.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// One documented operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// HTTP method.
    pub method: HttpMethod,
    /// Name of the handler that implements the operation.
    #[serde(default)]
    pub operation: String,
    /// Every URI template the operation is mounted at.
    pub paths: Vec<String>,
    /// Parameters bound from the URI template.
    #[serde(default)]
    pub path_params: Vec<Parameter>,
    /// Parameters read from the query string.
    #[serde(default)]
    pub query_params: Vec<Parameter>,
    /// Request body type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<TypeNode>,
    /// Response body type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<TypeNode>,
    /// Operation description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// Description of the returned value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_doc: Option<String>,
    /// Audiences the endpoint is published to; `public` when omitted.
    #[serde(default = "default_scopes")]
    pub scopes: Vec<Scope>,
    /// Stability traits, in declaration order.
    #[serde(default)]
    pub traits: Vec<StabilityTrait>,
    /// Required security scheme, attached verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<SecurityRequirement>,
}

fn default_scopes() -> Vec<Scope> {
    vec![Scope::public()]
}

impl Endpoint {
    /// Public endpoint mounted at a single `path`.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            operation: String::new(),
            paths: vec![path.into()],
            path_params: Vec::new(),
            query_params: Vec::new(),
            request: None,
            response: None,
            doc: None,
            return_doc: None,
            scopes: default_scopes(),
            traits: Vec::new(),
            security: None,
        }
    }

    /// Set the handler name.
    pub fn operation(mut self, name: impl Into<String>) -> Self {
        self.operation = name.into();
        self
    }

    /// Add another mount path.
    pub fn mounted_at(mut self, path: impl Into<String>) -> Self {
        self.paths.push(path.into());
        self
    }

    /// Append a path parameter.
    pub fn path_param(mut self, param: Parameter) -> Self {
        self.path_params.push(param);
        self
    }

    /// Append a query parameter.
    pub fn query_param(mut self, param: Parameter) -> Self {
        self.query_params.push(param);
        self
    }

    /// Set the request body type.
    pub fn request(mut self, ty: TypeNode) -> Self {
        self.request = Some(ty);
        self
    }

    /// Set the response body type.
    pub fn response(mut self, ty: TypeNode) -> Self {
        self.response = Some(ty);
        self
    }

    /// Set the operation description.
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Set the return value description.
    pub fn return_doc(mut self, doc: impl Into<String>) -> Self {
        self.return_doc = Some(doc.into());
        self
    }

    /// Replace the publication scopes.
    pub fn scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Scope::new).collect();
        self
    }

    /// Append a stability trait.
    pub fn stability(mut self, name: &str) -> Self {
        self.traits.push(StabilityTrait::new(name));
        self
    }

    /// Set the required security scheme.
    pub fn secured_by(mut self, security: SecurityRequirement) -> Self {
        self.security = Some(security);
        self
    }

    /// Whether the endpoint is published to `scope`.
    pub fn is_in_scope(&self, scope: &Scope) -> bool {
        scope.is_all() || self.scopes.contains(scope)
    }

    /// Path parameter declared under `name`.
    pub fn path_param_named(&self, name: &str) -> Option<&Parameter> {
        self.path_params.iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_defaults_from_json() {
        let endpoint: Endpoint = serde_json::from_str(
            r#"{ "method": "GET", "paths": ["/widgets"] }"#,
        )
        .unwrap();
        assert_eq!(endpoint.method, HttpMethod::Get);
        assert_eq!(endpoint.scopes, vec![Scope::public()]);
        assert!(endpoint.traits.is_empty());
        assert!(endpoint.response.is_none());
    }

    #[test]
    fn test_scope_membership() {
        let endpoint = Endpoint::new(HttpMethod::Get, "/pubpriv").scopes(["public", "private"]);
        assert!(endpoint.is_in_scope(&Scope::all()));
        assert!(endpoint.is_in_scope(&Scope::public()));
        assert!(endpoint.is_in_scope(&Scope::new("private")));
        assert!(!endpoint.is_in_scope(&Scope::new("experimental")));
    }

    #[test]
    fn test_enumerated_parameter_type_fills_allowed_values() {
        let param = Parameter::new("color")
            .with_type(TypeNode::enumeration("Color", ["RED", "GREEN", "BLUE"]));
        assert_eq!(
            param.allowed_values.as_deref(),
            Some(&["RED".to_string(), "GREEN".to_string(), "BLUE".to_string()][..])
        );
    }

    #[test]
    fn test_oauth2_scopes() {
        let security = SecurityRequirement::oauth2(["svc:read", "svc:admin"]);
        assert_eq!(security.scheme, "oauth_2_0");
        assert_eq!(security.scopes(), ["svc:read", "svc:admin"]);
    }

    #[test]
    fn test_security_parameters_keep_declared_order() {
        let security = SecurityRequirement::new("custom")
            .parameter("zones", ["eu"])
            .parameter("audiences", ["svc"]);
        let json = serde_json::to_value(&security).unwrap();
        assert_eq!(
            json["parameters"],
            serde_json::json!([["zones", ["eu"]], ["audiences", ["svc"]]])
        );
        let back: SecurityRequirement = serde_json::from_value(json).unwrap();
        assert_eq!(back, security);
        assert!(back.scopes().is_empty());
    }

    #[test]
    fn test_known_trait_rank() {
        assert_eq!(StabilityTrait::experimental().known_rank(), Some(0));
        assert_eq!(StabilityTrait::deprecated().known_rank(), Some(1));
        assert_eq!(StabilityTrait::new("beta").known_rank(), None);
    }

    #[test]
    fn test_method_serde_is_upper_case() {
        let json = serde_json::to_string(&HttpMethod::Options).unwrap();
        assert_eq!(json, "\"OPTIONS\"");
        assert_eq!(HttpMethod::Options.key(), "options");
    }
}
