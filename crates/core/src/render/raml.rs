use serde_yaml::{Mapping, Number, Value};

use restdoc_model::{Endpoint, Parameter, SecurityRequirement, TypeNode};

use super::Renderer;
use super::schema::json_schema;
use crate::error::RenderError;
use crate::view::{ApiView, Resource, ResourceMethod, UriParameter};

const RAML_HEADER: &str = "#%RAML 0.8";
const JSON_MEDIA_TYPE: &str = "application/json";

/// RAML 0.8 document.
///
/// Resources nest exactly as in the view, so each URI parameter is declared
/// only on the resource whose relative path introduces it.
#[derive(Debug, Default, Clone, Copy)]
pub struct RamlRenderer;

impl Renderer for RamlRenderer {
    fn format(&self) -> &str {
        "raml"
    }

    fn render(&self, view: &ApiView) -> Result<String, RenderError> {
        let body = serde_yaml::to_string(&Value::Mapping(document(view)?))?;
        Ok(format!("{RAML_HEADER}\n{body}"))
    }
}

fn key(name: &str) -> Value {
    Value::String(name.to_string())
}

fn strings(values: &[String]) -> Value {
    Value::Sequence(values.iter().map(|v| key(v)).collect())
}

fn document(view: &ApiView) -> Result<Mapping, RenderError> {
    let mut doc = Mapping::new();
    doc.insert(key("title"), key(&view.title));
    if let Some(version) = &view.version {
        doc.insert(key("version"), key(version));
    }
    if let Some(base_path) = &view.base_path {
        doc.insert(key("baseUri"), key(base_path));
    }

    if !view.documentation.is_empty() {
        let items = view
            .documentation
            .iter()
            .map(|item| {
                let mut entry = Mapping::new();
                entry.insert(key("title"), key(&item.title));
                entry.insert(key("content"), key(&item.content));
                Value::Mapping(entry)
            })
            .collect();
        doc.insert(key("documentation"), Value::Sequence(items));
    }

    if !view.security_schemes.is_empty() {
        let schemes = view
            .security_schemes
            .iter()
            .map(|scheme| {
                let mut settings = Mapping::new();
                if !scheme.scopes.is_empty() {
                    settings.insert(key("scopes"), strings(&scheme.scopes));
                }
                let mut declaration = Mapping::new();
                declaration.insert(key("type"), key(&scheme_type(&scheme.name)));
                if !settings.is_empty() {
                    declaration.insert(key("settings"), Value::Mapping(settings));
                }
                let mut entry = Mapping::new();
                entry.insert(key(&scheme.name), Value::Mapping(declaration));
                Value::Mapping(entry)
            })
            .collect();
        doc.insert(key("securitySchemes"), Value::Sequence(schemes));
    }

    if !view.traits.is_empty() {
        let traits = view
            .traits
            .iter()
            .map(|t| {
                let mut declaration = Mapping::new();
                declaration.insert(key("description"), key(&t.description()));
                let mut entry = Mapping::new();
                entry.insert(key(t.name()), Value::Mapping(declaration));
                Value::Mapping(entry)
            })
            .collect();
        doc.insert(key("traits"), Value::Sequence(traits));
    }

    for resource in &view.resources {
        doc.insert(key(&resource.relative_path), resource_value(resource)?);
    }
    Ok(doc)
}

fn scheme_type(scheme: &str) -> String {
    match scheme {
        SecurityRequirement::OAUTH2 => "OAuth 2.0".to_string(),
        "oauth_1_0" => "OAuth 1.0".to_string(),
        "basic" => "Basic Authentication".to_string(),
        "digest" => "Digest Authentication".to_string(),
        other => format!("x-{other}"),
    }
}

fn resource_value(resource: &Resource) -> Result<Value, RenderError> {
    let mut map = Mapping::new();
    if !resource.uri_parameters.is_empty() {
        let params = resource
            .uri_parameters
            .iter()
            .map(|p| (key(&p.name), Value::Mapping(uri_parameter(p))))
            .collect();
        map.insert(key("uriParameters"), Value::Mapping(params));
    }
    for method in &resource.methods {
        map.insert(key(method.endpoint.method.key()), method_value(method)?);
    }
    for child in &resource.children {
        map.insert(key(&child.relative_path), resource_value(child)?);
    }
    Ok(Value::Mapping(map))
}

fn uri_parameter(param: &UriParameter) -> Mapping {
    let mut map = Mapping::new();
    map.insert(key("type"), key(raml_type(param.ty.as_ref())));
    if let Some(description) = &param.description {
        map.insert(key("description"), key(description));
    }
    if let Some(values) = &param.allowed_values {
        map.insert(key("enum"), strings(values));
    }
    map
}

fn query_parameter(param: &Parameter) -> Mapping {
    let mut map = Mapping::new();
    map.insert(key("type"), key(raml_type(param.ty.as_ref())));
    if let Some(description) = &param.description {
        map.insert(key("description"), key(description));
    }
    if let Some(values) = param.allowed_values.as_ref().filter(|v| !v.is_empty()) {
        map.insert(key("enum"), strings(values));
    }
    map.insert(key("required"), Value::Bool(param.required));
    map
}

fn method_value(method: &ResourceMethod) -> Result<Value, RenderError> {
    let endpoint = &method.endpoint;
    let mut map = Mapping::new();

    if let Some(description) = endpoint
        .doc
        .as_ref()
        .filter(|d| !d.is_empty())
        .or_else(|| Some(&endpoint.operation).filter(|o| !o.is_empty()))
    {
        map.insert(key("description"), key(description));
    }
    if !method.traits.is_empty() {
        let names = method.traits.iter().map(|t| key(t.name())).collect();
        map.insert(key("is"), Value::Sequence(names));
    }
    if let Some(security) = &endpoint.security {
        map.insert(key("securedBy"), secured_by(security));
    }
    if !endpoint.query_params.is_empty() {
        let params = endpoint
            .query_params
            .iter()
            .map(|p| (key(&p.name), Value::Mapping(query_parameter(p))))
            .collect();
        map.insert(key("queryParameters"), Value::Mapping(params));
    }
    if let Some(request) = &endpoint.request {
        map.insert(key("body"), json_body(request)?);
    }
    if let Some(responses) = responses(endpoint)? {
        map.insert(key("responses"), responses);
    }
    Ok(Value::Mapping(map))
}

fn secured_by(security: &SecurityRequirement) -> Value {
    let entry = if security.parameters.is_empty() {
        key(&security.scheme)
    } else {
        let parameters = security
            .parameters
            .iter()
            .map(|(name, values)| (key(name), strings(values)))
            .collect();
        let mut entry = Mapping::new();
        entry.insert(key(&security.scheme), Value::Mapping(parameters));
        Value::Mapping(entry)
    };
    Value::Sequence(vec![entry])
}

fn json_body(node: &TypeNode) -> Result<Value, RenderError> {
    let schema = serde_json::to_string_pretty(&json_schema(node))?;
    let mut media = Mapping::new();
    media.insert(key("schema"), Value::String(schema));
    let mut body = Mapping::new();
    body.insert(key(JSON_MEDIA_TYPE), Value::Mapping(media));
    Ok(Value::Mapping(body))
}

fn responses(endpoint: &Endpoint) -> Result<Option<Value>, RenderError> {
    let return_doc = endpoint.return_doc.as_ref().filter(|d| !d.is_empty());
    if endpoint.response.is_none() && return_doc.is_none() {
        return Ok(None);
    }

    let mut ok = Mapping::new();
    if let Some(doc) = return_doc {
        ok.insert(key("description"), key(doc));
    }
    if let Some(response) = &endpoint.response {
        ok.insert(key("body"), json_body(response)?);
    }
    let mut responses = Mapping::new();
    responses.insert(Value::Number(Number::from(200_u64)), Value::Mapping(ok));
    Ok(Some(Value::Mapping(responses)))
}

/// RAML 0.8 named-parameter type for a parameter's type graph.
fn raml_type(ty: Option<&TypeNode>) -> &'static str {
    let Some(TypeNode::Primitive { name }) = ty else {
        return "string";
    };
    match name.to_ascii_lowercase().as_str() {
        "int" | "integer" | "long" | "short" | "byte" | "biginteger" => "integer",
        "float" | "double" | "number" | "decimal" | "bigdecimal" => "number",
        "boolean" | "bool" => "boolean",
        "date" | "datetime" | "date-time" | "timestamp" | "instant" => "date",
        _ => "string",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::merge::{MergeOptions, merge};
    use restdoc_model::{Fragment, HttpMethod};

    fn render(fragment: Fragment) -> (String, Value) {
        let views = merge(&[fragment], &MergeOptions::default()).unwrap();
        let text = RamlRenderer.render(&views[0]).unwrap();
        let parsed: Value = serde_yaml::from_str(&text).unwrap();
        (text, parsed)
    }

    #[test]
    fn test_header_and_title() {
        let (text, doc) = render(
            Fragment::new("A.java").endpoint(Endpoint::new(HttpMethod::Get, "/a")),
        );
        assert!(text.starts_with("#%RAML 0.8\n"));
        assert_eq!(doc["title"].as_str(), Some("API"));
        assert!(doc.get("/a").and_then(|r| r.get("get")).is_some());
    }

    #[test]
    fn test_security_and_traits() {
        let (_, doc) = render(
            Fragment::new("Secure.java")
                .endpoint(
                    Endpoint::new(HttpMethod::Get, "/secure")
                        .stability("experimental")
                        .secured_by(SecurityRequirement::oauth2(["svc:read", "svc:admin"])),
                )
                .endpoint(Endpoint::new(HttpMethod::Get, "/open")),
        );

        let secured = &doc["/secure"]["get"]["securedBy"][0]["oauth_2_0"]["scopes"];
        assert_eq!(secured[0].as_str(), Some("svc:read"));
        assert_eq!(secured[1].as_str(), Some("svc:admin"));
        assert_eq!(doc["/secure"]["get"]["is"][0].as_str(), Some("experimental"));
        assert!(doc["/open"]["get"].get("securedBy").is_none());
        assert!(doc["/open"]["get"].get("is").is_none());
        assert!(doc["traits"][0].get("experimental").is_some());
        assert_eq!(doc["securitySchemes"][0]["oauth_2_0"]["type"].as_str(), Some("OAuth 2.0"));
    }

    #[test]
    fn test_secured_by_keeps_parameter_order() {
        let (_, doc) = render(Fragment::new("Zoned.java").endpoint(
            Endpoint::new(HttpMethod::Get, "/zoned").secured_by(
                SecurityRequirement::new("custom")
                    .parameter("zones", ["eu", "us"])
                    .parameter("audiences", ["svc"]),
            ),
        ));

        let entry = doc["/zoned"]["get"]["securedBy"][0]["custom"]
            .as_mapping()
            .unwrap();
        let names: Vec<_> = entry.keys().map(|k| k.as_str().unwrap()).collect();
        assert_eq!(names, vec!["zones", "audiences"]);
        let zones = &doc["/zoned"]["get"]["securedBy"][0]["custom"]["zones"];
        assert_eq!(zones[1].as_str(), Some("us"));
    }

    #[test]
    fn test_response_schema_is_json() {
        let (_, doc) = render(
            Fragment::new("Uuid.java").endpoint(
                Endpoint::new(HttpMethod::Get, "/uuid")
                    .response(TypeNode::primitive("uuid"))
                    .return_doc("The id."),
            ),
        );
        let ok = &doc["/uuid"]["get"]["responses"][200];
        assert_eq!(ok["description"].as_str(), Some("The id."));
        let schema = ok["body"]["application/json"]["schema"].as_str().unwrap();
        let schema: serde_json::Value = serde_json::from_str(schema).unwrap();
        assert_eq!(schema["format"], "uuid");
    }
}
