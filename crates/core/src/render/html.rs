use serde::Serialize;
use tera::{Context, Tera};

use restdoc_model::{ContainerKind, Parameter, TypeNode};

use super::{Renderer, escape_html};
use crate::error::RenderError;
use crate::view::{ApiView, Resource, ResourceMethod, UriParameter};

const PAGE_TEMPLATE: &str = include_str!("../../templates/api.html.tera");

/// Single-page HTML documentation.
///
/// Every string reaching the template is escaped here, and type graphs are
/// pre-rendered to markup, so the template runs without auto-escaping.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn format(&self) -> &str {
        "html"
    }

    fn render(&self, view: &ApiView) -> Result<String, RenderError> {
        let context = Context::from_serialize(Page::from_view(view))?;
        Ok(Tera::one_off(PAGE_TEMPLATE, &context, false)?)
    }
}

// =============================================================================
// Page model
// =============================================================================

#[derive(Debug, Serialize)]
struct Page {
    title: String,
    version: Option<String>,
    base_path: Option<String>,
    documentation: Vec<DocSection>,
    traits: Vec<TraitRow>,
    resources: Vec<ResourceSection>,
}

#[derive(Debug, Serialize)]
struct DocSection {
    title: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct TraitRow {
    name: String,
    description: String,
}

#[derive(Debug, Serialize)]
struct ResourceSection {
    path: String,
    methods: Vec<MethodSection>,
}

#[derive(Debug, Serialize)]
struct MethodSection {
    anchor: String,
    method: &'static str,
    operation: String,
    doc: Option<String>,
    return_doc: Option<String>,
    traits: Vec<String>,
    security: Option<String>,
    uri_parameters: Vec<ParamRow>,
    query_parameters: Vec<ParamRow>,
    request: Option<String>,
    response: Option<String>,
}

#[derive(Debug, Serialize)]
struct ParamRow {
    name: String,
    ty: String,
    description: Option<String>,
    allowed: Option<String>,
    required: bool,
}

fn escape_opt(text: Option<&String>) -> Option<String> {
    text.filter(|t| !t.is_empty()).map(|t| escape_html(t))
}

impl Page {
    fn from_view(view: &ApiView) -> Self {
        let mut resources = Vec::new();
        let mut stack: Vec<(&Resource, Vec<&UriParameter>)> = view
            .resources
            .iter()
            .rev()
            .map(|r| (r, Vec::new()))
            .collect();

        while let Some((resource, inherited)) = stack.pop() {
            let mut in_scope = inherited;
            in_scope.extend(resource.uri_parameters.iter());
            resources.push(ResourceSection {
                path: escape_html(&resource.path),
                methods: resource
                    .methods
                    .iter()
                    .map(|m| MethodSection::new(resource, m, &in_scope))
                    .collect(),
            });
            for child in resource.children.iter().rev() {
                stack.push((child, in_scope.clone()));
            }
        }

        Self {
            title: escape_html(&view.title),
            version: escape_opt(view.version.as_ref()),
            base_path: escape_opt(view.base_path.as_ref()),
            documentation: view
                .documentation
                .iter()
                .map(|item| DocSection {
                    title: escape_html(&item.title),
                    content: escape_html(&item.content),
                })
                .collect(),
            traits: view
                .traits
                .iter()
                .map(|t| TraitRow {
                    name: escape_html(t.name()),
                    description: escape_html(&t.description()),
                })
                .collect(),
            resources,
        }
    }
}

impl MethodSection {
    fn new(resource: &Resource, method: &ResourceMethod, uri_parameters: &[&UriParameter]) -> Self {
        let endpoint = &method.endpoint;
        let security = endpoint.security.as_ref().map(|security| {
            let scopes = security.scopes();
            if scopes.is_empty() {
                escape_html(&security.scheme)
            } else {
                escape_html(&format!("{} ({})", security.scheme, scopes.join(", ")))
            }
        });

        Self {
            anchor: escape_html(&format!("{}:{}", resource.path, endpoint.method.key())),
            method: endpoint.method.as_str(),
            operation: escape_html(&endpoint.operation),
            doc: escape_opt(endpoint.doc.as_ref()),
            return_doc: escape_opt(endpoint.return_doc.as_ref()),
            traits: method.traits.iter().map(|t| escape_html(t.name())).collect(),
            security,
            uri_parameters: uri_parameters
                .iter()
                .map(|p| ParamRow {
                    name: escape_html(&p.name),
                    ty: p
                        .ty
                        .as_ref()
                        .map_or_else(|| primitive_html("string"), type_html),
                    description: escape_opt(p.description.as_ref()),
                    allowed: allowed_html(p.allowed_values.as_deref()),
                    required: true,
                })
                .collect(),
            query_parameters: endpoint.query_params.iter().map(query_row).collect(),
            request: endpoint.request.as_ref().map(type_html),
            response: endpoint.response.as_ref().map(type_html),
        }
    }
}

fn query_row(param: &Parameter) -> ParamRow {
    ParamRow {
        name: escape_html(&param.name),
        ty: param
            .ty
            .as_ref()
            .map_or_else(|| primitive_html("string"), type_html),
        description: escape_opt(param.description.as_ref()),
        allowed: allowed_html(param.allowed_values.as_deref()),
        required: param.required,
    }
}

fn allowed_html(values: Option<&[String]>) -> Option<String> {
    values
        .filter(|v| !v.is_empty())
        .map(|v| escape_html(&v.join(", ")))
}

// =============================================================================
// Type graphs
// =============================================================================

fn primitive_html(name: &str) -> String {
    format!(
        "<span class=\"json-primitive-type\">{}</span>",
        escape_html(name)
    )
}

/// Markup for a type graph. A recursion point shows the ancestor it refers
/// back to instead of being expanded again.
pub(crate) fn type_html(node: &TypeNode) -> String {
    match node {
        TypeNode::Primitive { name } => primitive_html(name),
        TypeNode::Object { name, fields } => {
            let mut out = format!(
                "<div class=\"json-object\"><span class=\"json-object-type\">{}</span> {{<ul>",
                escape_html(name)
            );
            for field in fields {
                out.push_str("<li><span class=\"json-field-name\">");
                out.push_str(&escape_html(&field.name));
                out.push_str("</span>: ");
                out.push_str(&type_html(&field.ty));
                out.push_str("</li>");
            }
            out.push_str("</ul>}</div>");
            out
        }
        TypeNode::Container { container, element } => {
            let label = match container {
                ContainerKind::Map => "map of string to",
                ContainerKind::Set => "set of",
                ContainerKind::Array => "array of",
                ContainerKind::List => "list of",
            };
            format!(
                "<span class=\"json-container-type\">{label}</span> {}",
                type_html(element)
            )
        }
        TypeNode::Enumeration { name, literals } => format!(
            "<span class=\"json-enum-type\" title=\"{}\">{}</span>",
            escape_html(name),
            escape_html(&literals.join(" | "))
        ),
        TypeNode::Reference { target, .. } => format!(
            "<span class=\"json-recursive-type\" title=\"recursive reference\">&#x21ba; {}</span>",
            escape_html(target)
        ),
    }
}
