//! Output formats.
//!
//! A [`Renderer`] turns one [`ApiView`] into the text of one artifact. The
//! assembler only ever sees renderers through the [`RendererRegistry`], so a
//! new format is added by registering another implementation.
//!
//! ## Module Structure
//!
//! - `html`: human-readable page rendered with Tera
//! - `raml`: RAML 0.8 document built as a YAML mapping
//! - `json`: the view model itself, as pretty-printed JSON
//! - `schema`: JSON Schema for `TypeNode` graphs, used by RAML bodies

mod html;
mod json;
mod raml;
mod schema;

use std::fmt;

pub use html::HtmlRenderer;
pub use json::JsonRenderer;
pub use raml::RamlRenderer;
pub use schema::json_schema;

use crate::error::RenderError;
use crate::view::ApiView;

/// Converts a view into the text of one artifact.
pub trait Renderer: Send + Sync + fmt::Debug {
    /// Format name requested by callers, e.g. `raml`.
    fn format(&self) -> &str;

    /// File extension of produced artifacts, without the dot.
    fn extension(&self) -> &str {
        self.format()
    }

    /// Text of the artifact for `view`.
    fn render(&self, view: &ApiView) -> Result<String, RenderError>;
}

/// Renderers keyed by format name.
#[derive(Debug, Default)]
pub struct RendererRegistry {
    renderers: Vec<Box<dyn Renderer>>,
}

impl RendererRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the `html`, `raml` and `json` renderers.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(HtmlRenderer));
        registry.register(Box::new(RamlRenderer));
        registry.register(Box::new(JsonRenderer));
        registry
    }

    /// Add a renderer, replacing any renderer for the same format.
    pub fn register(&mut self, renderer: Box<dyn Renderer>) -> &mut Self {
        self.renderers.retain(|r| r.format() != renderer.format());
        self.renderers.push(renderer);
        self
    }

    /// Renderer for `format`, ignoring ASCII case.
    pub fn get(&self, format: &str) -> Option<&dyn Renderer> {
        self.renderers
            .iter()
            .find(|r| r.format().eq_ignore_ascii_case(format))
            .map(Box::as_ref)
    }

    /// Registered format names in registration order.
    pub fn formats(&self) -> Vec<&str> {
        self.renderers.iter().map(|r| r.format()).collect()
    }
}

/// Escape text for inclusion in HTML. Unlike Tera's escaping, `/` is kept so
/// that paths stay readable and usable as anchors.
pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Plain;

    impl Renderer for Plain {
        fn format(&self) -> &str {
            "txt"
        }

        fn render(&self, view: &ApiView) -> Result<String, RenderError> {
            Ok(view.title.clone())
        }
    }

    #[test]
    fn test_builtin_formats() {
        let registry = RendererRegistry::with_builtin();
        assert_eq!(registry.formats(), vec!["html", "raml", "json"]);
        assert!(registry.get("RAML").is_some());
        assert!(registry.get("pdf").is_none());
    }

    #[test]
    fn test_register_custom_renderer() {
        let mut registry = RendererRegistry::with_builtin();
        registry.register(Box::new(Plain));
        let plain = registry.get("txt").unwrap();
        assert_eq!(plain.extension(), "txt");
    }

    #[test]
    fn test_escape_keeps_slashes() {
        assert_eq!(
            escape_html("<a href=\"/x\">&</a>"),
            "&lt;a href=&quot;/x&quot;&gt;&amp;&lt;/a&gt;"
        );
    }
}
