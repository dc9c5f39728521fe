use super::Renderer;
use crate::error::RenderError;
use crate::view::ApiView;

/// The resolved view model as pretty-printed JSON, for downstream tooling.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn format(&self) -> &str {
        "json"
    }

    fn render(&self, view: &ApiView) -> Result<String, RenderError> {
        let mut out = serde_json::to_string_pretty(view)?;
        out.push('\n');
        Ok(out)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::merge::{MergeOptions, merge};
    use restdoc_model::{ApiGrouping, Endpoint, Fragment, HttpMethod};

    #[test]
    fn test_json_carries_resource_tree() {
        let fragment = Fragment::new("Widgets.java").grouping(
            ApiGrouping::named("Widgets")
                .endpoint(Endpoint::new(HttpMethod::Get, "/widgets"))
                .endpoint(Endpoint::new(HttpMethod::Get, "/widgets/{id}")),
        );
        let views = merge(&[fragment], &MergeOptions::default()).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&JsonRenderer.render(&views[0]).unwrap()).unwrap();
        assert_eq!(json["id"], "Widgets");
        assert_eq!(json["resources"][0]["path"], "/widgets");
        assert_eq!(
            json["resources"][0]["children"][0]["uri_parameters"][0]["name"],
            "id"
        );
    }
}
