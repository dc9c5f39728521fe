//! Fan-out of merged views into named artifacts.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use restdoc_model::Fragment;

use crate::error::{AssembleError, RenderError};
use crate::merge::{MergeOptions, merge};
use crate::render::{Renderer, RendererRegistry};
use crate::view::ApiView;

/// One output document.
#[derive(Debug)]
pub struct Artifact {
    /// File name, e.g. `ApiDocs-Widgets.raml`.
    pub name: String,
    /// Format of the renderer that produced it.
    pub format: String,
    /// Grouping id of the rendered view; `None` for the default grouping.
    pub grouping: Option<String>,
    /// Rendered text, or why rendering failed.
    pub outcome: Result<String, RenderError>,
}

impl Artifact {
    /// Whether rendering succeeded.
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// What to assemble and how.
#[derive(Debug, Clone)]
pub struct AssemblyRequest {
    /// Stem of every artifact name.
    pub base_name: String,
    /// Formats to render, in order.
    pub formats: Vec<String>,
    /// Merge settings.
    pub options: MergeOptions,
}

impl AssemblyRequest {
    /// Request with no formats and default merge options.
    pub fn new(base_name: impl Into<String>) -> Self {
        Self {
            base_name: base_name.into(),
            formats: Vec::new(),
            options: MergeOptions::default(),
        }
    }

    /// Append a format.
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.formats.push(format.into());
        self
    }

    /// Replace the merge options.
    pub fn options(mut self, options: MergeOptions) -> Self {
        self.options = options;
        self
    }
}

/// Renders merged views through a [`RendererRegistry`].
#[derive(Debug, Clone, Copy)]
pub struct Assembler<'r> {
    renderers: &'r RendererRegistry,
}

impl<'r> Assembler<'r> {
    /// Assembler over `renderers`.
    pub fn new(renderers: &'r RendererRegistry) -> Self {
        Self { renderers }
    }

    /// Render every view in `format`. The format and the artifact names are
    /// checked before anything is rendered; render failures stay inside their
    /// own artifact.
    pub fn fan_out(
        &self,
        views: &[ApiView],
        format: &str,
        base_name: &str,
    ) -> Result<Vec<Artifact>, AssembleError> {
        let renderer = self.renderer(format)?;
        let names: Vec<String> = views
            .iter()
            .map(|view| artifact_name(base_name, view, renderer.extension()))
            .collect();
        ensure_unique(names.iter().zip(views).map(|(name, view)| (name.as_str(), view.label())))?;

        Ok(views
            .iter()
            .zip(names)
            .map(|(view, name)| {
                let outcome = renderer.render(view);
                match &outcome {
                    Ok(text) => debug!(artifact = %name, bytes = text.len(), "Rendered artifact."),
                    Err(err) => warn!(artifact = %name, error = %err, "Failed to render artifact."),
                }
                Artifact {
                    name,
                    format: renderer.format().to_string(),
                    grouping: view.id.clone(),
                    outcome,
                }
            })
            .collect())
    }

    /// Merge `fragments` once and render the views in every requested format,
    /// in (format, view) order.
    pub fn run(
        &self,
        fragments: &[Fragment],
        request: &AssemblyRequest,
    ) -> Result<Vec<Artifact>, AssembleError> {
        for format in &request.formats {
            self.renderer(format)?;
        }

        let views = merge(fragments, &request.options)?;
        info!(
            views = views.len(),
            formats = request.formats.len(),
            "Assembling documentation."
        );

        let mut artifacts = Vec::with_capacity(views.len() * request.formats.len());
        for format in &request.formats {
            artifacts.extend(self.fan_out(&views, format, &request.base_name)?);
        }
        ensure_unique(artifacts.iter().map(|artifact| {
            (
                artifact.name.as_str(),
                artifact.grouping.as_deref().unwrap_or(DEFAULT_LABEL),
            )
        }))?;
        Ok(artifacts)
    }

    fn renderer(&self, format: &str) -> Result<&'r dyn Renderer, AssembleError> {
        self.renderers
            .get(format)
            .ok_or_else(|| AssembleError::UnknownFormat {
                format: format.to_string(),
                available: self.renderers.formats().join(", "),
            })
    }
}

const DEFAULT_LABEL: &str = "<default>";

/// Fail on the first file name claimed twice.
fn ensure_unique<'a>(
    names: impl Iterator<Item = (&'a str, &'a str)>,
) -> Result<(), AssembleError> {
    let mut claimed: HashMap<&str, &str> = HashMap::new();
    for (name, grouping) in names {
        if let Some(first) = claimed.insert(name, grouping) {
            return Err(AssembleError::DuplicateArtifactName {
                name: name.to_string(),
                first: first.to_string(),
                second: grouping.to_string(),
            });
        }
    }
    Ok(())
}

/// Artifact file name for `view`: the base alone for the default grouping,
/// `{base}-{id}` for named groupings.
pub fn artifact_name(base_name: &str, view: &ApiView, extension: &str) -> String {
    match &view.id {
        None => format!("{base_name}.{extension}"),
        Some(id) => format!("{base_name}-{}.{extension}", file_safe(id)),
    }
}

fn file_safe(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
