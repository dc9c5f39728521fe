//! Merge fragments and write one artifact per grouping and format.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use restdoc_core::{Assembler, AssemblyRequest, RendererRegistry};
use tracing::info;

use crate::config::{AssembleConfig, load_config};
use crate::run_cli;
use crate::selection::{Selection, SelectionArgs};

/// Artifact base name when neither flags nor configuration set one.
pub const DEFAULT_NAME: &str = "ApiDocs";
/// Output directory when neither flags nor configuration set one.
pub const DEFAULT_OUTPUT: &str = "restdoc-out";
/// Format rendered when none is requested.
pub const DEFAULT_FORMAT: &str = "html";

/// Flags of `restdoc assemble`.
#[derive(Args, Debug, Clone, Default)]
pub struct AssembleArgs {
    /// Inputs and filters.
    #[command(flatten)]
    pub selection: SelectionArgs,
    /// Directory artifacts are written to
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
    /// Base name of every artifact
    #[arg(short, long)]
    pub name: Option<String>,
    /// Output format: html, raml or json (repeatable)
    #[arg(short = 'f', long = "format", value_name = "FORMAT")]
    pub formats: Vec<String>,
}

/// Fully resolved assembly settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblySettings {
    /// Inputs and merge settings.
    pub selection: Selection,
    /// Output directory.
    pub output: PathBuf,
    /// Artifact base name.
    pub name: String,
    /// Formats to render.
    pub formats: Vec<String>,
}

impl AssemblySettings {
    /// Layer `args` over `config`, then over the defaults.
    pub fn resolve(args: AssembleArgs, config: &AssembleConfig) -> Self {
        let formats = if !args.formats.is_empty() {
            args.formats
        } else if !config.formats.is_empty() {
            config.formats.clone()
        } else {
            vec![DEFAULT_FORMAT.to_string()]
        };

        Self {
            selection: Selection::resolve(args.selection, config),
            output: args
                .output
                .or_else(|| config.output.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
            name: args
                .name
                .or_else(|| config.name.clone())
                .unwrap_or_else(|| DEFAULT_NAME.to_string()),
            formats,
        }
    }
}

/// Files written and artifacts that failed to render.
#[derive(Debug, Default)]
pub struct AssemblySummary {
    /// Paths of the written artifacts.
    pub written: Vec<PathBuf>,
    /// Names of the artifacts that failed to render.
    pub failed: Vec<String>,
}

/// Entry point of `restdoc assemble`.
pub fn run(args: AssembleArgs) -> i32 {
    run_cli(|| run_inner(args))
}

fn run_inner(args: AssembleArgs) -> Result<(), String> {
    let cwd = std::env::current_dir()
        .map_err(|err| format!("Failed to determine working directory: {err}"))?;
    let config = load_config(args.selection.config.as_deref(), &cwd)?;
    let settings = AssemblySettings::resolve(args, &config.assemble);

    let summary = assemble(&settings)?;
    for path in &summary.written {
        println!("{}", path.display());
    }
    if summary.failed.is_empty() {
        Ok(())
    } else {
        Err(format!(
            "{} artifact(s) failed to render: {}",
            summary.failed.len(),
            summary.failed.join(", ")
        ))
    }
}

/// Load, merge and render, writing every successfully rendered artifact
/// below the output directory. Render failures are collected, not fatal.
pub fn assemble(settings: &AssemblySettings) -> Result<AssemblySummary, String> {
    let fragments = settings.selection.load_fragments()?;
    let mut request = AssemblyRequest::new(settings.name.clone())
        .options(settings.selection.merge_options()?);
    request.formats.clone_from(&settings.formats);

    let registry = RendererRegistry::with_builtin();
    let artifacts = Assembler::new(&registry)
        .run(&fragments, &request)
        .map_err(|err| err.to_string())?;

    let mut summary = AssemblySummary::default();
    for artifact in artifacts {
        match artifact.outcome {
            Ok(text) => {
                let path = write_artifact(&settings.output, &artifact.name, &text)?;
                summary.written.push(path);
            }
            Err(err) => {
                eprintln!("Failed to render {}: {err}", artifact.name);
                summary.failed.push(artifact.name);
            }
        }
    }

    info!(
        written = summary.written.len(),
        failed = summary.failed.len(),
        output = %settings.output.display(),
        "Assembly finished."
    );
    Ok(summary)
}

fn write_artifact(output: &Path, name: &str, text: &str) -> Result<PathBuf, String> {
    fs::create_dir_all(output)
        .map_err(|err| format!("Failed to create {}: {err}", output.display()))?;
    let path = output.join(name);
    fs::write(&path, text).map_err(|err| format!("Failed to write {}: {err}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_nothing_given() {
        let settings = AssemblySettings::resolve(AssembleArgs::default(), &AssembleConfig::default());
        assert_eq!(settings.name, DEFAULT_NAME);
        assert_eq!(settings.output, PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(settings.formats, vec![DEFAULT_FORMAT]);
    }

    #[test]
    fn test_flags_override_config() {
        let config = AssembleConfig {
            name: Some("FromConfig".to_string()),
            formats: vec!["raml".to_string()],
            ..AssembleConfig::default()
        };
        let args = AssembleArgs {
            name: Some("FromFlag".to_string()),
            ..AssembleArgs::default()
        };
        let settings = AssemblySettings::resolve(args, &config);
        assert_eq!(settings.name, "FromFlag");
        assert_eq!(settings.formats, vec!["raml"]);
    }
}
