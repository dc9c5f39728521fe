//! Arguments shared by every command that merges fragments.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Args;
use restdoc_core::{ExclusionSet, MergeOptions, TemplateValues};
use restdoc_model::{Fragment, Scope};
use tracing::{info, warn};

use crate::config::AssembleConfig;

/// Input and filtering flags.
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Directories or fragment files to read. Defaults to the current working directory
    #[arg(value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,
    /// Only document endpoints published to this scope (`all` for every endpoint)
    #[arg(long)]
    pub scope: Option<String>,
    /// Drop mounts whose whole path matches this pattern (repeatable)
    #[arg(short = 'x', long = "exclude", value_name = "REGEX")]
    pub exclude: Vec<String>,
    /// Value for a ${KEY} placeholder (repeatable)
    #[arg(
        short = 'D',
        long = "define",
        value_name = "KEY=VALUE",
        value_parser = parse_define
    )]
    pub defines: Vec<(String, String)>,
    /// Configuration file. Defaults to ./restdoc.toml when present
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

fn parse_define(value: &str) -> Result<(String, String), String> {
    let (key, val) = value
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{value}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in `{value}`"));
    }
    Ok((key.to_string(), val.to_string()))
}

/// Inputs and merge options after layering flags over configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Roots searched for fragments.
    pub inputs: Vec<PathBuf>,
    /// Audience to document.
    pub scope: Scope,
    /// Exclusion patterns from configuration, then flags.
    pub exclude: Vec<String>,
    /// Template values; flags override configuration.
    pub templates: BTreeMap<String, String>,
}

impl Selection {
    /// Flags win over configuration. Exclusions from both sources apply, and
    /// `--define` overrides a configured template value of the same key.
    pub fn resolve(args: SelectionArgs, config: &AssembleConfig) -> Self {
        let inputs = if !args.inputs.is_empty() {
            args.inputs
        } else if !config.inputs.is_empty() {
            config.inputs.clone()
        } else {
            vec![PathBuf::from(".")]
        };

        let scope = args
            .scope
            .or_else(|| config.scope.clone())
            .map_or_else(Scope::all, Scope::new);

        let mut exclude = config.exclude.clone();
        exclude.extend(args.exclude);

        let mut templates = config.templates.clone();
        templates.extend(args.defines);

        Self {
            inputs,
            scope,
            exclude,
            templates,
        }
    }

    /// Compile the exclusions and build the merge options.
    pub fn merge_options(&self) -> Result<MergeOptions, String> {
        let exclusions = ExclusionSet::new(&self.exclude).map_err(|err| err.to_string())?;
        let templates: TemplateValues = self.templates.clone().into_iter().collect();
        Ok(MergeOptions::new()
            .exclusions(exclusions)
            .scope(self.scope.clone())
            .templates(templates))
    }

    /// Discover and parse every fragment under the inputs.
    pub fn load_fragments(&self) -> Result<Vec<Fragment>, String> {
        let fragments =
            restdoc_common::load_fragments(&self.inputs).map_err(|err| err.to_string())?;
        if fragments.is_empty() {
            warn!(inputs = ?self.inputs, "No fragment files found.");
        } else {
            info!(
                fragments = fragments.len(),
                endpoints = fragments.iter().map(Fragment::endpoint_count).sum::<usize>(),
                "Loaded fragments."
            );
        }
        Ok(fragments)
    }
}
