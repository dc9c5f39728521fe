//! Print merged views without writing artifacts.

use clap::Args;
use restdoc_core::{ApiView, merge};

use crate::config::load_config;
use crate::run_cli;
use crate::selection::{Selection, SelectionArgs};

/// Flags of `restdoc inspect`.
#[derive(Args, Debug, Clone, Default)]
pub struct InspectArgs {
    /// Inputs and filters.
    #[command(flatten)]
    pub selection: SelectionArgs,
    /// Print one summary line per view instead of full JSON
    #[arg(long)]
    pub summary: bool,
}

/// Entry point of `restdoc inspect`.
pub fn run(args: InspectArgs) -> i32 {
    run_cli(|| run_inner(args))
}

fn run_inner(args: InspectArgs) -> Result<(), String> {
    let cwd = std::env::current_dir()
        .map_err(|err| format!("Failed to determine working directory: {err}"))?;
    let config = load_config(args.selection.config.as_deref(), &cwd)?;
    let selection = Selection::resolve(args.selection, &config.assemble);
    println!("{}", inspect(&selection, args.summary)?);
    Ok(())
}

/// Merge the selected fragments and describe the resulting views.
pub fn inspect(selection: &Selection, summary: bool) -> Result<String, String> {
    let fragments = selection.load_fragments()?;
    let views = merge(&fragments, &selection.merge_options()?).map_err(|err| err.to_string())?;
    if summary {
        Ok(views.iter().map(summary_line).collect::<Vec<_>>().join("\n"))
    } else {
        serde_json::to_string_pretty(&views)
            .map_err(|err| format!("Failed to serialize views: {err}"))
    }
}

fn summary_line(view: &ApiView) -> String {
    format!(
        "{}\t{}\t{} resources\t{} methods",
        view.label(),
        view.title,
        view.walk().len(),
        view.method_count()
    )
}
