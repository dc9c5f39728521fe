//! Command-line front end for documentation assembly.

use clap::{ArgAction, CommandFactory, Parser, Subcommand};

pub mod assemble;
pub mod config;
pub mod inspect;
mod logging;
pub mod selection;

pub use logging::init_tracing;

#[derive(Parser)]
#[command(
    name = "restdoc",
    version,
    about = "Assemble REST API documentation from extracted fragments"
)]
struct Cli {
    #[arg(short, long, action = ArgAction::Count, global = true, help = "Increase log verbosity")]
    verbose: u8,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render documentation artifacts
    Assemble(assemble::AssembleArgs),
    /// Print the merged API views
    Inspect(inspect::InspectArgs),
}

/// Run a command body, printing its error and mapping it to an exit code.
pub fn run_cli<F>(f: F) -> i32
where
    F: FnOnce() -> Result<(), String>,
{
    match f() {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

/// Parse `args` (program name first) and dispatch.
pub fn run(args: Vec<String>) -> i32 {
    match Cli::try_parse_from(args) {
        Ok(cli) => {
            init_tracing(cli.verbose);
            match cli.command {
                Some(Commands::Assemble(args)) => assemble::run(args),
                Some(Commands::Inspect(args)) => inspect::run(args),
                None => {
                    let mut cmd = Cli::command();
                    let _ = cmd.print_help();
                    println!();
                    0
                }
            }
        }
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            code
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_assemble_flags() {
        let cli = Cli::try_parse_from([
            "restdoc", "-v", "assemble", "build", "-f", "raml", "-f", "html", "-D", "api.id=foo",
            "--scope", "public",
        ])
        .ok();
        let Some(Cli {
            verbose,
            command: Some(Commands::Assemble(args)),
        }) = cli
        else {
            unreachable!("assemble arguments should parse");
        };
        assert_eq!(verbose, 1);
        assert_eq!(args.formats, vec!["raml", "html"]);
        assert_eq!(args.selection.inputs.len(), 1);
        assert_eq!(
            args.selection.defines,
            vec![("api.id".to_string(), "foo".to_string())]
        );
    }

    #[test]
    fn test_unknown_flag_is_a_usage_error() {
        assert_eq!(run(vec!["restdoc".into(), "--bogus".into()]), 2);
    }
}
