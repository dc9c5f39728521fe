use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Crates whose events are shown by default.
const LOG_TARGETS: &[&str] = &["restdoc_cli", "restdoc_core", "restdoc_common", "restdoc_model"];

/// Install the stderr subscriber.
///
/// `RESTDOC_LOG` takes a plain level (`debug`) applied to every restdoc crate,
/// or a full filter spec. Without it, `verbosity` picks the level.
pub fn init_tracing(verbosity: u8) {
    let filter = match std::env::var("RESTDOC_LOG") {
        Ok(level) if is_plain_level(&level) => directives(&level),
        Ok(spec) => spec,
        Err(_) => directives(default_level(verbosity)),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbosity > 1)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn default_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn directives(level: &str) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn is_plain_level(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directives_cover_every_crate() {
        assert_eq!(
            directives("debug"),
            "restdoc_cli=debug,restdoc_core=debug,restdoc_common=debug,restdoc_model=debug"
        );
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(default_level(0), "warn");
        assert_eq!(default_level(1), "info");
        assert_eq!(default_level(5), "trace");
        assert!(is_plain_level("DEBUG"));
        assert!(!is_plain_level("restdoc_core=debug"));
    }
}
