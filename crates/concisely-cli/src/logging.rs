//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Filter directives used when `RUST_LOG` is unset.
fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "debug,hyper=info,reqwest=info,sqlx=warn"
    } else {
        "info,sqlx=warn"
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over
/// `--verbose`.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
