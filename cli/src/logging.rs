//! Diagnostics for `ciph`.
//!
//! Every command prints its result on stdout, so diagnostics go to stderr
//! only. The filter comes from `RUST_LOG` when it is set, otherwise from the
//! `-v` count:
//!
//! | flag   | directive                            |
//! |--------|--------------------------------------|
//! | (none) | `ciph=warn,ciph_protocol=warn`       |
//! | `-v`   | `ciph=info,ciph_protocol=info`       |
//! | `-vv`  | `ciph=debug,ciph_protocol=debug`     |
//! | `-vvv` | `ciph=trace,ciph_protocol=trace`     |

use std::io::IsTerminal;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::LogFormatArg;

/// Filter directive for a `-v` count.
fn directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "ciph=warn,ciph_protocol=warn",
        1 => "ciph=info,ciph_protocol=info",
        2 => "ciph=debug,ciph_protocol=debug",
        _ => "ciph=trace,ciph_protocol=trace",
    }
}

/// Installs the global subscriber. Call once, before the command runs.
pub fn init(format: LogFormatArg, verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive(verbose)));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        // No timestamps on terminal output.
        LogFormatArg::Pretty => registry
            .with(
                fmt::layer()
                    .compact()
                    .without_time()
                    .with_target(verbose > 1)
                    .with_ansi(std::io::stderr().is_terminal())
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormatArg::Json => registry
            .with(fmt::layer().json().with_current_span(false).with_writer(std::io::stderr))
            .init(),
    }

    tracing::debug!(?format, verbose, "diagnostics enabled");
}
