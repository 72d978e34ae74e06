//! Structured logging for the command-line host.
//!
//! Events go to stderr so that stdout stays clean for reports. The filter is
//! taken from `RUST_LOG` and defaults to warnings only.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "echoroutes=warn";

pub fn init(verbose: u8) {
    let fallback = match verbose {
        0 => DEFAULT_FILTER,
        1 => "echoroutes=info",
        2 => "echoroutes=debug",
        _ => "echoroutes=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into());
    // A second initialisation (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
