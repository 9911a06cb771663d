use anyhow::{Error, Result};
use once_cell::sync::OnceCell;
use tracing::info;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static SUBSCRIBER: OnceCell<()> = OnceCell::new();

/// Install the global subscriber once: `RUST_LOG` filtering (default `info`)
/// and flattened JSON lines on stdout. Later calls are no-ops.
///
/// # Errors
/// Fails when another global subscriber was installed outside this function.
pub fn init() -> Result<()> {
    SUBSCRIBER.get_or_try_init(install)?;
    Ok(())
}

fn install() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = tracing_subscriber::fmt::layer()
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .try_init()
        .map_err(|e: TryInitError| Error::msg(e.to_string()))?;

    info!(
        service = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        "tracing initialized"
    );
    Ok(())
}
