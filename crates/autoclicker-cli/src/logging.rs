use tracing_subscriber::EnvFilter;

/// Initialise logging on stderr so stdout stays a clean event stream.
///
/// Without `debug` the level is pinned to `info` and `RUST_LOG` is ignored.
/// With `debug`, `RUST_LOG` may override the `debug` default.
pub fn init(debug: bool) {
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::new("info")
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
