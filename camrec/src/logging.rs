//! Logging setup
//!
//! Library code only emits `tracing` events. Applications decide where they
//! go by calling [`init_logging`] once at startup.

/// Directive used when neither `RUST_LOG` nor the caller supplies one
pub const DEFAULT_FILTER: &str = "info";

/// Install the global tracing subscriber.
///
/// On native targets this is a `fmt` subscriber filtered by `RUST_LOG`,
/// falling back to `filter`. On `wasm32` events go to the browser console,
/// capped at the level [`max_level`] reads from `filter`, and panics are
/// forwarded there as well. Calling it again is a no-op.
pub fn init_logging(filter: &str) {
    #[cfg(not(target_arch = "wasm32"))]
    {
        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

        // Fails only when a global subscriber is already installed.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .try_init();
    }

    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;

        static INIT: Once = Once::new();

        let level = max_level(filter);
        INIT.call_once(|| {
            console_error_panic_hook::set_once();
            tracing_wasm::set_as_global_default_with_config(
                tracing_wasm::WASMLayerConfigBuilder::new()
                    .set_max_level(level)
                    .build(),
            );
        });
    }
}

/// Most verbose level named in a filter directive such as `"info"` or
/// `"warn,camrec=debug"`. Unrecognized directives fall back to `INFO`.
pub fn max_level(filter: &str) -> tracing::Level {
    filter
        .split(',')
        .filter_map(|directive| {
            let level = directive.rsplit('=').next()?.trim();
            level.parse::<tracing::Level>().ok()
        })
        .max()
        .unwrap_or(tracing::Level::INFO)
}
