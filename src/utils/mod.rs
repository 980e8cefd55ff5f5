use std::sync::Once;

use tracing_subscriber::{
    filter::{Directive, LevelFilter},
    fmt, EnvFilter,
};

static TRACING_INIT: Once = Once::new();

/// Default directive used when none is configured.
pub const DEFAULT_LOG_DIRECTIVE: &str = "payment_timeline=info";

/// Initializes the global tracing subscriber.
///
/// `RUST_LOG` is honoured first and `directive` is added on top. A directive
/// that fails to parse falls back to [`DEFAULT_LOG_DIRECTIVE`]. Only the
/// first call has any effect, and an already installed global subscriber is
/// left in place.
pub fn init_tracing(directive: &str) {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::from_default_env().add_directive(parse_directive(directive));
        let _ = fmt().with_env_filter(filter).try_init();
    });
}

fn parse_directive(directive: &str) -> Directive {
    directive
        .parse()
        .or_else(|_| DEFAULT_LOG_DIRECTIVE.parse())
        .unwrap_or_else(|_| Directive::from(LevelFilter::INFO))
}
