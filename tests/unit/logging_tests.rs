// Logging tests
//
// Only one test in this binary may install the global subscriber.

use kura::config::{LogFormat, LoggingConfig};
use kura::logging::init_subscriber;

/// Test: Can initialize tracing subscriber
///
/// The first installation succeeds and events can be emitted with structured
/// fields; any later installation reports an error instead of panicking.
#[test]
fn test_can_initialize_tracing_subscriber() {
    let config = LoggingConfig {
        level: "debug".to_string(),
        format: LogFormat::Json,
    };

    let result = init_subscriber(&config);
    assert!(result.is_ok(), "first init failed: {:?}", result.err());

    tracing::info!(key = "example", size = 42u64, "subscriber installed");

    assert!(init_subscriber(&LoggingConfig::default()).is_err());
}
