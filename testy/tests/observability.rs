//! Installing a global subscriber can't happen in the unit test binary, where `#[traced_test]`
//! installs its own, so this lives in a separate test binary.

use testy::observability::{LogFormat, setup_test_logging};

#[test]
fn test_setup_is_idempotent() {
    setup_test_logging(LogFormat::Pretty).unwrap();
    setup_test_logging(LogFormat::Json).unwrap();
    tracing::info!("logging is set up");
}
