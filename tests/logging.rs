use cindex_bridge::logging::{self, LogConfig};
use tracing_subscriber::util::SubscriberInitExt;

#[test]
fn test_host_subscriber_is_not_claimed() {
    assert!(!logging::is_initialized());
    tracing_subscriber::registry().try_init().unwrap();

    assert!(logging::init_logging(LogConfig::new()).is_none());
    assert!(!logging::is_initialized());

    assert!(logging::init_logging(LogConfig::from_env()).is_none());
    assert!(!logging::is_initialized());
}
