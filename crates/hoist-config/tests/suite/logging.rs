use std::sync::Mutex;

use hoist_config::{init_tracing, LoggingConfig};

// `RUST_LOG` is process-global; tests that read or write it take this lock.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn with_rust_log<R>(value: Option<&str>, f: impl FnOnce() -> R) -> R {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let previous = std::env::var_os("RUST_LOG");
    match value {
        Some(value) => std::env::set_var("RUST_LOG", value),
        None => std::env::remove_var("RUST_LOG"),
    }
    let result = f();
    match previous {
        Some(previous) => std::env::set_var("RUST_LOG", previous),
        None => std::env::remove_var("RUST_LOG"),
    }
    result
}

fn warn_level() -> LoggingConfig {
    LoggingConfig {
        level: "WARNING".to_owned(),
        json: false,
    }
}

#[test]
fn env_filter_uses_the_configured_level() {
    let filter = with_rust_log(None, || warn_level().env_filter().to_string());
    assert!(filter.contains("warn"), "{filter}");
    assert!(!filter.contains("hoist.refactor"), "{filter}");
}

#[test]
fn env_filter_merges_rust_log() {
    let filter = with_rust_log(Some("hoist.refactor=trace"), || {
        warn_level().env_filter().to_string()
    });
    assert!(filter.contains("warn"), "{filter}");
    assert!(filter.contains("hoist.refactor=trace"), "{filter}");
}

#[test]
fn blank_rust_log_is_ignored() {
    let filter = with_rust_log(Some("   "), || warn_level().env_filter().to_string());
    assert!(filter.contains("warn"), "{filter}");
}

#[test]
fn init_tracing_installs_the_subscriber_once() {
    let config = LoggingConfig {
        level: "debug".to_owned(),
        json: true,
    };
    with_rust_log(None, || {
        init_tracing(&config);
        init_tracing(&LoggingConfig::default());
    });

    tracing::debug!(target = "hoist.config", "subscriber reachable");
    let second = tracing::subscriber::set_global_default(tracing_subscriber::registry());
    assert!(second.is_err(), "init_tracing did not install a global subscriber");
}
