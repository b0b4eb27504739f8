//! Tracing subscriber installation

use crate::config::ConfluxConfig;
use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber
///
/// `RUST_LOG` takes precedence over `default_filter`. Returns `false` if a
/// global subscriber was already installed.
pub fn init_tracing(default_filter: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_filter))
        .try_init()
        .is_ok()
}

/// Install a global subscriber as described by `config`
pub fn init_from_config(config: &ConfluxConfig) -> bool {
    if !config.log_json {
        return init_tracing(&config.log_filter);
    }
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter(&config.log_filter))
        .try_init()
        .is_ok()
}

fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_rejected() {
        let _ = init_tracing("warn");
        assert!(!init_tracing("warn"));
        assert!(!init_from_config(&ConfluxConfig::new().with_log_json(true)));
    }
}
