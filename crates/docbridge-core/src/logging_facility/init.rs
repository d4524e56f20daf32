//! Logging initialization module

use serde::{Deserialize, Serialize};
use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Human-readable output for development
    #[default]
    Development,
    /// JSON structured output for production
    Production,
    /// Test capture mode for deterministic testing
    Test,
}

impl std::str::FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Profile::Development),
            "production" | "prod" | "json" => Ok(Profile::Production),
            "test" => Ok(Profile::Test),
            other => Err(format!("unknown log profile: {}", other)),
        }
    }
}

static INIT_ONCE: Once = Once::new();

impl Profile {
    /// Filter used when `RUST_LOG` is unset; `None` for the test profile
    pub fn default_filter(self) -> Option<&'static str> {
        match self {
            Profile::Development => Some("docbridge=debug"),
            Profile::Production => Some("docbridge=info"),
            Profile::Test => None,
        }
    }
}

/// Install the global subscriber for `profile`
///
/// Only the first call has any effect. `RUST_LOG` overrides the profile's
/// default filter. Development logs are human-readable, Production logs are
/// JSON lines, and Test installs a bare registry (see `init_test_capture()`).
/// Output goes to stderr; stdout carries bridge responses.
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let Some(default) = profile.default_filter() else {
            tracing_subscriber::registry().init();
            return;
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
        let builder = tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter);
        if profile == Profile::Production {
            builder.json().init();
        } else {
            builder.init();
        }
    });
}
