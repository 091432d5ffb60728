//! Formatter configuration.
//!
//! Flags are read once at startup ([`FormatConfig::from_env`]) and shared
//! through [`SharedConfig`]. The only runtime mutation is the emergency
//! override, [`SharedConfig::force_legacy_mode`].

use std::sync::Arc;

use parking_lot::RwLock;

/// Environment variable enabling the enhanced pipeline (`"true"` enables).
pub const ENV_ENABLED: &str = "EMAIL_V2_ENABLED";
/// Environment variable controlling legacy fallback (`"false"` disables).
pub const ENV_FALLBACK: &str = "EMAIL_V2_FALLBACK";
/// Environment variable enabling per-stage tracing (`"true"` enables).
pub const ENV_LOGGING: &str = "EMAIL_V2_LOGGING";
/// Environment variable enabling side-by-side comparison (`"true"` enables).
pub const ENV_TEST_MODE: &str = "EMAIL_V2_TEST_MODE";

// =============================================================================
// FormatConfig
// =============================================================================

/// Formatter feature flags.
///
/// The default is the safe posture: enhanced pipeline off, legacy fallback on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatConfig {
    /// Route documents through the enhanced pipeline.
    pub enabled: bool,
    /// On enhanced failure, return legacy output instead of an error.
    pub fallback_to_legacy: bool,
    /// Trace every stage completion at `debug` level.
    pub log_operations: bool,
    /// Run both pipelines, log the comparison, return the legacy output.
    pub test_mode: bool,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            fallback_to_legacy: true,
            log_operations: false,
            test_mode: false,
        }
    }
}

impl FormatConfig {
    /// Enhanced pipeline on, everything else at its default.
    pub fn enhanced() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    /// Read flags from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read flags through an arbitrary key lookup.
    ///
    /// Opt-in flags need exactly `"true"`; fallback stays on unless set to
    /// exactly `"false"`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_true = |key: &str| lookup(key).as_deref() == Some("true");
        Self {
            enabled: is_true(ENV_ENABLED),
            fallback_to_legacy: lookup(ENV_FALLBACK).as_deref() != Some("false"),
            log_operations: is_true(ENV_LOGGING),
            test_mode: is_true(ENV_TEST_MODE),
        }
    }

    /// Builder: set `enabled`.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Builder: set `fallback_to_legacy`.
    pub fn with_fallback(mut self, fallback: bool) -> Self {
        self.fallback_to_legacy = fallback;
        self
    }

    /// Builder: set `log_operations`.
    pub fn with_logging(mut self, log_operations: bool) -> Self {
        self.log_operations = log_operations;
        self
    }

    /// Builder: set `test_mode`.
    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }
}

// =============================================================================
// SharedConfig
// =============================================================================

/// Thread-safe shared configuration handle.
///
/// Clones share the same flags. Readers take a [`snapshot`](Self::snapshot)
/// once per call, so a concurrent override only affects later calls.
#[derive(Debug, Clone, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<FormatConfig>>,
}

impl SharedConfig {
    /// Share a configuration.
    pub fn new(config: FormatConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Shared configuration read from the environment.
    pub fn from_env() -> Self {
        Self::new(FormatConfig::from_env())
    }

    /// Copy of the current flags.
    pub fn snapshot(&self) -> FormatConfig {
        *self.inner.read()
    }

    /// Execute a closure with write access to the flags.
    pub fn update<R>(&self, f: impl FnOnce(&mut FormatConfig) -> R) -> R {
        let mut guard = self.inner.write();
        f(&mut guard)
    }

    /// Emergency kill switch: disable the enhanced pipeline and force legacy
    /// fallback for every subsequent call in this process. Not persisted.
    pub fn force_legacy_mode(&self) {
        self.update(|config| {
            config.enabled = false;
            config.fallback_to_legacy = true;
        });
        log::warn!("forcing legacy formatting mode (emergency override)");
    }
}

impl From<FormatConfig> for SharedConfig {
    fn from(config: FormatConfig) -> Self {
        Self::new(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_safe_posture() {
        let config = FormatConfig::default();
        assert!(!config.enabled);
        assert!(config.fallback_to_legacy);
        assert!(!config.log_operations);
        assert!(!config.test_mode);
    }

    #[test]
    fn test_from_lookup_parsing() {
        let config = FormatConfig::from_lookup(|key| match key {
            ENV_ENABLED => Some("true".into()),
            ENV_FALLBACK => Some("no".into()),
            ENV_LOGGING => Some("TRUE".into()),
            _ => None,
        });
        assert!(config.enabled);
        // only an exact "false" disables fallback
        assert!(config.fallback_to_legacy);
        // only an exact "true" enables opt-in flags
        assert!(!config.log_operations);
        assert!(!config.test_mode);

        let config = FormatConfig::from_lookup(|key| (key == ENV_FALLBACK).then(|| "false".into()));
        assert!(!config.fallback_to_legacy);
        assert!(!config.enabled);
    }

    #[test]
    fn test_force_legacy_mode_is_shared() {
        let shared = SharedConfig::new(FormatConfig::enhanced().with_fallback(false));
        let clone = shared.clone();
        let before = shared.snapshot();

        clone.force_legacy_mode();

        let after = shared.snapshot();
        assert!(!after.enabled);
        assert!(after.fallback_to_legacy);
        // snapshots taken earlier are unaffected
        assert!(before.enabled);
        assert!(!before.fallback_to_legacy);
    }

    #[test]
    fn test_shared_config_is_send_sync() {
        static_assertions::assert_impl_all!(SharedConfig: Send, Sync, Clone);
    }
}
