//! Settings read from the environment at startup.

use crate::logic::TrackedPolicy;

/// Used when `ADMIN_PASSWORD` is unset. Weak on purpose; a warning is logged.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AppConfig {
    /// Document store project. Absent means fallback mode.
    pub project_id: Option<String>,
    pub admin_password: String,
    /// When set, the tracked player is this id regardless of stored flags.
    pub tracked_id: Option<String>,
    pub host: String,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
            tracked_id: None,
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl AppConfig {
    /// Read `LEADERBOARD_PROJECT_ID`, `ADMIN_PASSWORD`, `LEADERBOARD_TRACKED_ID`, `HOST`, `PORT`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` with a custom variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        let admin_password = get("ADMIN_PASSWORD").unwrap_or_else(|| {
            log::warn!("ADMIN_PASSWORD not set, using the built-in default");
            defaults.admin_password.clone()
        });
        Self {
            project_id: get("LEADERBOARD_PROJECT_ID"),
            admin_password,
            tracked_id: get("LEADERBOARD_TRACKED_ID"),
            host: get("HOST").unwrap_or(defaults.host),
            port: get("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
        }
    }

    /// Whether a document store is configured.
    pub fn gateway_configured(&self) -> bool {
        self.project_id.is_some()
    }

    pub fn tracked_policy(&self) -> TrackedPolicy {
        match &self.tracked_id {
            Some(id) => TrackedPolicy::ReservedId(id.clone()),
            None => TrackedPolicy::StoredFlag,
        }
    }
}
