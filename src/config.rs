//! Runtime configuration loaded from environment variables.
//!
//! | Variable                | Default                         |
//! |-------------------------|---------------------------------|
//! | `STEPWISE_PORT`         | `3000`                          |
//! | `STEPWISE_DATABASE_URL` | `sqlite:stepwise.db?mode=rwc`   |
//! | `STEPWISE_STEP_GOAL`    | `10000`                         |
//! | `STEPWISE_CALORIE_GOAL` | `500`                           |
//!
//! Values that do not parse, or goals that are not positive, fall back to the default.

use std::env;

use crate::model::GoalConfig;

/// Default port if not specified via environment variable.
pub const DEFAULT_PORT: u16 = 3000;

/// Default database path if not specified via environment variable.
pub const DEFAULT_DB_PATH: &str = "sqlite:stepwise.db?mode=rwc";

/// Goals applied until the user sets their own.
pub const DEFAULT_GOALS: GoalConfig = GoalConfig {
    steps: 10_000,
    calories: 500.0,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub default_goals: GoalConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup("STEPWISE_PORT")
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let database_url = lookup("STEPWISE_DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());

        let steps = lookup("STEPWISE_STEP_GOAL")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_GOALS.steps);

        let calories = lookup("STEPWISE_CALORIE_GOAL")
            .and_then(|c| c.trim().parse::<f64>().ok())
            .filter(|c| c.is_finite() && *c > 0.0)
            .unwrap_or(DEFAULT_GOALS.calories);

        Self {
            port,
            database_url,
            default_goals: GoalConfig { steps, calories },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.database_url, DEFAULT_DB_PATH);
        assert_eq!(config.default_goals, DEFAULT_GOALS);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("STEPWISE_PORT", "8080"),
            ("STEPWISE_DATABASE_URL", "sqlite::memory:"),
            ("STEPWISE_STEP_GOAL", "7500"),
            ("STEPWISE_CALORIE_GOAL", "420.5"),
        ]);

        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.default_goals.steps, 7500);
        assert_eq!(config.default_goals.calories, 420.5);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config(&[
            ("STEPWISE_PORT", "not-a-port"),
            ("STEPWISE_STEP_GOAL", "0"),
            ("STEPWISE_CALORIE_GOAL", "-20"),
        ]);

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.default_goals, DEFAULT_GOALS);
    }
}
