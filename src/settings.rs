use crate::router::RouterOptions;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

const ENV_VAR: &str = "STRATA_ENV";
const CASE_SENSITIVE_VAR: &str = "STRATA_CASE_SENSITIVE_ROUTING";
const STRICT_VAR: &str = "STRATA_STRICT_ROUTING";

/// The environment an application runs in.
///
/// It decides how much the default error response reveals: outside of `Production` the body carries the error
/// message, in `Production` only the reason phrase of the status. Unhandled errors aren't logged in `Test`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Env {
    #[default]
    Development,
    Production,
    Test,
}

impl FromStr for Env {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Env::Development),
            "production" | "prod" => Ok(Env::Production),
            "test" => Ok(Env::Test),
            other => Err(crate::Error::new(format!("Unknown environment: {}", other))),
        }
    }
}

impl Display for Env {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Env::Development => "development",
            Env::Production => "production",
            Env::Test => "test",
        };
        f.write_str(name)
    }
}

/// Application settings.
///
/// # Examples
///
/// ```
/// use strata::{Env, Settings};
///
/// let settings = Settings {
///     env: Env::Production,
///     strict_routing: true,
///     ..Settings::default()
/// };
/// assert!(settings.router_options().strict);
/// assert!(!settings.router_options().case_sensitive);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Settings {
    pub env: Env,
    pub case_sensitive_routing: bool,
    pub strict_routing: bool,
}

impl Settings {
    /// Reads the settings from `STRATA_ENV`, `STRATA_CASE_SENSITIVE_ROUTING` and `STRATA_STRICT_ROUTING`.
    ///
    /// Missing variables keep their default, values which can't be parsed are ignored with a warning.
    pub fn from_env() -> Settings {
        Settings::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Settings
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        if let Some(value) = lookup(ENV_VAR) {
            match value.parse() {
                Ok(env) => settings.env = env,
                Err(err) => tracing::warn!(var = ENV_VAR, %value, "{}", err),
            }
        }

        if let Some(flag) = lookup(CASE_SENSITIVE_VAR).and_then(|value| parse_flag(CASE_SENSITIVE_VAR, &value)) {
            settings.case_sensitive_routing = flag;
        }

        if let Some(flag) = lookup(STRICT_VAR).and_then(|value| parse_flag(STRICT_VAR, &value)) {
            settings.strict_routing = flag;
        }

        settings
    }

    /// The options a root router built for these settings should use.
    pub fn router_options(&self) -> RouterOptions {
        RouterOptions {
            case_sensitive: self.case_sensitive_routing,
            strict: self.strict_routing,
            ..RouterOptions::default()
        }
    }
}

fn parse_flag(var: &str, value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            tracing::warn!(var, value, "ignoring invalid boolean value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_to_development() {
        let settings = Settings::from_lookup(lookup(&[]));
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.env, Env::Development);
        assert!(settings.router_options().merge_params);
    }

    #[test]
    fn reads_every_variable() {
        let settings = Settings::from_lookup(lookup(&[
            ("STRATA_ENV", "Production"),
            ("STRATA_CASE_SENSITIVE_ROUTING", "true"),
            ("STRATA_STRICT_ROUTING", "1"),
        ]));
        assert_eq!(settings.env, Env::Production);
        assert!(settings.case_sensitive_routing);
        assert!(settings.strict_routing);
    }

    #[test]
    fn invalid_values_are_ignored() {
        let settings = Settings::from_lookup(lookup(&[("STRATA_ENV", "staging"), ("STRATA_STRICT_ROUTING", "maybe")]));
        assert_eq!(settings.env, Env::Development);
        assert!(!settings.strict_routing);
    }

    #[test]
    fn env_round_trips_through_display() {
        for env in [Env::Development, Env::Production, Env::Test] {
            assert_eq!(env.to_string().parse::<Env>().unwrap(), env);
        }
    }
}
