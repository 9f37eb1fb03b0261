//! Configuration loading shared by the services
//!
//! Settings come from process environment variables, read once at startup
//! through the `config` crate and deserialized into each service's own
//! settings struct.

use config::{Config, ConfigError, Environment};
use serde::{Deserialize, de::DeserializeOwned};

/// Deployment environment tag; only affects log verbosity and format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Env {
    #[default]
    Local,
    Dev,
    Prod,
}

/// Deserialize settings from the given environment source
///
/// Values are parsed, so `HTTP_PORT=8080` can land in an integer field and
/// `RUN_MIGRATIONS=false` in a boolean one.
pub fn load<T: DeserializeOwned>(source: Environment) -> Result<T, ConfigError> {
    Config::builder()
        .add_source(source.try_parsing(true))
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default)]
        env: Env,
        port: u16,
        enabled: bool,
    }

    fn source(pairs: &[(&str, &str)]) -> Environment {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<config::Map<String, String>>();
        Environment::default().source(Some(map))
    }

    #[test]
    fn test_load_parses_values() {
        let sample: Sample = load(source(&[
            ("ENV", "prod"),
            ("PORT", "8080"),
            ("ENABLED", "false"),
        ]))
        .unwrap();

        assert_eq!(sample.env, Env::Prod);
        assert_eq!(sample.port, 8080);
        assert!(!sample.enabled);
    }

    #[test]
    fn test_env_defaults_to_local() {
        let sample: Sample = load(source(&[("PORT", "1"), ("ENABLED", "true")])).unwrap();
        assert_eq!(sample.env, Env::Local);
    }

    #[test]
    fn test_unknown_env_is_rejected() {
        let result: Result<Sample, _> = load(source(&[
            ("ENV", "staging"),
            ("PORT", "1"),
            ("ENABLED", "true"),
        ]));
        assert!(result.is_err());
    }

    #[derive(Debug, Deserialize)]
    struct Probe {
        settings_probe_port: u16,
    }

    #[test]
    #[serial]
    fn test_load_reads_process_environment() {
        // SAFETY: serialized with every other test touching the environment
        unsafe { std::env::set_var("SETTINGS_PROBE_PORT", "4242") };
        let probe: Result<Probe, _> = load(Environment::default());
        unsafe { std::env::remove_var("SETTINGS_PROBE_PORT") };

        assert_eq!(probe.unwrap().settings_probe_port, 4242);
    }
}
