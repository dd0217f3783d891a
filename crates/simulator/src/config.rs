use rr_core::MechanismKind;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    /// Per-run RNG seed is `base_seed + run`.
    #[serde(default = "default_base_seed")]
    pub base_seed: u64,
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
    #[serde(default = "default_mechanisms")]
    pub mechanisms: Vec<MechanismKind>,
    /// Reproduce the Fixed mechanism's last-value randomization.
    #[serde(default)]
    pub replicate_fixed_last_value: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub json: bool,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let config: Config = toml::from_str(contents)?;
        if config.simulation.mechanisms.is_empty() {
            return Err("simulation.mechanisms must list at least one mechanism".into());
        }
        Ok(config)
    }

    pub fn default_config() -> Self {
        Config {
            simulation: SimulationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            base_seed: default_base_seed(),
            results_dir: default_results_dir(),
            mechanisms: default_mechanisms(),
            replicate_fixed_last_value: false,
        }
    }
}

fn default_base_seed() -> u64 {
    22527
}
fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}
fn default_mechanisms() -> Vec<MechanismKind> {
    MechanismKind::ALL.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.simulation.base_seed, 22527);
        assert_eq!(config.simulation.results_dir, PathBuf::from("results"));
        assert_eq!(config.simulation.mechanisms, MechanismKind::ALL.to_vec());
        assert!(!config.simulation.replicate_fixed_last_value);
        assert!(!config.logging.json);
    }

    #[test]
    fn overrides_are_applied() {
        let config = Config::parse(
            r#"
            [simulation]
            base_seed = 7
            results_dir = "out"
            mechanisms = ["fixed", "fox"]
            replicate_fixed_last_value = true

            [logging]
            json = true
            "#,
        )
        .unwrap();
        assert_eq!(config.simulation.base_seed, 7);
        assert_eq!(config.simulation.results_dir, PathBuf::from("out"));
        assert_eq!(
            config.simulation.mechanisms,
            vec![MechanismKind::Fixed, MechanismKind::Fox]
        );
        assert!(config.simulation.replicate_fixed_last_value);
        assert!(config.logging.json);
    }

    #[test]
    fn unknown_mechanism_rejected() {
        assert!(Config::parse("[simulation]\nmechanisms = [\"warner\"]").is_err());
    }

    #[test]
    fn empty_mechanism_list_rejected() {
        assert!(Config::parse("[simulation]\nmechanisms = []").is_err());
    }
}
