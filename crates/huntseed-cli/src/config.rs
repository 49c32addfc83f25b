use std::path::{Path, PathBuf};

use huntseed_core::{SeedConfig, Secret};

use crate::CliError;

pub const SECRET_ENV: &str = "HUNTSEED_JWT_SECRET";
pub const OUTPUT_DIR_ENV: &str = "HUNTSEED_OUTPUT_DIR";

/// Read the TOML file at `path` (defaults when absent) and apply the
/// environment overrides.
pub fn load(path: Option<&Path>) -> Result<SeedConfig, CliError> {
    let mut config = match path {
        Some(path) => {
            let contents = std::fs::read_to_string(path).map_err(|err| {
                CliError::InvalidConfig(format!("cannot read {}: {err}", path.display()))
            })?;
            parse(&contents)?
        }
        None => SeedConfig::default(),
    };
    apply_env(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

pub fn parse(contents: &str) -> Result<SeedConfig, CliError> {
    Ok(toml::from_str(contents)?)
}

/// Environment values win over the file; empty values are ignored.
pub fn apply_env<F>(config: &mut SeedConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(secret) = lookup(SECRET_ENV).filter(|value| !value.is_empty()) {
        config.auth.jwt_secret = Some(Secret::new(secret));
    }
    if let Some(dir) = lookup(OUTPUT_DIR_ENV).filter(|value| !value.is_empty()) {
        config.output.dir = PathBuf::from(dir);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
seed = 9

[scale]
total_users = 50
total_groups = 50

[output]
dir = "fixtures"
log_interval = 10

[output.log_intervals]
chat_messages = 2

[auth]
jwt_secret = "from-file"
"#;

    #[test]
    fn sample_config_parses() {
        let config = parse(SAMPLE).expect("config");
        assert_eq!(config.seed, 9);
        assert_eq!(config.scale.total_users, 50);
        assert_eq!(config.scale.members_per_group, 5);
        assert_eq!(config.output.interval_for("chat_messages"), 2);
        assert_eq!(config.output.interval_for("users"), 10);
        assert_eq!(
            config.auth.jwt_secret.as_ref().map(Secret::expose),
            Some("from-file")
        );
    }

    #[test]
    fn environment_overrides_file() {
        let mut config = parse(SAMPLE).expect("config");
        apply_env(&mut config, |key| match key {
            SECRET_ENV => Some("from-env".to_string()),
            OUTPUT_DIR_ENV => Some("/tmp/huntseed".to_string()),
            _ => None,
        });
        assert_eq!(
            config.auth.jwt_secret.as_ref().map(Secret::expose),
            Some("from-env")
        );
        assert_eq!(config.output.dir, PathBuf::from("/tmp/huntseed"));
    }

    #[test]
    fn empty_environment_values_are_ignored() {
        let mut config = parse(SAMPLE).expect("config");
        apply_env(&mut config, |_| Some(String::new()));
        assert_eq!(
            config.auth.jwt_secret.as_ref().map(Secret::expose),
            Some("from-file")
        );
        assert_eq!(config.output.dir, PathBuf::from("fixtures"));
    }

    #[test]
    fn typos_are_config_errors() {
        let result = parse("[scale]\ntotal_user = 10\n");
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn bundled_example_parses() {
        let contents = include_str!("../../../config/huntseed.example.toml");
        let config = parse(contents).expect("example config");
        assert_eq!(config.scale.total_users, 10_000);
    }
}
