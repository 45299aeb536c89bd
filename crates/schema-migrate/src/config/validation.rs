//! Configuration validation.

use super::Config;
use crate::core::DialectCatalog;
use crate::error::{MigrateError, Result};

/// Validate the configuration against the built-in dialects.
pub fn validate(config: &Config) -> Result<()> {
    validate_with(config, &DialectCatalog::with_builtins())
}

/// Validate the configuration against a specific dialect catalog.
pub fn validate_with(config: &Config, catalog: &DialectCatalog) -> Result<()> {
    // Source validation
    if config.source.r#type.trim().is_empty() {
        return Err(MigrateError::Config("source.type is required".into()));
    }

    // Target validation
    if config.target.r#type.trim().is_empty() {
        return Err(MigrateError::Config("target.type is required".into()));
    }
    if !catalog.has_dialect(&config.target.r#type) {
        return Err(MigrateError::Config(format!(
            "target.type '{}' is not supported. Supported types: {}",
            config.target.r#type,
            catalog.dialect_names().join(", ")
        )));
    }

    // Generator validation - only check if configured
    if let Some(generator) = &config.generator {
        if generator.command.iter().all(|part| part.trim().is_empty()) {
            return Err(MigrateError::Config(
                "generator.command must name a program".into(),
            ));
        }
        if let Some(0) = generator.timeout_secs {
            return Err(MigrateError::Config(
                "generator.timeout_secs must be at least 1".into(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseConnectionConfig, GeneratorConfig, MigrationConfig};

    fn valid_config() -> Config {
        Config {
            source: DatabaseConnectionConfig {
                r#type: "mssql".to_string(),
                host: "localhost".to_string(),
                port: Some(1433),
                database: "source_db".to_string(),
                user: "sa".to_string(),
                password: "password".to_string(),
                schema: Some("dbo".to_string()),
            },
            target: DatabaseConnectionConfig {
                r#type: "postgres".to_string(),
                host: "localhost".to_string(),
                port: Some(5432),
                database: "target_db".to_string(),
                user: "postgres".to_string(),
                password: "password".to_string(),
                schema: Some("public".to_string()),
            },
            migration: MigrationConfig::default(),
            generator: Some(GeneratorConfig {
                command: vec!["llm".to_string()],
                timeout_secs: Some(300),
            }),
        }
    }

    #[test]
    fn test_valid_config() {
        let config = valid_config();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_missing_source_type() {
        let mut config = valid_config();
        config.source.r#type = " ".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_source_may_be_any_engine() {
        let mut config = valid_config();
        config.source.r#type = "oracle".to_string();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_unsupported_target_type() {
        let mut config = valid_config();
        config.target.r#type = "db2".to_string();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("mssql, mysql, postgres"));
    }

    #[test]
    fn test_target_alias_accepted() {
        let mut config = valid_config();
        config.target.r#type = "PostgreSQL".to_string();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_empty_generator_command() {
        let mut config = valid_config();
        config.generator = Some(GeneratorConfig {
            command: vec![],
            timeout_secs: None,
        });
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_generator_timeout() {
        let mut config = valid_config();
        if let Some(generator) = config.generator.as_mut() {
            generator.timeout_secs = Some(0);
        }
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_connection_config_debug_redacts_password() {
        let mut config = valid_config();
        config.source.password = "super_secret_password_123".to_string();
        let debug_output = format!("{:?}", config.source);
        assert!(
            debug_output.contains("[REDACTED]"),
            "Debug output should contain [REDACTED]"
        );
        assert!(
            !debug_output.contains("super_secret_password_123"),
            "Debug output should not contain actual password value"
        );
    }
}
