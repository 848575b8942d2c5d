//! Strict warm-time validation
//!
//! All configuration errors are rejected up front, before any derived
//! structure is built. Nothing is validated lazily at mutation time.

use super::errors::{ConfigError, ConfigResult};
use super::types::{EntityConfig, WarmBatch};

/// Validates one entity's configuration together with its warm input.
pub fn validate_entity(config: &EntityConfig, batch: &WarmBatch) -> ConfigResult<()> {
    if config.fields.is_empty() {
        return Err(ConfigError::EmptyFields(config.name.clone()));
    }

    if let Some(hint) = &batch.hint {
        if !config.has_field(&hint.field) {
            return Err(ConfigError::UnknownHintField {
                entity: config.name.clone(),
                field: hint.field.clone(),
            });
        }
    }

    let mut seen = Vec::new();
    for prefilter in &config.prefilters {
        match &prefilter.field {
            None => {
                if prefilter.maintain_unique.is_empty() {
                    return Err(ConfigError::IllegalGlobalPrefilter(config.name.clone()));
                }
            }
            Some(field) => {
                if !config.has_field(field) {
                    return Err(ConfigError::UnknownPrefilterField {
                        entity: config.name.clone(),
                        field: field.clone(),
                    });
                }
                if seen.contains(&field) {
                    return Err(ConfigError::DuplicatePrefilter {
                        entity: config.name.clone(),
                        field: field.clone(),
                    });
                }
                seen.push(field);
            }
        }
    }

    Ok(())
}
