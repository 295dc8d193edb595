//! Validation of merged target configuration.
//!
//! Runs once per target after normalization, so every check sees the final
//! values including defaults.

use crate::core::constants;
use crate::core::domain::TargetConfig;
use crate::error::ValidationError;

/// Validate a fully merged target.
///
/// # Errors
///
/// Returns the first `ValidationError` found, naming the target.
pub fn validate_target(config: &TargetConfig) -> Result<(), ValidationError> {
    let target = config.target.as_str();

    validate_replicas(target, config.replicas)?;

    if config.port == 0 {
        return Err(ValidationError::InvalidPort {
            target: target.to_string(),
        });
    }

    for domain in &config.domains {
        validate_domain(target, &domain.domain)?;
        for alias in &domain.aliases {
            validate_domain(target, alias)?;
        }
    }

    for volume in &config.volumes {
        validate_volume(target, volume)?;
    }

    Ok(())
}

pub fn validate_replicas(target: &str, replicas: u32) -> Result<(), ValidationError> {
    if replicas == 0 || replicas > constants::MAX_REPLICAS {
        return Err(ValidationError::InvalidReplicas {
            target: target.to_string(),
            replicas,
            max: constants::MAX_REPLICAS,
        });
    }
    Ok(())
}

/// Validate a hostname.
///
/// Labels are 1-63 characters of `a-z`, `0-9` and `-`, never starting or
/// ending with a hyphen. The whole name is at most 253 characters.
pub fn validate_domain(target: &str, domain: &str) -> Result<(), ValidationError> {
    let invalid = |reason: String| ValidationError::InvalidDomain {
        target: target.to_string(),
        domain: domain.to_string(),
        reason,
    };

    if domain.is_empty() {
        return Err(invalid("empty".to_string()));
    }
    if domain.len() > 253 {
        return Err(invalid(format!("{} characters, max 253", domain.len())));
    }

    for label in domain.split('.') {
        if label.is_empty() || label.len() > 63 {
            return Err(invalid(format!(
                "label '{}' must be 1-63 characters",
                label
            )));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(invalid(format!(
                "label '{}' cannot start or end with '-'",
                label
            )));
        }
        if let Some(ch) = label
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
        {
            return Err(invalid(format!("invalid character '{}'", ch)));
        }
    }

    Ok(())
}

/// Validate a `source:/absolute/target[:ro|:rw]` volume mapping.
pub fn validate_volume(target: &str, volume: &str) -> Result<(), ValidationError> {
    let invalid = |reason| ValidationError::InvalidVolume {
        target: target.to_string(),
        volume: volume.to_string(),
        reason,
    };

    let parts: Vec<&str> = volume.split(':').collect();
    let (source, dest) = match parts.as_slice() {
        [source, dest] => (*source, *dest),
        [source, dest, mode] => {
            if !matches!(*mode, "ro" | "rw") {
                return Err(invalid("mode must be 'ro' or 'rw'"));
            }
            (*source, *dest)
        }
        _ => return Err(invalid("expected source:target[:mode]")),
    };

    if source.is_empty() {
        return Err(invalid("source is empty"));
    }
    if !dest.starts_with('/') {
        return Err(invalid("target must be an absolute path"));
    }

    Ok(())
}
