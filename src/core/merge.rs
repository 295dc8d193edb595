//! Merge resolver.
//!
//! Combines base settings, one target override and the shared image mapping
//! into a fully-populated [`TargetConfig`]. Merging happens in two steps:
//!
//! 1. **Overlay**: each field takes the override's value if set, else the
//!    base's. Nothing is defaulted here, so an override's own unset fields
//!    stay distinguishable from defaults.
//! 2. **Normalize**: defaults are applied once to the overlaid record, the
//!    image is selected, and the result is validated.
//!
//! Single-target documents go through the same path with an empty override.

use std::collections::BTreeMap;

use tracing::debug;

use crate::core::config::{select_targets, AppConfig, Selected, TargetSelection};
use crate::core::constants;
use crate::core::domain::{ImageSpec, TargetConfig, TargetSettings};
use crate::core::validation::validate_target;
use crate::error::ValidationError;

/// Resolve one target.
///
/// `base` and `over` are never modified; the result owns copies of every
/// inherited value.
///
/// # Errors
///
/// Returns `ValidationError` naming `target` when no image can be selected,
/// a required field is missing, or the merged result is invalid.
pub fn resolve_target(
    base: &TargetSettings,
    over: &TargetSettings,
    images: &BTreeMap<String, ImageSpec>,
    target: &str,
) -> Result<TargetConfig, ValidationError> {
    let image = select_image(base, over, images, target)?;
    let merged = overlay(base, over);
    let config = normalize(merged, image, target)?;
    validate_target(&config)?;

    debug!(
        target,
        image = %config.image.reference(),
        env = config.env.len(),
        "target resolved"
    );
    Ok(config)
}

/// Resolve every target a selection scopes to, in selection order.
///
/// # Errors
///
/// Fails on the first selection or per-target validation error.
pub fn resolve_targets(
    config: &AppConfig,
    selection: &TargetSelection,
) -> Result<Vec<TargetConfig>, ValidationError> {
    match select_targets(config, selection)? {
        Selected::Single => {
            let name = config.single_target_name();
            let resolved = resolve_target(
                &config.base,
                &TargetSettings::default(),
                &config.images,
                &name,
            )?;
            Ok(vec![resolved])
        }
        Selected::Targets(names) => names
            .iter()
            .map(|name| {
                let over = config
                    .targets
                    .get(name)
                    .ok_or_else(|| ValidationError::UnknownTarget {
                        target: name.clone(),
                        available: config.target_names(),
                    })?;
                resolve_target(&config.base, over, &config.images, name)
            })
            .collect(),
    }
}

/// Field-by-field overlay of `over` onto `base`. Image fields are handled by
/// [`select_image`].
fn overlay(base: &TargetSettings, over: &TargetSettings) -> TargetSettings {
    fn pick<T: Clone>(over: &Option<T>, base: &Option<T>) -> Option<T> {
        over.as_ref().or(base.as_ref()).cloned()
    }

    TargetSettings {
        name: pick(&over.name, &base.name),
        image: None,
        image_key: None,
        server: pick(&over.server, &base.server),
        domains: pick(&over.domains, &base.domains),
        acme_email: pick(&over.acme_email, &base.acme_email),
        env: pick(&over.env, &base.env),
        health_check_path: pick(&over.health_check_path, &base.health_check_path),
        port: pick(&over.port, &base.port),
        replicas: pick(&over.replicas, &base.replicas),
        network: pick(&over.network, &base.network),
        volumes: pick(&over.volumes, &base.volumes),
        pre_deploy: pick(&over.pre_deploy, &base.pre_deploy),
        post_deploy: pick(&over.post_deploy, &base.post_deploy),
    }
}

/// Pick the image source by priority: the target's literal image (merged
/// over the base image, literal or looked up), the target's `image_key`,
/// then the base image.
fn select_image(
    base: &TargetSettings,
    over: &TargetSettings,
    images: &BTreeMap<String, ImageSpec>,
    target: &str,
) -> Result<ImageSpec, ValidationError> {
    for settings in [over, base] {
        if settings.image.is_some() && settings.image_key.is_some() {
            return Err(ValidationError::ConflictingImage {
                target: target.to_string(),
            });
        }
    }

    let lookup = |key: &String| {
        images
            .get(key)
            .cloned()
            .ok_or_else(|| ValidationError::UnknownImage {
                target: target.to_string(),
                key: key.clone(),
                available: images.keys().cloned().collect(),
            })
    };

    let base_image = || match (&base.image, &base.image_key) {
        (Some(image), _) => Ok(Some(image.clone())),
        (None, Some(key)) => lookup(key).map(Some),
        (None, None) => Ok(None),
    };

    if let Some(image) = &over.image {
        return Ok(match base_image()? {
            Some(base_image) => image.merged_over(&base_image),
            None => image.clone(),
        });
    }
    if let Some(key) = &over.image_key {
        return lookup(key);
    }

    base_image()?.ok_or_else(|| ValidationError::MissingImage {
        target: target.to_string(),
    })
}

/// Apply defaults and require mandatory fields.
fn normalize(
    merged: TargetSettings,
    image: ImageSpec,
    target: &str,
) -> Result<TargetConfig, ValidationError> {
    let image = image.finish(target)?;

    let server = merged
        .server
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ValidationError::MissingField {
            target: target.to_string(),
            field: "server",
        })?;

    Ok(TargetConfig {
        target: target.to_string(),
        name: merged.name.unwrap_or_else(|| target.to_string()),
        image,
        server,
        domains: merged.domains.unwrap_or_default(),
        acme_email: merged.acme_email,
        env: merged.env.unwrap_or_default(),
        health_check_path: merged
            .health_check_path
            .unwrap_or_else(|| constants::DEFAULT_HEALTH_CHECK_PATH.to_string()),
        port: merged.port.unwrap_or(constants::DEFAULT_PORT),
        replicas: merged.replicas.unwrap_or(constants::DEFAULT_REPLICAS),
        network: merged.network.unwrap_or_default(),
        volumes: merged.volumes.unwrap_or_default(),
        pre_deploy: merged.pre_deploy.unwrap_or_default(),
        post_deploy: merged.post_deploy.unwrap_or_default(),
    })
}
