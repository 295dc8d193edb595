//! Classification of gathered sources and grouping into fetch groups.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::domain::ValueKind;
use crate::core::provider::{Provider, SecretProviders, SourceConfig};
use crate::error::{ConfigError, FetchError, Result};

use super::SourceSlot;

/// One external bundle, fetched once per pass.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct GroupKey {
    pub provider: Provider,
    pub bundle: String,
}

/// Everything needed to fetch one group and the keys read from it.
#[derive(Debug, Clone)]
pub struct FetchGroup {
    pub source: SourceConfig,
    pub keys: BTreeSet<String>,
}

/// What to do for one gathered source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Already concrete; left untouched.
    Literal,
    Env(String),
    Secret { group: GroupKey, key: String },
}

#[derive(Debug, Default)]
pub struct Plan {
    /// One step per slot, same order.
    pub steps: Vec<Step>,
    pub groups: BTreeMap<GroupKey, FetchGroup>,
}

impl Plan {
    /// Number of sources that need a value written back.
    pub fn deferred(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| !matches!(s, Step::Literal))
            .count()
    }
}

/// Build a plan for `slots`.
///
/// # Errors
///
/// - `ValidationError` for a malformed value source or secret reference
/// - `ConfigError::NoSecretProviders` if any secret reference exists and
///   `providers` is `None`
/// - `FetchError::UnsupportedProvider` for an unknown provider identifier
/// - `ConfigError::UnknownSource` if the provider has no such bundle
pub fn build(slots: &[SourceSlot<'_>], providers: Option<&SecretProviders>) -> Result<Plan> {
    let mut plan = Plan::default();

    for slot in slots {
        let step = match slot.source.kind(&slot.path)? {
            ValueKind::Literal(_) => Step::Literal,
            ValueKind::Env(name) => Step::Env(name.to_string()),
            ValueKind::Secret(reference) => {
                let providers = providers.ok_or_else(|| ConfigError::NoSecretProviders {
                    reference: reference.to_string(),
                })?;

                let provider = Provider::from_id(reference.provider()).ok_or_else(|| {
                    FetchError::UnsupportedProvider {
                        provider: reference.provider().to_string(),
                        reference: reference.to_string(),
                    }
                })?;

                let group = GroupKey {
                    provider,
                    bundle: reference.bundle().to_string(),
                };

                if !plan.groups.contains_key(&group) {
                    let source = providers.source(provider, &group.bundle).ok_or_else(|| {
                        ConfigError::UnknownSource {
                            provider: provider.id().to_string(),
                            bundle: group.bundle.clone(),
                            reference: reference.to_string(),
                        }
                    })?;
                    plan.groups.insert(
                        group.clone(),
                        FetchGroup {
                            source,
                            keys: BTreeSet::new(),
                        },
                    );
                }
                if let Some(entry) = plan.groups.get_mut(&group) {
                    entry.keys.insert(reference.key().to_string());
                }

                Step::Secret {
                    group,
                    key: reference.key().to_string(),
                }
            }
        };
        plan.steps.push(step);
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::ValueSource;
    use crate::core::provider::OnePasswordSource;
    use crate::error::Error;

    fn providers() -> SecretProviders {
        let mut providers = SecretProviders::default();
        providers.onepassword.insert(
            "prod".to_string(),
            OnePasswordSource {
                vault: "Production".to_string(),
                item: "API Keys".to_string(),
                account: None,
            },
        );
        providers
    }

    fn plan_for(sources: &mut [ValueSource], providers: Option<&SecretProviders>) -> Result<Plan> {
        let slots: Vec<SourceSlot<'_>> = sources
            .iter_mut()
            .enumerate()
            .map(|(i, source)| SourceSlot {
                path: format!("prod.env.V{}", i),
                source,
            })
            .collect();
        build(&slots, providers)
    }

    #[test]
    fn test_groups_by_provider_and_bundle() {
        let mut sources = vec![
            ValueSource::secret("onepassword:prod.a"),
            ValueSource::literal("x"),
            ValueSource::secret("onepassword:prod.b"),
            ValueSource::env("HOME"),
            ValueSource::secret("onepassword:prod.a"),
        ];
        let plan = plan_for(&mut sources, Some(&providers())).unwrap();

        assert_eq!(plan.groups.len(), 1);
        let group = plan.groups.values().next().unwrap();
        assert_eq!(group.keys.iter().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(plan.steps[1], Step::Literal);
        assert_eq!(plan.steps[3], Step::Env("HOME".to_string()));
        assert_eq!(plan.deferred(), 4);
    }

    #[test]
    fn test_no_providers_block() {
        let mut sources = vec![ValueSource::secret("onepassword:prod.a")];
        let err = plan_for(&mut sources, None).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::NoSecretProviders { .. })
        ));
    }

    #[test]
    fn test_env_and_literal_need_no_providers() {
        let mut sources = vec![ValueSource::env("HOME"), ValueSource::literal("x")];
        assert!(plan_for(&mut sources, None).unwrap().groups.is_empty());
    }

    #[test]
    fn test_unknown_source_and_provider() {
        let mut sources = vec![ValueSource::secret("onepassword:staging.a")];
        let err = plan_for(&mut sources, Some(&providers())).unwrap_err();
        assert!(err.to_string().contains("staging"), "{}", err);

        let mut sources = vec![ValueSource::secret("vault:prod.a")];
        assert!(matches!(
            plan_for(&mut sources, Some(&providers())).unwrap_err(),
            Error::Fetch(FetchError::UnsupportedProvider { .. })
        ));
    }

    #[test]
    fn test_malformed_reference_is_error() {
        let mut sources = vec![ValueSource::secret("onepassword-prod-a")];
        let err = plan_for(&mut sources, Some(&providers())).unwrap_err();
        assert!(err.to_string().contains("onepassword-prod-a"));
    }
}
