//! Value source resolution.
//!
//! Materializes every deferred value source of one or more resolved targets
//! in a single pass:
//!
//! 1. **Gather** mutable handles to every value source ([`SourceSlot`]).
//! 2. **Plan**: classify each source and group secret references by
//!    `(provider, bundle)`.
//! 3. **Fetch** each group exactly once, concurrently.
//! 4. **Extract** every final value, then write them all back.
//!
//! Nothing is written until every fetch and every extraction has succeeded,
//! so a failed pass leaves the targets exactly as they were.
//!
//! ```ignore
//! let fetcher = ProviderFetcher::new();
//! let resolver = Resolver::new(&fetcher, config.secret_providers.as_ref())
//!     .with_timeout(Duration::from_secs(30));
//! resolver.resolve_all(&mut targets).await?;
//! ```

use std::collections::BTreeMap;
use std::env::VarError;
use std::time::Duration;

use futures::future::try_join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::core::domain::TargetConfig;
use crate::core::provider::{Fetcher, SecretProviders};
use crate::core::types::Bundle;
use crate::error::{FetchError, ResolveError, Result};

mod gather;
mod plan;

pub use gather::SourceSlot;
pub use plan::{FetchGroup, GroupKey};

use plan::{Plan, Step};

/// Drives one resolution pass.
pub struct Resolver<'a, F: Fetcher + ?Sized> {
    fetcher: &'a F,
    providers: Option<&'a SecretProviders>,
    cancel: CancellationToken,
    timeout: Option<Duration>,
}

impl<'a, F: Fetcher + ?Sized> Resolver<'a, F> {
    /// `providers` is the document's `secret_providers` block, if any.
    pub fn new(fetcher: &'a F, providers: Option<&'a SecretProviders>) -> Self {
        Self {
            fetcher,
            providers,
            cancel: CancellationToken::new(),
            timeout: None,
        }
    }

    /// Abort in-flight fetches when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Fail any single fetch that takes longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Resolve one target in place.
    pub async fn resolve(&self, config: &mut TargetConfig) -> Result<()> {
        self.resolve_all(std::slice::from_mut(config)).await
    }

    /// Resolve several targets in one pass, sharing fetches across them.
    ///
    /// # Errors
    ///
    /// Any validation, configuration, fetch or extraction error aborts the
    /// pass with no value written back.
    pub async fn resolve_all(&self, configs: &mut [TargetConfig]) -> Result<()> {
        let targets = configs.len();
        let mut slots: Vec<SourceSlot<'_>> = configs
            .iter_mut()
            .flat_map(|config| config.value_sources_mut())
            .collect();

        let plan = plan::build(&slots, self.providers)?;
        if plan.deferred() == 0 {
            debug!(sources = slots.len(), "nothing to resolve");
            return Ok(());
        }

        info!(
            sources = plan.deferred(),
            groups = plan.groups.len(),
            "resolving value sources"
        );

        let bundles = self.fetch_all(&plan).await?;
        let values = extract(&plan, &slots, &bundles)?;

        for (slot, value) in slots.iter_mut().zip(values) {
            if let Some(value) = value {
                slot.source.set_resolved(value);
            }
        }

        debug!(targets, "value sources resolved");
        Ok(())
    }

    async fn fetch_all(&self, plan: &Plan) -> Result<BTreeMap<GroupKey, Bundle>> {
        let fetches = plan.groups.iter().map(|(key, group)| async move {
            let bundle = self.fetch_one(key, group).await?;
            debug!(
                provider = %key.provider,
                bundle = %key.bundle,
                keys = bundle.len(),
                wanted = group.keys.len(),
                "bundle fetched"
            );
            Ok::<_, FetchError>((key.clone(), bundle))
        });

        let fetched = try_join_all(fetches).await?;
        Ok(fetched.into_iter().collect())
    }

    async fn fetch_one(
        &self,
        key: &GroupKey,
        group: &FetchGroup,
    ) -> std::result::Result<Bundle, FetchError> {
        let provider = key.provider.id();
        let fetch = async {
            let request = self.fetcher.fetch(&key.bundle, &group.source);
            match self.timeout {
                Some(after) => match tokio::time::timeout(after, request).await {
                    Ok(result) => result,
                    Err(_) => Err(FetchError::TimedOut {
                        provider,
                        bundle: key.bundle.clone(),
                        after,
                    }),
                },
                None => request.await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(FetchError::Cancelled {
                provider,
                bundle: key.bundle.clone(),
            }),
            result = fetch => result,
        }
    }
}

/// Compute the final value for every slot. `None` means leave it untouched.
fn extract(
    plan: &Plan,
    slots: &[SourceSlot<'_>],
    bundles: &BTreeMap<GroupKey, Bundle>,
) -> std::result::Result<Vec<Option<String>>, ResolveError> {
    plan.steps
        .iter()
        .zip(slots)
        .map(|(step, slot)| match step {
            Step::Literal => Ok(None),
            // Unset variables resolve to an empty string, like a shell would.
            Step::Env(name) => match std::env::var(name) {
                Ok(value) => Ok(Some(value)),
                Err(VarError::NotPresent) => Ok(Some(String::new())),
                Err(VarError::NotUnicode(_)) => Err(ResolveError::EnvNotUnicode {
                    path: slot.path.clone(),
                    name: name.clone(),
                }),
            },
            Step::Secret { group, key } => {
                let bundle = bundles.get(group);
                match bundle.and_then(|b| b.get(key)) {
                    Some(value) => Ok(Some(value.as_str().to_owned())),
                    None => Err(ResolveError::MissingKey {
                        path: slot.path.clone(),
                        provider: group.provider.id(),
                        bundle: group.bundle.clone(),
                        key: key.clone(),
                        available: bundle
                            .map(|b| b.keys().cloned().collect())
                            .unwrap_or_default(),
                    }),
                }
            }
        })
        .collect()
}
