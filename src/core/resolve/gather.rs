//! Collects every deferred-capable value source of a resolved target.

use crate::core::domain::{EnvVar, TargetConfig, ValueSource};

/// One gathered value source and its dotted location in the tree.
#[derive(Debug)]
pub struct SourceSlot<'a> {
    pub path: String,
    pub source: &'a mut ValueSource,
}

impl TargetConfig {
    /// Mutable handles to every value source, in document order.
    ///
    /// Order: `env` entries, registry username and password, build args.
    /// Paths are prefixed with the target key, e.g. `prod.env.API_KEY`.
    pub fn value_sources_mut(&mut self) -> Vec<SourceSlot<'_>> {
        let target = self.target.clone();
        let mut slots = Vec::new();

        push_vars(&mut slots, format!("{}.env", target), &mut self.env);

        if let Some(registry) = &mut self.image.registry {
            slots.push(SourceSlot {
                path: format!("{}.image.registry.username", target),
                source: &mut registry.username,
            });
            slots.push(SourceSlot {
                path: format!("{}.image.registry.password", target),
                source: &mut registry.password,
            });
        }

        if let Some(build) = &mut self.image.build {
            push_vars(
                &mut slots,
                format!("{}.image.build.args", target),
                &mut build.args,
            );
        }

        slots
    }
}

fn push_vars<'a>(slots: &mut Vec<SourceSlot<'a>>, prefix: String, vars: &'a mut [EnvVar]) {
    for var in vars {
        slots.push(SourceSlot {
            path: format!("{}.{}", prefix, var.name),
            source: &mut var.source,
        });
    }
}
