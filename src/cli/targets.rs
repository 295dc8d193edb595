//! Targets command - list the targets a document defines.

use crate::cli::{output, Context};
use crate::core::domain::{TargetConfig, TargetSettings};
use crate::core::merge::resolve_target;
use crate::error::{Result, ValidationError};

/// List targets with their merged image, or the merge error.
pub fn execute(ctx: &Context) -> Result<()> {
    let config = ctx.load_config()?;

    if !config.is_multi_target() {
        let name = config.single_target_name();
        output::dimmed("no named targets; the base configuration is the only target");
        show(
            &name,
            resolve_target(
                &config.base,
                &TargetSettings::default(),
                &config.images,
                &name,
            ),
        );
        return Ok(());
    }

    output::section(&format!("{} targets", config.targets.len()));
    for (name, over) in &config.targets {
        show(name, resolve_target(&config.base, over, &config.images, name));
    }
    Ok(())
}

fn show(name: &str, resolved: std::result::Result<TargetConfig, ValidationError>) {
    match resolved {
        Ok(target) => output::list_item(&format!(
            "{}  {} @ {}",
            output::key(name),
            target.image.reference(),
            target.server
        )),
        Err(e) => output::list_item(&format!(
            "{}  {}",
            output::key(name),
            console::style(e).red()
        )),
    }
}
