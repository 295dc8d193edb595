//! Mooring - deployment configuration merging and secret materialization.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── resolve       # Merge + resolve targets
//! │   ├── targets       # List configured targets
//! │   ├── secrets       # Local secret store commands
//! │   └── output        # Terminal styling
//! └── core/             # Core library components
//!     ├── config        # mooring.toml loading, target selection
//!     ├── merge         # Base + override merging
//!     ├── validation    # Resolved target checks
//!     ├── domain/       # Value sources, images, settings, records
//!     ├── resolve/      # Gather, plan, fetch, extract
//!     ├── provider/     # 1Password CLI and local store bundles
//!     ├── cipher/       # Encryption backends
//!     │   ├── mod       # Cipher trait
//!     │   └── age       # age encryption implementation
//!     └── store/        # Encrypted secret store, identity, key roll
//! ```
//!
//! # Pipeline
//!
//! 1. [`core::config::AppConfig::load`] reads the deployment document.
//! 2. [`core::merge::resolve_targets`] produces one [`core::domain::TargetConfig`]
//!    per selected target.
//! 3. [`core::resolve::Resolver`] replaces every deferred value source with its
//!    concrete value, fetching each external bundle once.
//!
//! The resolved tree holds plaintext secrets and must be treated as sensitive.

pub mod cli;
pub mod core;
pub mod error;
