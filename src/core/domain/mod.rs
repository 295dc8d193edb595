//! Domain types.

mod image;
mod record;
mod secret_ref;
mod settings;
mod value_source;

pub use image::{BuildConfig, HistoryPolicy, HistoryStrategy, Image, ImageSpec, RegistryAuth};
pub use record::SecretRecord;
pub use secret_ref::SecretRef;
pub use settings::{Domain, NetworkMode, TargetConfig, TargetSettings};
pub use value_source::{EnvVar, ValueFrom, ValueKind, ValueSource};
