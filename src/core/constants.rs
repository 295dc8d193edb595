//! Constants used throughout mooring.
//!
//! Centralizes file names, environment variables, and built-in defaults.

/// Default deployment document name.
pub const CONFIG_FILE: &str = "mooring.toml";

/// Secret store directory relative to HOME (~/.mooring/secrets).
pub const STORE_DIR: &str = ".mooring/secrets";

/// Encrypted record set inside the store directory.
pub const RECORDS_FILE: &str = "secrets.json";

/// Private identity inside the store directory.
pub const IDENTITY_FILE: &str = "identity.key";

/// Public recipient inside the store directory. Safe to distribute.
pub const RECIPIENT_FILE: &str = "recipient.pub";

/// Archived identities after a key roll.
pub const ARCHIVE_DIR: &str = "archive";

/// Out-of-band private identity (AGE-SECRET-KEY-...).
pub const IDENTITY_ENV: &str = "MOORING_IDENTITY";

/// Log filter environment variable.
pub const LOG_ENV: &str = "MOORING_LOG";

/// Record set format version.
pub const RECORDS_VERSION: u32 = 1;

/// File modes (Unix).
pub const STORE_DIR_MODE: u32 = 0o700;
pub const RECORDS_MODE: u32 = 0o600;
pub const IDENTITY_MODE: u32 = 0o400;
pub const RECIPIENT_MODE: u32 = 0o644;

/// Defaults applied by target normalization.
pub const DEFAULT_TAG: &str = "latest";
pub const DEFAULT_HEALTH_CHECK_PATH: &str = "/";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_REPLICAS: u32 = 1;
pub const MAX_REPLICAS: u32 = 64;

/// Target name used when the config defines no named targets and no name.
pub const DEFAULT_TARGET: &str = "default";

/// 1Password CLI executable.
pub const ONEPASSWORD_BIN: &str = "op";

/// Per-bundle fetch deadline used by the CLI, in seconds.
pub const FETCH_TIMEOUT_SECS: u64 = 60;
