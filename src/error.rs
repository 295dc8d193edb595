//! Error types.
//!
//! One enum per concern, wrapped by [`Error`]. Every variant carries enough
//! context (target, field, provider, bundle, key) to diagnose a failure
//! without re-running. No variant ever carries secret plaintext.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Deployment document and provider-settings errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("unsupported config format '{0}' (expected .toml or .json)")]
    UnsupportedFormat(String),

    #[error("secret reference '{reference}' used but no secret_providers block is configured")]
    NoSecretProviders { reference: String },

    #[error("secret reference '{reference}': no {provider} source named '{bundle}' in secret_providers")]
    UnknownSource {
        provider: String,
        bundle: String,
        reference: String,
    },
}

/// Configuration shape and content errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{path}: value source must set exactly one of 'value' or 'from' ({reason})")]
    ValueSource { path: String, reason: &'static str },

    #[error("invalid secret reference '{reference}': {reason}")]
    InvalidSecretRef { reference: String, reason: String },

    #[error("target '{target}': no image configured (set 'image' or 'image_key')")]
    MissingImage { target: String },

    #[error("target '{target}': image.repository is required")]
    MissingRepository { target: String },

    #[error("target '{target}': unknown image_key '{key}' (available: {})", join(.available))]
    UnknownImage {
        target: String,
        key: String,
        available: Vec<String>,
    },

    #[error("target '{target}': 'image' and 'image_key' are mutually exclusive")]
    ConflictingImage { target: String },

    #[error("target '{target}': missing required field '{field}'")]
    MissingField { target: String, field: &'static str },

    #[error("target '{target}': replicas must be between 1 and {max}, got {replicas}")]
    InvalidReplicas {
        target: String,
        replicas: u32,
        max: u32,
    },

    #[error("target '{target}': port must be non-zero")]
    InvalidPort { target: String },

    #[error("target '{target}': invalid domain '{domain}': {reason}")]
    InvalidDomain {
        target: String,
        domain: String,
        reason: String,
    },

    #[error("target '{target}': invalid volume '{volume}': {reason}")]
    InvalidVolume {
        target: String,
        volume: String,
        reason: &'static str,
    },

    #[error("config defines multiple targets, select with --targets or --all (available: {})", join(.available))]
    TargetRequired { available: Vec<String> },

    #[error("targets {} requested but the config defines no targets", join(.requested))]
    TargetsNotApplicable { requested: Vec<String> },

    #[error("unknown target '{target}' (available: {})", join(.available))]
    UnknownTarget {
        target: String,
        available: Vec<String>,
    },

    #[error("invalid secret name '{name}': {reason}")]
    InvalidSecretName { name: String, reason: String },

    #[error("secret '{0}' cannot have an empty value")]
    EmptySecretValue(String),
}

/// External provider interaction errors.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("unsupported secret provider '{provider}' in '{reference}'")]
    UnsupportedProvider { provider: String, reference: String },

    #[error("{provider} source '{bundle}': '{tool}' not found in PATH")]
    ToolNotFound {
        provider: &'static str,
        bundle: String,
        tool: String,
    },

    #[error("{provider} source '{bundle}': '{tool}' failed ({status}): {stderr}")]
    ToolFailed {
        provider: &'static str,
        bundle: String,
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("{provider} source '{bundle}': unparsable output: {reason}")]
    UnparsableOutput {
        provider: &'static str,
        bundle: String,
        reason: String,
    },

    #[error("{provider} source '{bundle}': {source}")]
    Local {
        provider: &'static str,
        bundle: String,
        #[source]
        source: Box<Error>,
    },

    #[error("{provider} source '{bundle}': fetch cancelled")]
    Cancelled {
        provider: &'static str,
        bundle: String,
    },

    #[error("{provider} source '{bundle}': fetch timed out after {after:?}")]
    TimedOut {
        provider: &'static str,
        bundle: String,
        after: Duration,
    },
}

/// Extraction errors: the bundle was fetched but cannot satisfy a reference.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("{path}: key '{key}' not found in {provider} source '{bundle}' (available: {})", join(.available))]
    MissingKey {
        path: String,
        provider: &'static str,
        bundle: String,
        key: String,
        available: Vec<String>,
    },

    #[error("{path}: environment variable '{name}' is set but not valid UTF-8")]
    EnvNotUnicode { path: String, name: String },
}

/// Secret store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("secret store not initialized at {}", .0.display())]
    NotInitialized(PathBuf),

    #[error("secret store already initialized at {}", .0.display())]
    AlreadyInitialized(PathBuf),

    #[error("no private identity found at {} (or in MOORING_IDENTITY)", .0.display())]
    NoIdentity(PathBuf),

    #[error("invalid identity: {0}")]
    InvalidIdentity(String),

    #[error("invalid secret store file {}: {reason}", .path.display())]
    InvalidFormat { path: PathBuf, reason: String },

    #[error("failed to read secret store: {0}")]
    ReadFailed(#[source] std::io::Error),

    #[error("failed to write secret store: {0}")]
    WriteFailed(#[source] std::io::Error),

    #[error("{}", not_found_message(.name, .suggestion.as_deref()))]
    SecretNotFound {
        name: String,
        suggestion: Option<String>,
    },

    #[error("key roll aborted at secret '{name}', no changes written: {reason}")]
    RollAborted { name: String, reason: String },

    #[error("key roll failed while writing, previous identity restored: {reason}")]
    RollReverted { reason: String },

    #[error(
        "key roll failed while writing ({reason}) and could not be undone ({restore}); \
         previous identity is archived at {}",
        .archive.display()
    )]
    RollIncomplete {
        reason: String,
        restore: String,
        archive: PathBuf,
    },

    #[error("unable to determine home directory")]
    NoHomeDir,
}

impl StoreError {
    /// Build a not-found error, suggesting the closest existing name.
    pub fn not_found(name: impl Into<String>, available: &[String]) -> Self {
        let name = name.into();
        let suggestion = closest(&name, available);
        Self::SecretNotFound { name, suggestion }
    }
}

/// Encryption backend errors.
#[derive(Error, Debug)]
pub enum CipherError {
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("armor failed: {0}")]
    ArmorFailed(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),
}

fn join(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

fn not_found_message(name: &str, suggestion: Option<&str>) -> String {
    match suggestion {
        Some(s) => format!("secret not found: {} (did you mean '{}'?)", name, s),
        None => format!("secret not found: {}", name),
    }
}

/// Closest candidate by edit distance, if any is reasonably close.
fn closest(name: &str, candidates: &[String]) -> Option<String> {
    let threshold = (name.len() / 3).max(2);
    candidates
        .iter()
        .map(|c| (levenshtein(&name.to_lowercase(), &c.to_lowercase()), c))
        .filter(|(d, _)| *d <= threshold)
        .min_by_key(|(d, _)| *d)
        .map(|(_, c)| c.clone())
}

fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        cur[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            cur[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(cur[j] + 1);
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    prev[b.len()]
}
