//! Test fixtures and constants.

/// Standard secrets used across tests.
pub const STANDARD_SECRETS: &[(&str, &str)] = &[
    ("DATABASE_URL", "postgres://localhost/mydb"),
    ("API_KEY", "sk-test-12345"),
    ("JWT_SECRET", "super-secret-jwt-token"),
];

/// Single-target document with a local-store secret and an env reference.
pub const SINGLE_TARGET: &str = r#"
name = "api"
server = "deploy.example.com"

[image]
repository = "ghcr.io/acme/api"
tag = "1.4.2"

[[env]]
name = "MODE"
value = "production"

[[env]]
name = "DATABASE_URL"
from = { secret = "local:default.DATABASE_URL" }

[[env]]
name = "UNSET_FOR_TEST"
from = { env = "MOORING_TEST_SURELY_UNSET_VAR" }

[secret_providers.local.default]
"#;

/// Two targets sharing a base image.
pub const MULTI_TARGET: &str = r#"
name = "api"
server = "deploy.example.com"

[image]
repository = "ghcr.io/acme/api"
tag = "1.4.2"

[targets.prod]
replicas = 3

[targets.staging]
server = "staging.example.com"
image = { tag = "1.5.0-rc1" }
"#;
