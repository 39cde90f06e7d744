//! Configuration validation.

use super::Config;
use crate::error::{MetaError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    // Server validation
    if config.server.host.is_empty() {
        return Err(MetaError::Config("server.host is required".into()));
    }
    if config.server.port == 0 {
        return Err(MetaError::Config("server.port must be non-zero".into()));
    }
    if config.server.user.is_empty() {
        return Err(MetaError::Config("server.user is required".into()));
    }

    // Build validation
    let file = &config.build.database_file;
    if file.is_empty() {
        return Err(MetaError::Config("build.database_file is required".into()));
    }
    if file.contains('/') || file.contains('\\') {
        return Err(MetaError::Config(format!(
            "build.database_file must be a file name, not a path: '{}'",
            file
        )));
    }

    // Apply validation
    if config.apply.idempotent_patterns.is_empty() {
        return Err(MetaError::Config(
            "apply.idempotent_patterns must not be empty".into(),
        ));
    }
    if config
        .apply
        .idempotent_patterns
        .iter()
        .any(|p| p.trim().is_empty())
    {
        return Err(MetaError::Config(
            "apply.idempotent_patterns must not contain blank entries".into(),
        ));
    }

    Ok(())
}
