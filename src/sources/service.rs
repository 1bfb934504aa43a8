//! Package service trait - the collaborator that materializes dependencies.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::Requirement;
use crate::resolver::ResolveMode;

/// Failure reported by a package service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("`{name}/{version}` not found in {service}")]
    NotFound {
        name: String,
        version: String,
        service: String,
    },

    #[error("{service} is unavailable: {message}")]
    Unavailable { service: String, message: String },
}

/// A service that materializes exact `(name, version)` pins.
///
/// Lookups must be safe to run concurrently for different requirements; the
/// resolver fans out over independent requirements in parallel.
pub trait PackageService: Send + Sync {
    /// Service name for display.
    fn name(&self) -> &str;

    /// Materialize a requirement and return its install prefix.
    fn materialize(&self, req: &Requirement, mode: ResolveMode) -> Result<PathBuf, ServiceError>;
}
