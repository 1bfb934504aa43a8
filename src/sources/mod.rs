//! Package sources.
//!
//! The resolver never fetches or builds a dependency itself. It asks a
//! [`PackageService`] for an install prefix; [`LocalStore`] is the
//! directory-backed service the CLI uses.

pub mod service;
pub mod store;

pub use service::{PackageService, ServiceError};
pub use store::LocalStore;
