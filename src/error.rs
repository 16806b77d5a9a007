//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ManifestError: Issues with manifest payload parsing and IO
//! - RegistryError: Issues with package registry communication
//! - ResolveError: Issues raised while resolving a dependency grouping
//! - CheckError: Failures of a single checker transform

use std::path::PathBuf;
use thiserror::Error;

/// Errors related to manifest payloads and files
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The artifact carries no payload
    #[error("empty manifest: {path}")]
    Empty { path: PathBuf },

    /// The artifact carries a streaming payload, which the checker cannot parse
    #[error("streaming payloads are not supported: {path}")]
    UnsupportedStream { path: PathBuf },

    /// The payload is not a JSON object
    #[error("invalid manifest format in {path}: {message}")]
    InvalidFormat { path: PathBuf, message: String },

    /// Failed to read a manifest file
    #[error("failed to read manifest file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a manifest file
    #[error("failed to write manifest file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to package registry communication
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Package not found in the registry
    #[error("package '{package}' not found in registry")]
    PackageNotFound { package: String },

    /// Network request failed
    #[error("failed to fetch package '{package}': {message}")]
    Network { package: String, message: String },

    /// Rate limit exceeded
    #[error("rate limit exceeded while fetching '{package}'")]
    RateLimit { package: String },

    /// Request timed out
    #[error("timeout while fetching '{package}'")]
    Timeout { package: String },

    /// Response body could not be decoded
    #[error("invalid response for '{package}': {message}")]
    InvalidResponse { package: String, message: String },

    /// HTTP client could not be constructed
    #[error("failed to build HTTP client: {message}")]
    Client { message: String },
}

/// Errors raised while resolving the dependencies of one grouping
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Registry lookup failed
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A dependency requirement is not a string value
    #[error("dependency '{package}' has a non-string requirement")]
    WrongDependencyType { package: String },

    /// A dependency requirement points at a source-control or file location
    #[error("dependency '{package}' uses a source-control requirement '{requirement}'")]
    ScmDependency { package: String, requirement: String },
}

/// Failures of a single checker transform
#[derive(Error, Debug)]
pub enum CheckError {
    /// Manifest parsing failed
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Dependency resolution failed
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The number of reported dependencies reached the configured threshold
    #[error("outdated dependencies: {count}")]
    OutdatedThreshold { count: usize },
}

impl ManifestError {
    /// Creates a new Empty error
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        ManifestError::Empty { path: path.into() }
    }

    /// Creates a new UnsupportedStream error
    pub fn unsupported_stream(path: impl Into<PathBuf>) -> Self {
        ManifestError::UnsupportedStream { path: path.into() }
    }

    /// Creates a new InvalidFormat error
    pub fn invalid_format(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::InvalidFormat {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new Read error
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a new Write error
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::Write {
            path: path.into(),
            source,
        }
    }
}

impl RegistryError {
    /// Creates a new PackageNotFound error
    pub fn package_not_found(package: impl Into<String>) -> Self {
        RegistryError::PackageNotFound {
            package: package.into(),
        }
    }

    /// Creates a new Network error
    pub fn network(package: impl Into<String>, message: impl Into<String>) -> Self {
        RegistryError::Network {
            package: package.into(),
            message: message.into(),
        }
    }

    /// Creates a new RateLimit error
    pub fn rate_limit(package: impl Into<String>) -> Self {
        RegistryError::RateLimit {
            package: package.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(package: impl Into<String>) -> Self {
        RegistryError::Timeout {
            package: package.into(),
        }
    }

    /// Creates a new InvalidResponse error
    pub fn invalid_response(package: impl Into<String>, message: impl Into<String>) -> Self {
        RegistryError::InvalidResponse {
            package: package.into(),
            message: message.into(),
        }
    }
}

impl ResolveError {
    /// Creates a new WrongDependencyType error
    pub fn wrong_dependency_type(package: impl Into<String>) -> Self {
        ResolveError::WrongDependencyType {
            package: package.into(),
        }
    }

    /// Creates a new ScmDependency error
    pub fn scm_dependency(package: impl Into<String>, requirement: impl Into<String>) -> Self {
        ResolveError::ScmDependency {
            package: package.into(),
            requirement: requirement.into(),
        }
    }
}
