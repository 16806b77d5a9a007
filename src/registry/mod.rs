//! Registry access for fetching package version information
//!
//! This module provides:
//! - HTTP client shared foundation (timeout, User-Agent, status mapping)
//! - npm registry client reducing metadata to version candidates

mod client;
mod npm;

pub use client::HttpClient;
pub use npm::{NpmRegistry, PackageVersions, DEFAULT_REGISTRY_URL};
