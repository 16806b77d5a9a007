//! npm registry adapter
//!
//! Fetches package metadata from an npm-compatible registry.
//! API endpoint: {registry}/{package}

use crate::error::RegistryError;
use crate::registry::HttpClient;
use chrono::{DateTime, Utc};
use reqwest::Url;
use semver::Version;
use serde::Deserialize;
use std::collections::HashMap;

/// Default npm registry base URL
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org/";

/// Version candidates of one package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageVersions {
    /// Highest stable version, when one exists
    pub stable: Option<Version>,
    /// Highest version overall, prereleases included
    pub latest: Option<Version>,
    /// Publish time of the latest version
    pub released_at: Option<DateTime<Utc>>,
}

/// npm registry client
pub struct NpmRegistry {
    client: HttpClient,
    base_url: Url,
}

/// npm package metadata response
#[derive(Debug, Deserialize)]
struct PackageMetadata {
    /// Tagged versions, `latest` being the registry's published default
    #[serde(rename = "dist-tags", default)]
    dist_tags: HashMap<String, String>,
    /// Published versions
    #[serde(default)]
    versions: HashMap<String, serde_json::Value>,
    /// Publish times keyed by version
    #[serde(default)]
    time: HashMap<String, String>,
}

impl NpmRegistry {
    /// Create a registry client for the given base URL
    pub fn new(client: HttpClient, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// Build the metadata URL for a package
    fn package_url(&self, package: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            package
        )
    }

    /// Fetch and reduce the metadata of one package
    pub async fn fetch(&self, package: &str) -> Result<PackageVersions, RegistryError> {
        let url = self.package_url(package);
        let metadata: PackageMetadata = self.client.get_json(&url, package).await?;
        Ok(reduce(&metadata))
    }
}

/// Reduce raw metadata to the two candidate versions and the latest
/// publish time
fn reduce(metadata: &PackageMetadata) -> PackageVersions {
    let mut published: Vec<Version> = metadata
        .versions
        .keys()
        .filter_map(|v| Version::parse(v).ok())
        .collect();
    published.sort();

    let latest = published.last().cloned();

    // The `latest` dist-tag wins when it names a stable version; otherwise
    // fall back to the highest non-prerelease version
    let tagged = metadata
        .dist_tags
        .get("latest")
        .and_then(|v| Version::parse(v).ok())
        .filter(|v| v.pre.is_empty());
    let stable = tagged.or_else(|| {
        published
            .iter()
            .rev()
            .find(|v| v.pre.is_empty())
            .cloned()
    });

    let released_at = latest.as_ref().and_then(|v| {
        metadata
            .time
            .get(&v.to_string())
            .and_then(|t| t.parse::<DateTime<Utc>>().ok())
    });

    PackageVersions {
        stable,
        latest,
        released_at,
    }
}
