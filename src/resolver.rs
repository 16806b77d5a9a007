//! Dependency resolution against the registry
//!
//! The resolver walks one grouping of a manifest, decides per entry whether
//! to skip, fail, or look it up, and classifies looked-up entries as current
//! or outdated. Range parsing is always loose: `v` and `=` prefixes are
//! tolerated and requirements that cannot be parsed count as satisfied.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Url;
use semver::{Version, VersionReq};
use serde_json::Value;

use crate::error::{RegistryError, ResolveError};
use crate::manifest::{DepGroup, Manifest};
use crate::registry::{HttpClient, NpmRegistry};
use crate::report::DependencyStatus;

/// Which per-entry conditions fail a lookup instead of skipping the entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorFlags {
    /// Fail when a package is missing from the registry
    pub not_found: bool,
    /// Fail when a requirement is not a string value
    pub dep_type: bool,
    /// Fail when a requirement points at a source-control or file location
    pub scm: bool,
}

/// Options of one grouping lookup
#[derive(Debug, Clone)]
pub struct LookupOptions {
    /// Grouping to resolve
    pub group: DepGroup,
    /// Registry base URL
    pub registry: Url,
    /// Package names to skip entirely
    pub ignore: Vec<String>,
    /// Classify against the stable candidate instead of the latest
    pub stable: bool,
    /// Tolerate loose range syntax
    pub loose: bool,
    /// Return only outdated entries
    pub only_outdated: bool,
    /// Conditions that fail the lookup
    pub flags: ErrorFlags,
}

/// Resolves the dependencies of one manifest grouping
#[async_trait]
pub trait DependencyResolver: Send + Sync {
    /// Resolve one grouping, keyed by package name
    async fn resolve(
        &self,
        manifest: &Manifest,
        options: &LookupOptions,
    ) -> Result<BTreeMap<String, DependencyStatus>, ResolveError>;
}

/// Production resolver backed by an npm-compatible registry
pub struct RegistryResolver {
    client: HttpClient,
}

impl RegistryResolver {
    /// Creates a resolver using the given HTTP client
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DependencyResolver for RegistryResolver {
    async fn resolve(
        &self,
        manifest: &Manifest,
        options: &LookupOptions,
    ) -> Result<BTreeMap<String, DependencyStatus>, ResolveError> {
        let mut statuses = BTreeMap::new();
        let Some(entries) = manifest.group(options.group) else {
            return Ok(statuses);
        };

        let registry = NpmRegistry::new(self.client.clone(), options.registry.clone());

        for (name, value) in entries {
            if options.ignore.iter().any(|ignored| ignored == name) {
                continue;
            }

            let requirement = match value {
                Value::String(requirement) => requirement,
                _ => {
                    if options.flags.dep_type {
                        return Err(ResolveError::wrong_dependency_type(name));
                    }
                    continue;
                }
            };

            if is_scm_requirement(requirement) {
                if options.flags.scm {
                    return Err(ResolveError::scm_dependency(name, requirement));
                }
                continue;
            }

            let versions = match registry.fetch(name).await {
                Ok(versions) => versions,
                Err(RegistryError::PackageNotFound { .. }) if !options.flags.not_found => {
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            let candidate = if options.stable {
                versions.stable.as_ref()
            } else {
                versions.latest.as_ref()
            };
            let outdated = match candidate {
                Some(candidate) => !requirement_matches(requirement, candidate, options.loose),
                None => false,
            };

            if options.only_outdated && !outdated {
                continue;
            }

            let mut status = DependencyStatus::new(requirement);
            status.stable = versions.stable.map(|v| v.to_string());
            status.latest = versions.latest.map(|v| v.to_string());
            status.released_at = versions.released_at;
            statuses.insert(name.clone(), status);
        }

        Ok(statuses)
    }
}

/// Requirements a registry can never resolve: source-control locations,
/// direct URLs, local paths, and the github owner/repo shorthand
pub fn is_scm_requirement(requirement: &str) -> bool {
    static SCHEME: OnceLock<Regex> = OnceLock::new();
    static SHORTHAND: OnceLock<Regex> = OnceLock::new();

    let scheme = SCHEME.get_or_init(|| {
        Regex::new(r"^(git(\+(ssh|https?|file))?|svn|https?)://|^(github|gitlab|bitbucket):|^file:")
            .expect("valid scheme pattern")
    });
    let shorthand = SHORTHAND.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+(#.+)?$").expect("valid shorthand pattern")
    });

    let requirement = requirement.trim();
    scheme.is_match(requirement) || shorthand.is_match(requirement)
}

/// Does the declared requirement accept the candidate version?
///
/// Loose mode strips `v` prefixes, treats wildcard, empty, and tag
/// requirements as satisfied, and treats unparseable ranges as satisfied
/// so they are reported as current instead of failing the lookup.
pub fn requirement_matches(requirement: &str, candidate: &Version, loose: bool) -> bool {
    static V_PREFIX: OnceLock<Regex> = OnceLock::new();
    static BARE_VERSION: OnceLock<Regex> = OnceLock::new();

    let trimmed = requirement.trim();
    if trimmed.is_empty() || trimmed == "*" || trimmed == "x" || trimmed == "latest" {
        return true;
    }

    let cleaned = if loose {
        let v_prefix = V_PREFIX.get_or_init(|| {
            Regex::new(r"(^|[\s,|^~=<>])v(\d)").expect("valid prefix pattern")
        });
        v_prefix.replace_all(trimmed, "$1$2").into_owned()
    } else {
        trimmed.to_string()
    };

    // A bare version means that exact version, not a caret range
    let bare_version = BARE_VERSION.get_or_init(|| {
        Regex::new(r"^\d+\.\d+\.\d+(-[0-9A-Za-z.-]+)?(\+[0-9A-Za-z.-]+)?$")
            .expect("valid version pattern")
    });
    let cleaned = if bare_version.is_match(&cleaned) {
        format!("={}", cleaned)
    } else {
        cleaned
    };

    match VersionReq::parse(&cleaned) {
        Ok(req) => req.matches(candidate),
        Err(_) => true,
    }
}
