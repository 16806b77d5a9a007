//! Dependency report attached to checked artifacts

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::manifest::DepGroup;

/// Registry status of one declared dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyStatus {
    /// Version range declared in the manifest
    pub required: String,
    /// Highest stable version the registry knows about
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stable: Option<String>,
    /// Highest version overall, prereleases included
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest: Option<String>,
    /// Publish time of the latest version, when the registry provides one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub released_at: Option<DateTime<Utc>>,
}

impl DependencyStatus {
    /// Creates a status with only the declared requirement
    pub fn new(required: impl Into<String>) -> Self {
        Self {
            required: required.into(),
            stable: None,
            latest: None,
            released_at: None,
        }
    }

    /// Sets the stable candidate
    pub fn with_stable(mut self, stable: impl Into<String>) -> Self {
        self.stable = Some(stable.into());
        self
    }

    /// Sets the latest candidate
    pub fn with_latest(mut self, latest: impl Into<String>) -> Self {
        self.latest = Some(latest.into());
        self
    }

    /// Sets the publish time of the latest version
    pub fn with_released_at(mut self, released_at: DateTime<Utc>) -> Self {
        self.released_at = Some(released_at);
        self
    }

    /// Replacement candidate: latest when unstable versions are acceptable,
    /// stable otherwise
    pub fn candidate(&self, unstable: bool) -> Option<&str> {
        if unstable {
            self.latest.as_deref()
        } else {
            self.stable.as_deref()
        }
    }
}

/// Per-grouping dependency statuses, keyed by package name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyReport {
    /// Runtime dependencies
    pub dependencies: BTreeMap<String, DependencyStatus>,
    /// Development dependencies
    #[serde(rename = "devDependencies")]
    pub dev_dependencies: BTreeMap<String, DependencyStatus>,
    /// Optional dependencies
    #[serde(rename = "optionalDependencies")]
    pub optional_dependencies: BTreeMap<String, DependencyStatus>,
}

impl DependencyReport {
    /// Creates an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Statuses of one grouping
    pub fn group(&self, group: DepGroup) -> &BTreeMap<String, DependencyStatus> {
        match group {
            DepGroup::Runtime => &self.dependencies,
            DepGroup::Dev => &self.dev_dependencies,
            DepGroup::Optional => &self.optional_dependencies,
        }
    }

    /// Mutable statuses of one grouping
    pub fn group_mut(&mut self, group: DepGroup) -> &mut BTreeMap<String, DependencyStatus> {
        match group {
            DepGroup::Runtime => &mut self.dependencies,
            DepGroup::Dev => &mut self.dev_dependencies,
            DepGroup::Optional => &mut self.optional_dependencies,
        }
    }

    /// Number of reported entries across all groupings
    pub fn total(&self) -> usize {
        DepGroup::ALL.iter().map(|g| self.group(*g).len()).sum()
    }

    /// Returns true when no grouping has entries
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Iterates all entries as (group, package, status)
    pub fn iter(&self) -> impl Iterator<Item = (DepGroup, &String, &DependencyStatus)> {
        DepGroup::ALL.iter().flat_map(move |group| {
            self.group(*group)
                .iter()
                .map(move |(name, status)| (*group, name, status))
        })
    }
}
