//! The core checker transform
//!
//! A `Checker` inspects one manifest artifact: it parses the payload,
//! resolves all three dependency groupings concurrently, attaches the
//! resulting report, hands the artifact to the reporter, rewrites the
//! manifest when an update operator is configured, and finally enforces
//! the outdated threshold.

use reqwest::Url;

use crate::artifact::Artifact;
use crate::error::{CheckError, RegistryError, ResolveError};
use crate::manifest::{DepGroup, Manifest};
use crate::registry::{HttpClient, DEFAULT_REGISTRY_URL};
use crate::report::DependencyReport;
use crate::reporter::{ConsoleReporter, Reporter};
use crate::resolver::{DependencyResolver, ErrorFlags, LookupOptions, RegistryResolver};

/// Conditions under which a check fails instead of skipping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorCondition {
    /// Fail when a package is missing from the registry
    pub not_found: bool,
    /// Fail when a requirement is not a string value
    pub dep_type: bool,
    /// Fail when a requirement points at a source-control location
    pub scm: bool,
    /// Fail when at least this many dependencies are reported; zero disables
    pub outdated_count: usize,
}

/// Checks the dependencies of manifest artifacts
pub struct Checker {
    /// Failure conditions, settable after construction
    pub error: ErrorCondition,
    /// Package names excluded from every lookup
    pub ignore: Vec<String>,
    /// Registry base URL
    pub registry: Url,
    /// Prefer latest versions over stable ones
    pub unstable: bool,
    /// Update operator prepended to rewritten requirements; empty disables
    /// rewriting
    pub update: String,
    /// Report all dependencies instead of outdated ones only
    pub verbose: bool,
    reporter: Option<Box<dyn Reporter>>,
    resolver: Box<dyn DependencyResolver>,
}

impl Checker {
    /// Creates a checker against the public npm registry with a console
    /// reporter
    pub fn new() -> Result<Self, RegistryError> {
        let client = HttpClient::new()?;
        let registry = Url::parse(DEFAULT_REGISTRY_URL)
            .map_err(|e| RegistryError::Client {
                message: e.to_string(),
            })?;
        Ok(Self::with_resolver(
            Box::new(RegistryResolver::new(client)),
            registry,
        ))
    }

    /// Creates a checker with an injected resolver
    pub fn with_resolver(resolver: Box<dyn DependencyResolver>, registry: Url) -> Self {
        Self {
            error: ErrorCondition::default(),
            ignore: Vec::new(),
            registry,
            unstable: false,
            update: String::new(),
            verbose: false,
            reporter: Some(Box::new(ConsoleReporter::default())),
            resolver,
        }
    }

    /// Replaces the reporter; `None` disables reporting
    pub fn with_reporter(mut self, reporter: Option<Box<dyn Reporter>>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Sets the packages excluded from lookups
    pub fn with_ignore(mut self, ignore: Vec<String>) -> Self {
        self.ignore = ignore;
        self
    }

    /// Sets the registry base URL
    pub fn with_registry(mut self, registry: Url) -> Self {
        self.registry = registry;
        self
    }

    /// Prefers latest versions over stable ones
    pub fn with_unstable(mut self, unstable: bool) -> Self {
        self.unstable = unstable;
        self
    }

    /// Sets the update operator; an empty operator disables rewriting
    pub fn with_update(mut self, update: impl Into<String>) -> Self {
        self.update = update.into();
        self
    }

    /// Reports all dependencies instead of outdated ones only
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn lookup_options(&self, group: DepGroup, only_outdated: bool) -> LookupOptions {
        LookupOptions {
            group,
            registry: self.registry.clone(),
            ignore: self.ignore.clone(),
            stable: !self.unstable,
            loose: true,
            only_outdated,
            flags: ErrorFlags {
                not_found: self.error.not_found,
                dep_type: self.error.dep_type,
                scm: self.error.scm,
            },
        }
    }

    async fn collect(
        &self,
        manifest: &Manifest,
        only_outdated: bool,
    ) -> Result<DependencyReport, ResolveError> {
        let runtime_opts = self.lookup_options(DepGroup::Runtime, only_outdated);
        let dev_opts = self.lookup_options(DepGroup::Dev, only_outdated);
        let optional_opts = self.lookup_options(DepGroup::Optional, only_outdated);

        let (dependencies, dev_dependencies, optional_dependencies) = tokio::try_join!(
            self.resolver.resolve(manifest, &runtime_opts),
            self.resolver.resolve(manifest, &dev_opts),
            self.resolver.resolve(manifest, &optional_opts),
        )?;

        Ok(DependencyReport {
            dependencies,
            dev_dependencies,
            optional_dependencies,
        })
    }

    /// Resolves all declared dependencies of a manifest
    pub async fn get_dependencies(
        &self,
        manifest: &Manifest,
    ) -> Result<DependencyReport, ResolveError> {
        self.collect(manifest, false).await
    }

    /// Resolves the outdated dependencies of a manifest
    pub async fn get_updated_dependencies(
        &self,
        manifest: &Manifest,
    ) -> Result<DependencyReport, ResolveError> {
        self.collect(manifest, true).await
    }

    /// Checks one artifact in place
    ///
    /// Order matters: the report is attached and logged before any rewrite,
    /// and the threshold fires last, so a failing artifact has already been
    /// reported and rewritten.
    pub async fn transform(&self, artifact: &mut Artifact) -> Result<(), CheckError> {
        let mut manifest = Manifest::parse(artifact)?;

        let report = if self.verbose {
            self.get_dependencies(&manifest).await?
        } else {
            self.get_updated_dependencies(&manifest).await?
        };
        artifact.report = Some(report.clone());

        if let Some(reporter) = &self.reporter {
            reporter.log(artifact);
        }

        if !self.update.is_empty() {
            for (group, name, status) in report.iter() {
                if let Some(candidate) = status.candidate(self.unstable) {
                    manifest.set_requirement(group, name, &format!("{}{}", self.update, candidate));
                }
            }
            artifact.set_payload(manifest.to_pretty_json());
        }

        let count = report.total();
        if self.error.outdated_count > 0 && count >= self.error.outdated_count {
            return Err(CheckError::OutdatedThreshold { count });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::DependencyStatus;
    use async_trait::async_trait;
    use std::collections::BTreeMap;

    /// Resolver with canned statuses per grouping
    struct StubResolver {
        statuses: BTreeMap<&'static str, BTreeMap<String, DependencyStatus>>,
    }

    impl StubResolver {
        fn empty() -> Self {
            Self {
                statuses: BTreeMap::new(),
            }
        }

        fn with_group(
            mut self,
            group: DepGroup,
            entries: Vec<(&str, DependencyStatus)>,
        ) -> Self {
            self.statuses.insert(
                group.key(),
                entries
                    .into_iter()
                    .map(|(name, status)| (name.to_string(), status))
                    .collect(),
            );
            self
        }
    }

    #[async_trait]
    impl DependencyResolver for StubResolver {
        async fn resolve(
            &self,
            _manifest: &Manifest,
            options: &LookupOptions,
        ) -> Result<BTreeMap<String, DependencyStatus>, ResolveError> {
            Ok(self
                .statuses
                .get(options.group.key())
                .cloned()
                .unwrap_or_default())
        }
    }

    fn registry_url() -> Url {
        Url::parse("https://registry.example.test/").unwrap()
    }

    fn checker(resolver: StubResolver) -> Checker {
        Checker::with_resolver(Box::new(resolver), registry_url()).with_reporter(None)
    }

    fn artifact(json: &str) -> Artifact {
        Artifact::buffered("package.json", json.as_bytes().to_vec())
    }

    fn outdated(required: &str, stable: &str) -> DependencyStatus {
        DependencyStatus::new(required).with_stable(stable)
    }

    #[tokio::test]
    async fn test_report_always_has_three_groupings() {
        let checker = checker(StubResolver::empty());
        let manifest = Manifest::parse(&artifact(r#"{"name":"demo"}"#)).unwrap();
        let report = checker.get_dependencies(&manifest).await.unwrap();
        assert!(report.dependencies.is_empty());
        assert!(report.dev_dependencies.is_empty());
        assert!(report.optional_dependencies.is_empty());
    }

    #[tokio::test]
    async fn test_transform_attaches_report() {
        let resolver = StubResolver::empty()
            .with_group(DepGroup::Runtime, vec![("express", outdated("^4.0.0", "5.1.0"))]);
        let checker = checker(resolver);
        let mut artifact = artifact(r#"{"dependencies":{"express":"^4.0.0"}}"#);

        checker.transform(&mut artifact).await.unwrap();

        let report = artifact.report.as_ref().unwrap();
        assert_eq!(report.total(), 1);
        assert!(report.dependencies.contains_key("express"));
    }

    #[tokio::test]
    async fn test_transform_parse_failure() {
        let checker = checker(StubResolver::empty());
        let mut artifact = Artifact::empty("package.json");

        let err = checker.transform(&mut artifact).await.unwrap_err();
        assert!(matches!(
            err,
            CheckError::Manifest(crate::error::ManifestError::Empty { .. })
        ));
    }

    #[tokio::test]
    async fn test_transform_rewrites_with_operator() {
        let resolver = StubResolver::empty()
            .with_group(DepGroup::Runtime, vec![("foo", outdated("^1.0.0", "2.0.0"))]);
        let checker = checker(resolver).with_update("^");
        let mut artifact = artifact(r#"{"name":"x","dependencies":{"foo":"^1.0.0"}}"#);

        checker.transform(&mut artifact).await.unwrap();

        let rewritten: serde_json::Value =
            serde_json::from_slice(artifact.bytes().unwrap()).unwrap();
        assert_eq!(rewritten["dependencies"]["foo"], "^2.0.0");
    }

    #[tokio::test]
    async fn test_transform_rewrite_prefers_latest_when_unstable() {
        let status = DependencyStatus::new("^1.0.0")
            .with_stable("2.0.0")
            .with_latest("3.0.0-rc.1");
        let resolver = StubResolver::empty().with_group(DepGroup::Runtime, vec![("foo", status)]);
        let checker = checker(resolver).with_update("~").with_unstable(true);
        let mut artifact = artifact(r#"{"dependencies":{"foo":"^1.0.0"}}"#);

        checker.transform(&mut artifact).await.unwrap();

        let rewritten: serde_json::Value =
            serde_json::from_slice(artifact.bytes().unwrap()).unwrap();
        assert_eq!(rewritten["dependencies"]["foo"], "~3.0.0-rc.1");
    }

    #[tokio::test]
    async fn test_transform_rewrite_without_candidate_leaves_entry() {
        let status = DependencyStatus::new("^1.0.0").with_latest("2.0.0-beta.1");
        let resolver = StubResolver::empty().with_group(DepGroup::Runtime, vec![("foo", status)]);
        let checker = checker(resolver).with_update("^");
        let mut artifact = artifact(r#"{"dependencies":{"foo":"^1.0.0"}}"#);

        checker.transform(&mut artifact).await.unwrap();

        let rewritten: serde_json::Value =
            serde_json::from_slice(artifact.bytes().unwrap()).unwrap();
        assert_eq!(rewritten["dependencies"]["foo"], "^1.0.0");
    }

    #[tokio::test]
    async fn test_transform_without_update_keeps_payload() {
        let resolver = StubResolver::empty()
            .with_group(DepGroup::Runtime, vec![("foo", outdated("^1.0.0", "2.0.0"))]);
        let checker = checker(resolver);
        let source = r#"{"dependencies":{"foo":"^1.0.0"}}"#;
        let mut artifact = artifact(source);

        checker.transform(&mut artifact).await.unwrap();

        assert_eq!(artifact.bytes(), Some(source.as_bytes()));
    }

    #[tokio::test]
    async fn test_threshold_fails_when_reached() {
        let resolver = StubResolver::empty().with_group(
            DepGroup::Runtime,
            vec![
                ("foo", outdated("^1.0.0", "2.0.0")),
                ("bar", outdated("^1.0.0", "3.0.0")),
            ],
        );
        let mut checker = checker(resolver);
        checker.error.outdated_count = 2;
        let mut artifact = artifact(r#"{"dependencies":{"foo":"^1.0.0","bar":"^1.0.0"}}"#);

        let err = checker.transform(&mut artifact).await.unwrap_err();
        match err {
            CheckError::OutdatedThreshold { count } => assert_eq!(count, 2),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_threshold_disabled_when_zero() {
        let resolver = StubResolver::empty()
            .with_group(DepGroup::Runtime, vec![("foo", outdated("^1.0.0", "2.0.0"))]);
        let checker = checker(resolver);
        let mut artifact = artifact(r#"{"dependencies":{"foo":"^1.0.0"}}"#);

        assert!(checker.transform(&mut artifact).await.is_ok());
    }

    #[tokio::test]
    async fn test_threshold_failure_still_rewrites() {
        let resolver = StubResolver::empty()
            .with_group(DepGroup::Runtime, vec![("foo", outdated("^1.0.0", "2.0.0"))]);
        let mut checker = checker(resolver).with_update("^");
        checker.error.outdated_count = 1;
        let mut artifact = artifact(r#"{"dependencies":{"foo":"^1.0.0"}}"#);

        let result = checker.transform(&mut artifact).await;
        assert!(result.is_err());

        let rewritten: serde_json::Value =
            serde_json::from_slice(artifact.bytes().unwrap()).unwrap();
        assert_eq!(rewritten["dependencies"]["foo"], "^2.0.0");
        assert!(artifact.report.is_some());
    }
}
