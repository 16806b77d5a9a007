//! Report output formatting
//!
//! Reporters receive the checked artifact after its report is attached.
//! The console reporter prints a colored per-grouping summary; the JSON
//! reporter prints the raw report for machine consumption.

use colored::Colorize;

use crate::artifact::Artifact;
use crate::manifest::DepGroup;
use crate::report::DependencyStatus;

/// Receives checked artifacts for display
pub trait Reporter: Send + Sync {
    /// Log the report attached to an artifact
    fn log(&self, artifact: &Artifact);
}

/// Magnitude of the jump from the required range to a candidate version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChangeKind {
    Major,
    Minor,
    Patch,
}

impl ChangeKind {
    /// Compare the first version-looking token of the requirement against
    /// the candidate
    fn classify(required: &str, candidate: &str) -> Option<ChangeKind> {
        let required = required.trim_start_matches(['^', '~', '=', 'v', '>', '<', ' ']);
        let old = semver::Version::parse(required).ok()?;
        let new = semver::Version::parse(candidate).ok()?;
        if new.major != old.major {
            Some(ChangeKind::Major)
        } else if new.minor != old.minor {
            Some(ChangeKind::Minor)
        } else if new.patch != old.patch {
            Some(ChangeKind::Patch)
        } else {
            None
        }
    }
}

/// Human-readable colored console output
pub struct ConsoleReporter {
    color: bool,
}

impl ConsoleReporter {
    /// Creates a console reporter; `color` toggles ANSI styling
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, text: &str, kind: Option<ChangeKind>) -> String {
        if !self.color {
            return text.to_string();
        }
        match kind {
            Some(ChangeKind::Major) => text.red().bold().to_string(),
            Some(ChangeKind::Minor) => text.yellow().to_string(),
            Some(ChangeKind::Patch) => text.green().to_string(),
            None => text.normal().to_string(),
        }
    }

    fn print_row(&self, name: &str, width: usize, status: &DependencyStatus) {
        let candidate = status.stable.as_deref().or(status.latest.as_deref());
        let kind = candidate.and_then(|c| ChangeKind::classify(&status.required, c));

        let mut line = format!(
            "  {:<width$}  {} -> {}",
            name,
            status.required,
            self.paint(candidate.unwrap_or("?"), kind),
            width = width
        );
        if let Some(latest) = &status.latest {
            if status.stable.as_deref() != Some(latest.as_str()) {
                line.push_str(&format!(" (latest {})", latest));
            }
        }
        if let Some(released_at) = &status.released_at {
            line.push_str(&format!(" released {}", released_at.format("%Y-%m-%d")));
        }
        println!("{}", line);
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Reporter for ConsoleReporter {
    fn log(&self, artifact: &Artifact) {
        let Some(report) = &artifact.report else {
            return;
        };

        let heading = artifact.path.display().to_string();
        if self.color {
            println!("{}", heading.bold());
        } else {
            println!("{}", heading);
        }

        if report.is_empty() {
            let message = "All dependencies are up to date.";
            if self.color {
                println!("  {}", message.green());
            } else {
                println!("  {}", message);
            }
            return;
        }

        for group in DepGroup::ALL {
            let statuses = report.group(group);
            if statuses.is_empty() {
                continue;
            }

            println!("{}:", group.key());
            let width = statuses.keys().map(String::len).max().unwrap_or(0);
            for (name, status) in statuses {
                self.print_row(name, width, status);
            }
        }
    }
}

/// Machine-readable pretty JSON output
#[derive(Debug, Default)]
pub struct JsonReporter;

impl JsonReporter {
    /// Creates a JSON reporter
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for JsonReporter {
    fn log(&self, artifact: &Artifact) {
        let Some(report) = &artifact.report else {
            return;
        };
        if let Ok(json) = serde_json::to_string_pretty(report) {
            println!("{}", json);
        }
    }
}
