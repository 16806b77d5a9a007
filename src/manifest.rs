//! JSON manifest parsing and rewriting
//!
//! A manifest is the parsed `package.json` object of an artifact. Key order
//! is preserved end to end so a rewritten manifest keeps its original layout.

use serde_json::{Map, Value};

use crate::artifact::{Artifact, Contents};
use crate::error::ManifestError;

/// Dependency groupings of an npm manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepGroup {
    /// `dependencies`
    Runtime,
    /// `devDependencies`
    Dev,
    /// `optionalDependencies`
    Optional,
}

impl DepGroup {
    /// All groupings, in manifest order
    pub const ALL: [DepGroup; 3] = [DepGroup::Runtime, DepGroup::Dev, DepGroup::Optional];

    /// The manifest key of this grouping
    pub fn key(&self) -> &'static str {
        match self {
            DepGroup::Runtime => "dependencies",
            DepGroup::Dev => "devDependencies",
            DepGroup::Optional => "optionalDependencies",
        }
    }
}

impl std::fmt::Display for DepGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// A parsed manifest object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    object: Map<String, Value>,
}

impl Manifest {
    /// Parses the buffered payload of an artifact into a manifest
    pub fn parse(artifact: &Artifact) -> Result<Self, ManifestError> {
        let bytes = match &artifact.contents {
            Contents::Empty => return Err(ManifestError::empty(&artifact.path)),
            Contents::Stream(_) => {
                return Err(ManifestError::unsupported_stream(&artifact.path))
            }
            Contents::Buffer(bytes) => bytes,
        };

        let value: Value = serde_json::from_slice(bytes)
            .map_err(|err| ManifestError::invalid_format(&artifact.path, err.to_string()))?;

        match value {
            Value::Object(object) => Ok(Self { object }),
            other => Err(ManifestError::invalid_format(
                &artifact.path,
                format!("expected a JSON object, found {}", json_type_name(&other)),
            )),
        }
    }

    /// Wraps an already-parsed JSON object
    pub fn from_object(object: Map<String, Value>) -> Self {
        Self { object }
    }

    /// The `name` field, when present and a string
    pub fn name(&self) -> Option<&str> {
        self.object.get("name").and_then(Value::as_str)
    }

    /// The raw entries of one grouping, when the grouping exists and is an object
    pub fn group(&self, group: DepGroup) -> Option<&Map<String, Value>> {
        self.object.get(group.key()).and_then(Value::as_object)
    }

    /// Sets the requirement of one dependency, creating the grouping object
    /// when it does not exist yet
    pub fn set_requirement(&mut self, group: DepGroup, name: &str, requirement: &str) {
        let entry = self
            .object
            .entry(group.key().to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(deps) = entry {
            deps.insert(name.to_string(), Value::String(requirement.to_string()));
        }
    }

    /// Serializes the manifest as 2-space pretty-printed JSON
    pub fn to_pretty_json(&self) -> String {
        // An object of JSON values cannot fail to serialize
        serde_json::to_string_pretty(&Value::Object(self.object.clone()))
            .unwrap_or_else(|_| String::from("{}"))
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
