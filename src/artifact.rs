//! Pipeline artifact: a file path with a payload
//!
//! Artifacts are the unit flowing through the checker pipeline. The payload
//! is either absent, fully buffered, or an incrementally delivered stream.
//! Streams are carried for pipeline compatibility but never parsed.

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::ManifestError;
use crate::report::DependencyReport;

/// Payload of an artifact
pub enum Contents {
    /// No payload attached
    Empty,
    /// Fully buffered payload
    Buffer(Vec<u8>),
    /// Incrementally delivered payload
    Stream(Box<dyn Read + Send>),
}

impl fmt::Debug for Contents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Contents::Empty => write!(f, "Empty"),
            Contents::Buffer(bytes) => write!(f, "Buffer({} bytes)", bytes.len()),
            Contents::Stream(_) => write!(f, "Stream(..)"),
        }
    }
}

/// A file flowing through the pipeline
#[derive(Debug)]
pub struct Artifact {
    /// Path the payload was read from, or will be written to
    pub path: PathBuf,
    /// The payload itself
    pub contents: Contents,
    /// Dependency report attached by the checker
    pub report: Option<DependencyReport>,
}

impl Artifact {
    /// Creates an artifact with the given payload
    pub fn new(path: impl Into<PathBuf>, contents: Contents) -> Self {
        Self {
            path: path.into(),
            contents,
            report: None,
        }
    }

    /// Creates an artifact with a buffered payload
    pub fn buffered(path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(path, Contents::Buffer(bytes.into()))
    }

    /// Creates an artifact with no payload
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self::new(path, Contents::Empty)
    }

    /// Reads a file from disk into a buffered artifact
    pub fn read(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).map_err(|source| ManifestError::read(path, source))?;
        Ok(Self::buffered(path, bytes))
    }

    /// Returns true when the artifact carries no payload
    pub fn is_empty(&self) -> bool {
        matches!(self.contents, Contents::Empty)
    }

    /// Returns true when the payload is a stream
    pub fn is_stream(&self) -> bool {
        matches!(self.contents, Contents::Stream(_))
    }

    /// Returns the buffered payload, if any
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.contents {
            Contents::Buffer(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Replaces the payload with a buffer
    pub fn set_payload(&mut self, bytes: impl Into<Vec<u8>>) {
        self.contents = Contents::Buffer(bytes.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_artifact() {
        let artifact = Artifact::empty("package.json");
        assert!(artifact.is_empty());
        assert!(!artifact.is_stream());
        assert!(artifact.bytes().is_none());
        assert!(artifact.report.is_none());
    }

    #[test]
    fn test_buffered_artifact() {
        let artifact = Artifact::buffered("package.json", b"{}".to_vec());
        assert!(!artifact.is_empty());
        assert_eq!(artifact.bytes(), Some(b"{}".as_slice()));
    }

    #[test]
    fn test_stream_artifact() {
        let stream: Box<dyn Read + Send> = Box::new(std::io::Cursor::new(b"{}".to_vec()));
        let artifact = Artifact::new("package.json", Contents::Stream(stream));
        assert!(artifact.is_stream());
        assert!(artifact.bytes().is_none());
    }

    #[test]
    fn test_set_payload_replaces_contents() {
        let mut artifact = Artifact::empty("package.json");
        artifact.set_payload(b"{\"name\":\"x\"}".to_vec());
        assert_eq!(artifact.bytes(), Some(b"{\"name\":\"x\"}".as_slice()));
    }

    #[test]
    fn test_read_missing_file() {
        let err = Artifact::read("/nonexistent/package.json").unwrap_err();
        let msg = format!("{}", err);
        assert!(msg.contains("failed to read manifest file"));
    }

    #[test]
    fn test_contents_debug() {
        assert_eq!(format!("{:?}", Contents::Empty), "Empty");
        assert_eq!(format!("{:?}", Contents::Buffer(vec![1, 2, 3])), "Buffer(3 bytes)");
    }
}
