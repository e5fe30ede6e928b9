use std::fs;
use std::path::Path;

use memmap2::Mmap;

use crate::error::Result;

/// Backing storage for artifact bytes: freshly compiled output lives on the
/// heap, reopened artifacts are memory-mapped from disk.
#[derive(Debug)]
enum ArtifactBytes {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

/// Backend-specific opaque bytes produced by a `Compiler`.
///
/// Owned by the harness for the duration of a test run. A `Runtime` turns
/// an artifact into an `Invoker` via `Runtime::load`. Artifacts can also be
/// persisted to disk and reopened without copying, via memory mapping.
#[derive(Debug)]
pub struct CompiledArtifact {
    backend_name: String,
    bytes: ArtifactBytes,
}

impl CompiledArtifact {
    /// Create an artifact from compiler output.
    pub fn new(backend_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        CompiledArtifact {
            backend_name: backend_name.into(),
            bytes: ArtifactBytes::Owned(bytes),
        }
    }

    /// The name of the backend this artifact was compiled for.
    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    /// The raw artifact bytes.
    pub fn bytes(&self) -> &[u8] {
        match &self.bytes {
            ArtifactBytes::Owned(v) => v.as_slice(),
            ArtifactBytes::Mapped(m) => m,
        }
    }

    /// Size of the artifact in bytes.
    pub fn len(&self) -> usize {
        self.bytes().len()
    }

    /// Returns true if the artifact is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the artifact bytes to a file.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, self.bytes())?;
        Ok(())
    }

    /// Reopen a previously written artifact, memory-mapping the file so its
    /// bytes can be accessed without an extra copy.
    pub fn open(backend_name: impl Into<String>, path: &Path) -> Result<CompiledArtifact> {
        let file = fs::File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(CompiledArtifact {
            backend_name: backend_name.into(),
            bytes: ArtifactBytes::Mapped(mmap),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_artifact() {
        let a = CompiledArtifact::new("fake", vec![1, 2, 3]);
        assert_eq!(a.backend_name(), "fake");
        assert_eq!(a.bytes(), &[1, 2, 3]);
        assert_eq!(a.len(), 3);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_write_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");

        let a = CompiledArtifact::new("fake", vec![7u8; 64]);
        a.write_to(&path).unwrap();

        let reopened = CompiledArtifact::open("fake", &path).unwrap();
        assert_eq!(reopened.bytes(), a.bytes());
        assert_eq!(reopened.backend_name(), "fake");
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.bin");
        assert!(CompiledArtifact::open("fake", &path).is_err());
    }
}
