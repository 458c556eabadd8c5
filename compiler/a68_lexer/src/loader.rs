//! Where included source comes from.

use std::io;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

/// Text of a source file and the name that identifies it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadedSource {
    /// Absolute name; two includes of the same file agree on it.
    pub name: String,
    pub text: String,
}

/// Resolves the file named by `PR INCLUDE "name" PR`.
pub trait SourceLoader {
    /// Load `name` as seen from the file `from`.
    fn load(&self, name: &str, from: &str) -> io::Result<LoadedSource>;
}

/// Reads from disk, trying the including file's directory and then each
/// include path.
#[derive(Clone, Debug, Default)]
pub struct FileLoader {
    include_paths: Vec<PathBuf>,
}

impl FileLoader {
    pub fn new(include_paths: Vec<PathBuf>) -> Self {
        FileLoader { include_paths }
    }

    fn candidates(&self, name: &str, from: &str) -> Vec<PathBuf> {
        let path = Path::new(name);
        if path.is_absolute() {
            return vec![path.to_path_buf()];
        }
        let mut out = Vec::with_capacity(self.include_paths.len() + 1);
        let base = Path::new(from).parent().unwrap_or_else(|| Path::new(""));
        out.push(base.join(path));
        out.extend(self.include_paths.iter().map(|dir| dir.join(path)));
        out
    }
}

impl SourceLoader for FileLoader {
    fn load(&self, name: &str, from: &str) -> io::Result<LoadedSource> {
        let mut last = io::Error::new(io::ErrorKind::NotFound, format!("cannot find \"{name}\""));
        for candidate in self.candidates(name, from) {
            match std::fs::read(&candidate) {
                Ok(bytes) => {
                    let canonical = candidate.canonicalize().unwrap_or(candidate);
                    return Ok(LoadedSource {
                        name: canonical.to_string_lossy().into_owned(),
                        text: String::from_utf8_lossy(&bytes).into_owned(),
                    });
                }
                Err(e) => last = e,
            }
        }
        Err(last)
    }
}

/// In-memory files, keyed by name.
#[derive(Clone, Debug, Default)]
pub struct MemoryLoader {
    files: FxHashMap<String, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_file(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.files.insert(name.into(), text.into());
        self
    }
}

impl SourceLoader for MemoryLoader {
    fn load(&self, name: &str, _from: &str) -> io::Result<LoadedSource> {
        self.files
            .get(name)
            .map(|text| LoadedSource {
                name: name.to_string(),
                text: text.clone(),
            })
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no file \"{name}\"")))
    }
}
