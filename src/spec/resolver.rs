//! Payload resolution for spec files.
//!
//! Each payload (route default response, per-rule response, per-rule request
//! body) is resolved independently, first tier present wins:
//!
//! 1. inline value in the YAML document
//! 2. explicit `*_file` reference, relative to the spec file's directory
//! 3. convention file beside the spec (`<name>.<method>.resp.json`,
//!    `<name>.<method>.resp.<i>.json`, `<name>.<method>.req.<i>.json`)
//!
//! A missing explicit file is an error; a missing convention file is not.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::spec::loader::SpecLoadError;

/// Convention file slot for a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convention {
    /// The route's default response.
    DefaultResponse,
    /// Response of the match rule with this 1-based ordinal.
    Response(usize),
    /// Request body of the match rule with this 1-based ordinal.
    Request(usize),
}

/// A spec file located on disk, split into the pieces resolution needs.
#[derive(Debug, Clone)]
pub struct SpecFile {
    /// Full path of the `.yaml` file.
    pub path: PathBuf,
    /// Directory holding the spec and its sibling payload files.
    pub dir: PathBuf,
    /// Resource name, first dot-separated component of the filename. Empty
    /// for directory-level specs.
    pub name: String,
    /// Method token exactly as written in the filename.
    pub method_token: String,
}

impl SpecFile {
    /// Split `<name>.<method>[.anything].yaml`. Returns `None` when the file
    /// stem has fewer than two dot-separated components or no method token.
    /// The name may be empty (`.get.yaml`), naming the directory itself.
    pub fn from_path(path: &Path) -> Option<Self> {
        let stem = path.file_stem()?.to_str()?;
        let mut parts = stem.split('.');
        let name = parts.next()?;
        let method_token = parts.next()?;
        if method_token.is_empty() {
            return None;
        }

        Some(Self {
            path: path.to_path_buf(),
            dir: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            name: name.to_string(),
            method_token: method_token.to_string(),
        })
    }

    pub fn convention_path(&self, slot: Convention) -> PathBuf {
        let file_name = match slot {
            Convention::DefaultResponse => format!("{}.{}.resp.json", self.name, self.method_token),
            Convention::Response(i) => format!("{}.{}.resp.{}.json", self.name, self.method_token, i),
            Convention::Request(i) => format!("{}.{}.req.{}.json", self.name, self.method_token, i),
        };
        self.dir.join(file_name)
    }

    /// Resolve one payload through the three tiers.
    pub fn resolve(
        &self,
        inline: Option<Value>,
        file_ref: Option<&Path>,
        slot: Convention,
    ) -> Result<Option<Value>, SpecLoadError> {
        if let Some(value) = inline {
            return Ok(Some(value));
        }

        if let Some(file_ref) = file_ref {
            let referenced = self.dir.join(file_ref);
            return read_json(&referenced, &self.path).map(Some);
        }

        let conventional = self.convention_path(slot);
        if conventional.is_file() {
            tracing::trace!(file = %conventional.display(), "Using convention payload file");
            return read_json(&conventional, &self.path).map(Some);
        }
        Ok(None)
    }
}

fn read_json(path: &Path, spec: &Path) -> Result<Value, SpecLoadError> {
    let bytes = fs::read(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            SpecLoadError::MissingFile {
                spec: spec.to_path_buf(),
                path: path.to_path_buf(),
            }
        } else {
            SpecLoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    serde_json::from_slice(&bytes).map_err(|source| SpecLoadError::InvalidJson {
        path: path.to_path_buf(),
        source,
    })
}
