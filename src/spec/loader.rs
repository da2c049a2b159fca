//! Spec directory loading.
//!
//! Walks the spec root, turns every `<name>.<method>.yaml` into a
//! `(RouteKey, RouteEntry)` pair and collects them into a routing table.
//! Files are visited in sorted path order, so a duplicate key always
//! resolves to the same (last) spec.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use axum::http::{Method, StatusCode};
use thiserror::Error;

use crate::routing::route::{MatchCondition, MatchEntry, RouteEntry, RouteKey};
use crate::routing::table::RoutingTable;
use crate::spec::document::{param_string, parse_document, MatchDocument};
use crate::spec::resolver::{Convention, SpecFile};

/// Errors that abort a spec load. The previous table stays live on reload.
#[derive(Debug, Error)]
pub enum SpecLoadError {
    /// Spec root is missing or not a directory.
    #[error("spec directory not found: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    /// Spec file is not valid YAML or does not fit the spec schema.
    #[error("malformed spec {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// A `response_file` / `request_file` reference points nowhere.
    #[error("{} references missing file {}", .spec.display(), .path.display())]
    MissingFile { spec: PathBuf, path: PathBuf },

    #[error("invalid JSON in {}: {source}", .path.display())]
    InvalidJson {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid status {status} in {}", .path.display())]
    InvalidStatus { path: PathBuf, status: u16 },

    /// Query-parameter values must be scalars.
    #[error("query parameter `{key}` in {} must be a string, number or boolean", .path.display())]
    InvalidParam { path: PathBuf, key: String },
}

/// Load the spec tree under `root` into a fresh routing table.
pub fn load_table(root: &Path) -> Result<RoutingTable, SpecLoadError> {
    load_specs(root).map(RoutingTable::new)
}

/// Load every route spec under `root`.
pub fn load_specs(root: &Path) -> Result<HashMap<RouteKey, RouteEntry>, SpecLoadError> {
    if !root.is_dir() {
        return Err(SpecLoadError::RootNotFound(root.to_path_buf()));
    }

    let mut routes = HashMap::new();
    for path in list_files(root, &["yaml"])? {
        let Some((key, entry)) = load_spec(root, &path)? else {
            continue;
        };
        if routes.insert(key.clone(), entry).is_some() {
            tracing::debug!(route = %key, spec = %path.display(), "Duplicate route, later spec wins");
        }
    }

    tracing::debug!(root = %root.display(), routes = routes.len(), "Specs loaded");
    Ok(routes)
}

/// Load a single spec file. `Ok(None)` means the file is not a route spec.
fn load_spec(root: &Path, path: &Path) -> Result<Option<(RouteKey, RouteEntry)>, SpecLoadError> {
    let Some(spec) = SpecFile::from_path(path) else {
        tracing::debug!(file = %path.display(), "Skipping yaml file without <name>.<method> stem");
        return Ok(None);
    };

    let method = match Method::from_bytes(spec.method_token.to_ascii_uppercase().as_bytes()) {
        Ok(method) => method,
        Err(_) => {
            tracing::warn!(file = %path.display(), token = %spec.method_token, "Skipping spec with invalid method token");
            return Ok(None);
        }
    };

    let content = fs::read_to_string(path).map_err(|source| SpecLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let doc = parse_document(&content).map_err(|source| SpecLoadError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;

    let status = to_status(doc.status.unwrap_or(200), path)?;
    let default_response = spec
        .resolve(doc.response, doc.response_file.as_deref(), Convention::DefaultResponse)?
        .filter(|value| !value.is_null());

    let matches = doc
        .matches
        .into_iter()
        .enumerate()
        .map(|(i, rule)| load_match(&spec, i + 1, rule, status))
        .collect::<Result<Vec<_>, _>>()?;

    let key = RouteKey::new(method, route_path(root, &spec));
    Ok(Some((
        key,
        RouteEntry {
            status,
            default_response,
            matches,
        },
    )))
}

fn load_match(
    spec: &SpecFile,
    ordinal: usize,
    rule: MatchDocument,
    route_status: StatusCode,
) -> Result<MatchEntry, SpecLoadError> {
    let params: Option<BTreeMap<String, String>> = rule
        .params
        .map(|params| {
            params
                .into_iter()
                .map(|(key, value)| match param_string(&value) {
                    Some(value) => Ok((key, value)),
                    None => Err(SpecLoadError::InvalidParam {
                        path: spec.path.clone(),
                        key,
                    }),
                })
                .collect::<Result<_, _>>()
        })
        .transpose()?;

    let request = spec.resolve(rule.request, rule.request_file.as_deref(), Convention::Request(ordinal))?;
    let response = spec
        .resolve(rule.response, rule.response_file.as_deref(), Convention::Response(ordinal))?
        .filter(|value| !value.is_null());
    let status = match rule.status {
        Some(code) => to_status(code, &spec.path)?,
        None => route_status,
    };

    let condition = MatchCondition::from_parts(params, request);
    if condition == MatchCondition::Never {
        tracing::warn!(
            spec = %spec.path.display(),
            rule = ordinal,
            "Match rule has neither params nor a request body and will never match"
        );
    }

    Ok(MatchEntry {
        condition,
        status,
        response,
    })
}

fn to_status(code: u16, path: &Path) -> Result<StatusCode, SpecLoadError> {
    StatusCode::from_u16(code).map_err(|_| SpecLoadError::InvalidStatus {
        path: path.to_path_buf(),
        status: code,
    })
}

/// `/<dir segments relative to root>/<name>`. An empty name maps to the
/// directory itself, `/` at the root.
fn route_path(root: &Path, spec: &SpecFile) -> String {
    let mut path = String::new();
    if let Ok(relative) = spec.dir.strip_prefix(root) {
        for component in relative.components() {
            if let Component::Normal(segment) = component {
                path.push('/');
                path.push_str(&segment.to_string_lossy());
            }
        }
    }
    if !spec.name.is_empty() || path.is_empty() {
        path.push('/');
        path.push_str(&spec.name);
    }
    path
}

/// Recursively list files under `root` with one of `extensions`, sorted by
/// full path. Symlinked directories are not followed.
pub(crate) fn list_files(root: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>, SpecLoadError> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let io_err = |source: io::Error| SpecLoadError::Io {
            path: dir.clone(),
            source,
        };
        for entry in fs::read_dir(&dir).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            let path = entry.path();
            if entry.file_type().map_err(io_err)?.is_dir() {
                pending.push(path);
            } else if has_extension(&path, extensions) && path.is_file() {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.contains(&ext))
}
