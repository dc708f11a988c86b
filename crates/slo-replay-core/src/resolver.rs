//! Turns command input into a validated batch of work items.
//!
//! Input is either a single SLO name with a `from` time, or one or more YAML
//! files each holding a list of entries. Everything here runs before any
//! network call.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use slo_replay_sdk::{SourceSlo, PROJECTS_WILDCARD};
use tracing::debug;

use crate::error::{EntryLocation, ReplayError};
use crate::item::ReplayWorkItem;

/// Raw command input for the run command.
#[derive(Debug, Clone, Default)]
pub struct ResolveRequest {
    pub files: Vec<PathBuf>,
    /// Positional SLO names. At most one is accepted.
    pub names: Vec<String>,
    pub from: Option<DateTime<FixedOffset>>,
    /// Ambient project applied to entries that do not name one.
    pub project: String,
}

/// One entry of a work-item file, before defaults are applied.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReplayEntry {
    #[serde(default)]
    project: Option<String>,
    #[serde(default)]
    slo: Option<String>,
    #[serde(default)]
    from: Option<DateTime<FixedOffset>>,
    #[serde(default, rename = "sourceSLO")]
    source_slo: Option<SourceSlo>,
}

/// Check the shape of the command input without reading any file.
pub fn validate_arguments(request: &ResolveRequest) -> Result<(), ReplayError> {
    if request.files.is_empty() && request.names.is_empty() {
        return Err(ReplayError::InvalidOptions);
    }
    if request.names.len() > 1 {
        return Err(ReplayError::TooManyArguments);
    }
    if !request.files.is_empty() && !request.names.is_empty() {
        return Err(ReplayError::InvalidOptions);
    }
    if !request.names.is_empty() && request.from.is_none() {
        return Err(ReplayError::MissingFrom);
    }
    Ok(())
}

/// Resolve the command input into an ordered, deduplicated batch.
///
/// Order is file order, then entry order within each file.
pub fn resolve(request: &ResolveRequest) -> Result<Vec<ReplayWorkItem>, ReplayError> {
    validate_arguments(request)?;
    if request.project == PROJECTS_WILDCARD {
        return Err(ReplayError::WildcardProject);
    }

    if request.files.is_empty() {
        let (Some(name), Some(from)) = (request.names.first(), request.from) else {
            return Err(ReplayError::InvalidOptions);
        };
        if request.project.is_empty() {
            return Err(ReplayError::MissingProject);
        }
        return Ok(vec![ReplayWorkItem::new(
            request.project.clone(),
            name.clone(),
            from,
        )]);
    }

    let mut items = Vec::new();
    let mut seen: HashMap<(String, String), EntryLocation> = HashMap::new();

    for path in &request.files {
        let entries = read_entries(path)?;
        debug!(path = %path.display(), entries = entries.len(), "Read Replay config file");

        for (i, entry) in entries.into_iter().enumerate() {
            let location = EntryLocation {
                path: path.clone(),
                index: i + 1,
            };
            let item = apply_defaults(entry, request, &location)?;

            let key = (item.slo.clone(), item.project.clone());
            if let Some(first) = seen.get(&key) {
                return Err(ReplayError::DuplicateEntry {
                    slo: item.slo,
                    project: item.project,
                    first: first.clone(),
                    second: location,
                });
            }
            seen.insert(key, location);
            items.push(item);
        }
    }

    if items.is_empty() {
        return Err(ReplayError::EmptyBatch);
    }
    Ok(items)
}

fn read_entries(path: &Path) -> Result<Vec<ReplayEntry>, ReplayError> {
    let content = std::fs::read_to_string(path).map_err(|source| ReplayError::ConfigFileRead {
        path: path.to_path_buf(),
        source,
    })?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let entries: Option<Vec<ReplayEntry>> =
        serde_yaml::from_str(&content).map_err(|source| ReplayError::ConfigFileParse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(entries.unwrap_or_default())
}

fn apply_defaults(
    entry: ReplayEntry,
    request: &ResolveRequest,
    location: &EntryLocation,
) -> Result<ReplayWorkItem, ReplayError> {
    let invalid = |field| ReplayError::InvalidEntry {
        location: location.clone(),
        field,
    };

    let project = entry
        .project
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| request.project.clone());
    if project.is_empty() {
        return Err(invalid("project"));
    }
    let slo = entry
        .slo
        .filter(|s| !s.is_empty())
        .ok_or_else(|| invalid("slo"))?;
    let from = entry.from.or(request.from).ok_or_else(|| invalid("from"))?;

    if let Some(source) = &entry.source_slo {
        if source.project.is_empty() {
            return Err(invalid("sourceSLO.project"));
        }
        if source.slo.is_empty() {
            return Err(invalid("sourceSLO.slo"));
        }
    }

    Ok(ReplayWorkItem {
        project,
        slo,
        from,
        source_slo: entry.source_slo,
        metric_source: None,
    })
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
