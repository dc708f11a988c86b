//! Eligibility verification of a resolved batch.

use slo_replay_sdk::{Slo, PROJECTS_WILDCARD};
use tracing::{debug, info};

use crate::error::ReplayError;
use crate::item::{slo_label, ReplayWorkItem};
use crate::platform::ReplayPlatform;

/// Check every item against one batched SLO lookup and attach metric sources.
///
/// The lookup is issued once for the union of all referenced names, source
/// SLOs included, across all projects. The step is all-or-nothing: any
/// missing or composite SLO fails the whole batch.
pub async fn verify_slos(
    platform: &dyn ReplayPlatform,
    items: &mut [ReplayWorkItem],
) -> Result<(), ReplayError> {
    let names = referenced_names(items);
    debug!(count = names.len(), "Looking up SLOs marked for Replay");

    let slos = platform
        .get_slos(PROJECTS_WILDCARD, &names)
        .await
        .map_err(ReplayError::Lookup)?;

    let mut missing = Vec::new();
    let mut composite = Vec::new();

    for item in items.iter_mut() {
        match find_slo(&slos, &item.slo, &item.project) {
            Some(slo) if slo.is_composite() => composite.push(item.label()),
            Some(slo) => match slo.metric_source() {
                Some(source) => item.metric_source = Some(source.clone()),
                // Without an indicator there is no data source to replay from.
                None => composite.push(item.label()),
            },
            None => missing.push(item.label()),
        }

        if let Some(source) = &item.source_slo {
            if find_slo(&slos, &source.slo, &source.project).is_none() {
                missing.push(format!(
                    "{} (source of '{}')",
                    slo_label(&source.slo, &source.project),
                    item.slo
                ));
            }
        }
    }

    if !missing.is_empty() || !composite.is_empty() {
        return Err(ReplayError::Verification { missing, composite });
    }

    info!(count = items.len(), "Verified SLOs marked for Replay");
    Ok(())
}

fn referenced_names(items: &[ReplayWorkItem]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(items.len());
    let referenced = items.iter().flat_map(|item| {
        std::iter::once(&item.slo).chain(item.source_slo.as_ref().map(|s| &s.slo))
    });
    for name in referenced {
        if !names.contains(name) {
            names.push(name.clone());
        }
    }
    names
}

fn find_slo<'a>(slos: &'a [Slo], name: &str, project: &str) -> Option<&'a Slo> {
    slos.iter()
        .find(|s| s.metadata.name == name && s.metadata.project == project)
}

#[cfg(test)]
#[path = "verifier_tests.rs"]
mod tests;
