use restdoc_model::Scope;
use tracing::debug;

use super::{ExclusionSet, Grouping};
use crate::path::normalize_path;

/// Normalize every mount path and drop the mounts matching an exclusion
/// pattern. Each mount is judged on its own; an endpoint disappears only when
/// all of its mounts are excluded. Mounts that normalize to the same path are
/// collapsed.
pub(crate) fn exclude(groupings: Vec<Grouping>, exclusions: &ExclusionSet) -> Vec<Grouping> {
    groupings
        .into_iter()
        .map(|mut grouping| {
            let label = grouping.label().to_string();
            grouping.endpoints.retain_mut(|sourced| {
                let mut kept: Vec<String> = Vec::with_capacity(sourced.endpoint.paths.len());
                for path in &sourced.endpoint.paths {
                    let path = normalize_path(path);
                    if exclusions.is_excluded(&path) {
                        debug!(grouping = %label, path = %path, "Excluded mount.");
                    } else if !kept.contains(&path) {
                        kept.push(path);
                    }
                }
                sourced.endpoint.paths = kept;
                !sourced.endpoint.paths.is_empty()
            });
            grouping
        })
        .collect()
}

/// Keep only the endpoints published to `scope`. The `all` scope keeps
/// everything.
pub(crate) fn restrict_scope(groupings: Vec<Grouping>, scope: &Scope) -> Vec<Grouping> {
    if scope.is_all() {
        return groupings;
    }
    groupings
        .into_iter()
        .map(|mut grouping| {
            grouping
                .endpoints
                .retain(|sourced| sourced.endpoint.is_in_scope(scope));
            grouping
        })
        .collect()
}
