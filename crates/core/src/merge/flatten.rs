use std::collections::HashMap;

use restdoc_model::{ApiGrouping, Fragment};
use tracing::debug;

use super::{Grouping, SourcedEndpoint};

/// Combine groupings sharing an id across all fragments.
///
/// The first non-empty title, version and base path win; documentation items
/// are concatenated in fragment order without exact duplicates. An implicit
/// default grouping that ends up with no endpoints is dropped.
pub(crate) fn flatten(fragments: &[Fragment]) -> Vec<Grouping> {
    let mut combined: Vec<Grouping> = Vec::new();
    let mut index: HashMap<Option<String>, usize> = HashMap::new();

    for fragment in fragments {
        let origin = fragment.origin_label();
        for grouping in &fragment.groupings {
            let slot = *index.entry(grouping.id.clone()).or_insert_with(|| {
                combined.push(Grouping {
                    id: grouping.id.clone(),
                    ..Grouping::default()
                });
                combined.len() - 1
            });
            absorb(&mut combined[slot], grouping, origin);
        }
    }

    combined.retain(|g| {
        let keep = g.id.is_some() || !g.endpoints.is_empty();
        if !keep {
            debug!("Dropping empty default grouping.");
        }
        keep
    });
    combined
}

/// Combine groupings whose ids became equal once placeholders were resolved,
/// with the same precedence as [`flatten`]. The first occurrence keeps its
/// position.
pub(crate) fn regroup(groupings: Vec<Grouping>) -> Vec<Grouping> {
    let mut combined: Vec<Grouping> = Vec::with_capacity(groupings.len());
    let mut index: HashMap<Option<String>, usize> = HashMap::new();

    for grouping in groupings {
        let existing = index.get(&grouping.id).copied();
        match existing {
            Some(slot) => {
                debug!(grouping = %grouping.label(), "Combining groupings with the same resolved id.");
                fold(&mut combined[slot], grouping);
            }
            None => {
                index.insert(grouping.id.clone(), combined.len());
                combined.push(grouping);
            }
        }
    }
    combined
}

fn fold(target: &mut Grouping, other: Grouping) {
    fill(&mut target.title, other.title.as_ref());
    fill(&mut target.version, other.version.as_ref());
    fill(&mut target.base_path, other.base_path.as_ref());

    for item in other.documentation {
        if !target.documentation.contains(&item) {
            target.documentation.push(item);
        }
    }
    target.endpoints.extend(other.endpoints);
    for origin in other.origins {
        if !target.origins.contains(&origin) {
            target.origins.push(origin);
        }
    }
}

fn absorb(target: &mut Grouping, grouping: &ApiGrouping, origin: &str) {
    fill(&mut target.title, grouping.title.as_ref());
    fill(&mut target.version, grouping.version.as_ref());
    fill(&mut target.base_path, grouping.base_path.as_ref());

    for item in &grouping.documentation {
        if !target.documentation.contains(item) {
            target.documentation.push(item.clone());
        }
    }

    target
        .endpoints
        .extend(grouping.endpoints.iter().map(|endpoint| SourcedEndpoint {
            origin: origin.to_string(),
            endpoint: endpoint.clone(),
        }));

    if !target.origins.iter().any(|o| o == origin) {
        target.origins.push(origin.to_string());
    }
}

fn fill(slot: &mut Option<String>, candidate: Option<&String>) {
    let empty = slot.as_deref().is_none_or(str::is_empty);
    if let Some(value) = candidate.filter(|v| !v.is_empty())
        && empty
    {
        *slot = Some(value.clone());
    }
}
