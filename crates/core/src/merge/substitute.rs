use crate::error::MergeError;
use crate::template::TemplateValues;

use super::Grouping;

/// Resolve placeholders in grouping metadata and endpoint paths. Any
/// placeholder without a value fails the whole merge.
pub(crate) fn substitute(
    groupings: Vec<Grouping>,
    values: &TemplateValues,
) -> Result<Vec<Grouping>, MergeError> {
    groupings
        .into_iter()
        .map(|grouping| substitute_grouping(grouping, values))
        .collect()
}

fn substitute_grouping(
    mut grouping: Grouping,
    values: &TemplateValues,
) -> Result<Grouping, MergeError> {
    // Context for errors uses the unsubstituted id.
    let label = grouping.label().to_string();
    let apply = |text: &str, field: &str| {
        values
            .substitute(text)
            .map_err(|err| MergeError::UnresolvedTemplatePlaceholder {
                placeholder: err.placeholder,
                grouping: label.clone(),
                field: field.to_string(),
            })
    };

    if let Some(id) = &grouping.id {
        grouping.id = Some(apply(id, "id")?);
    }
    if let Some(title) = &grouping.title {
        grouping.title = Some(apply(title, "title")?);
    }
    if let Some(version) = &grouping.version {
        grouping.version = Some(apply(version, "version")?);
    }
    if let Some(base_path) = &grouping.base_path {
        grouping.base_path = Some(apply(base_path, "base path")?);
    }
    for item in &mut grouping.documentation {
        item.title = apply(&item.title, "documentation title")?;
        item.content = apply(&item.content, "documentation")?;
    }
    for sourced in &mut grouping.endpoints {
        let field = format!("path of {} in {}", sourced.endpoint.method, sourced.origin);
        for path in &mut sourced.endpoint.paths {
            *path = apply(path, &field)?;
        }
    }
    Ok(grouping)
}
