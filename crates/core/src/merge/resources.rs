//! Resource tree construction and per-view resolution.
//!
//! One resource exists per distinct normalized endpoint path. A resource
//! nests under the resource whose path is its longest proper segment-wise
//! prefix, and declares only the URI parameters that appear in its own
//! relative path. Parameters of the same name at the same position are
//! therefore declared once, on the outermost resource that introduces them.

use std::collections::HashMap;
use std::mem;

use restdoc_model::{Endpoint, Parameter, StabilityTrait};
use tracing::debug;

use super::{Grouping, SourcedEndpoint};
use crate::error::MergeError;
use crate::path::{is_proper_prefix, parameters, relative_to, segment_count};
use crate::view::{ApiView, Resource, ResourceMethod, SecurityScheme, UriParameter};

#[derive(Debug)]
struct Node {
    path: String,
    relative_path: String,
    parent: Option<usize>,
    children: Vec<usize>,
    uri_parameters: Vec<UriParameter>,
    methods: Vec<ResourceMethod>,
}

pub(crate) fn build_view(grouping: Grouping) -> Result<ApiView, MergeError> {
    let label = grouping.label().to_string();
    let (mut nodes, roots) = arrange(&grouping.endpoints);

    for idx in pre_order(&nodes, &roots) {
        declare_parameters(&mut nodes, idx, &label)?;
    }

    let index: HashMap<String, usize> = nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| (node.path.clone(), idx))
        .collect();
    for sourced in &grouping.endpoints {
        for path in &sourced.endpoint.paths {
            if let Some(&idx) = index.get(path) {
                attach(&mut nodes, idx, sourced, &label)?;
            }
        }
    }

    let endpoints: Vec<&Endpoint> = grouping.endpoints.iter().map(|s| &s.endpoint).collect();
    let traits = declared_traits(endpoints.iter().flat_map(|e| e.traits.iter()));
    let security_schemes = collect_security(&endpoints);

    let resources: Vec<Resource> = roots.iter().map(|&idx| assemble(&mut nodes, idx)).collect();
    debug!(
        grouping = %label,
        resources = nodes.len(),
        endpoints = endpoints.len(),
        "Built API view."
    );

    let title = grouping
        .title
        .filter(|t| !t.is_empty())
        .or_else(|| grouping.id.clone())
        .unwrap_or_else(|| "API".to_string());

    Ok(ApiView {
        id: grouping.id,
        title,
        version: grouping.version.filter(|v| !v.is_empty()),
        base_path: grouping.base_path.filter(|b| !b.is_empty()),
        documentation: grouping.documentation,
        resources,
        traits,
        security_schemes,
        origins: grouping.origins,
    })
}

/// Create one node per distinct path, link each to its longest proper
/// prefix, and return the nodes with the roots in first-declared order.
fn arrange(endpoints: &[SourcedEndpoint]) -> (Vec<Node>, Vec<usize>) {
    let mut paths: Vec<&str> = Vec::new();
    for path in endpoints.iter().flat_map(|s| s.endpoint.paths.iter()) {
        if !paths.contains(&path.as_str()) {
            paths.push(path);
        }
    }

    let mut nodes: Vec<Node> = paths
        .iter()
        .map(|&path| {
            let parent = paths
                .iter()
                .enumerate()
                .filter(|(_, candidate)| is_proper_prefix(candidate, path))
                .max_by_key(|(_, candidate)| segment_count(candidate))
                .map(|(idx, _)| idx);
            let relative_path = match parent {
                Some(p) => relative_to(paths[p], path),
                None => path.to_string(),
            };
            Node {
                path: path.to_string(),
                relative_path,
                parent,
                children: Vec::new(),
                uri_parameters: Vec::new(),
                methods: Vec::new(),
            }
        })
        .collect();

    let links: Vec<Option<usize>> = nodes.iter().map(|n| n.parent).collect();
    let mut roots = Vec::new();
    for (idx, parent) in links.into_iter().enumerate() {
        match parent {
            Some(parent) => nodes[parent].children.push(idx),
            None => roots.push(idx),
        }
    }
    (nodes, roots)
}

fn pre_order(nodes: &[Node], roots: &[usize]) -> Vec<usize> {
    let mut order = Vec::with_capacity(nodes.len());
    let mut stack: Vec<usize> = roots.iter().rev().copied().collect();
    while let Some(idx) = stack.pop() {
        order.push(idx);
        stack.extend(nodes[idx].children.iter().rev());
    }
    order
}

/// Nearest node, starting at `from` and walking up, that declares `name`.
fn declaring_node(nodes: &[Node], from: Option<usize>, name: &str) -> Option<usize> {
    let mut current = from;
    while let Some(idx) = current {
        if nodes[idx].uri_parameters.iter().any(|p| p.name == name) {
            return Some(idx);
        }
        current = nodes[idx].parent;
    }
    None
}

fn declare_parameters(nodes: &mut [Node], idx: usize, grouping: &str) -> Result<(), MergeError> {
    let parent = nodes[idx].parent;
    let offset = parent.map_or(0, |p| segment_count(&nodes[p].path));

    for (name, relative_position) in parameters(&nodes[idx].relative_path) {
        let position = offset + relative_position;
        let ambiguous = |reason: String| MergeError::AmbiguousUriParameter {
            name: name.clone(),
            path: nodes[idx].path.clone(),
            grouping: grouping.to_string(),
            reason,
        };

        if let Some(owner) = declaring_node(nodes, parent, &name) {
            let declared = nodes[owner]
                .uri_parameters
                .iter()
                .find(|p| p.name == name)
                .map_or(position, |p| p.position);
            if declared != position {
                return Err(ambiguous(format!(
                    "already declared at segment {declared} by {}",
                    nodes[owner].path
                )));
            }
            continue;
        }
        if nodes[idx].uri_parameters.iter().any(|p| p.name == name) {
            return Err(ambiguous("appears more than once".to_string()));
        }

        nodes[idx].uri_parameters.push(UriParameter {
            name,
            position,
            description: None,
            allowed_values: None,
            ty: None,
        });
    }
    Ok(())
}

fn attach(
    nodes: &mut [Node],
    idx: usize,
    sourced: &SourcedEndpoint,
    grouping: &str,
) -> Result<(), MergeError> {
    let endpoint = &sourced.endpoint;
    if let Some(existing) = nodes[idx]
        .methods
        .iter()
        .find(|m| m.endpoint.method == endpoint.method)
    {
        return Err(MergeError::DuplicateOperation {
            method: endpoint.method.to_string(),
            path: nodes[idx].path.clone(),
            grouping: grouping.to_string(),
            first: existing.origin.clone(),
            second: sourced.origin.clone(),
        });
    }

    for param in &endpoint.path_params {
        match declaring_node(nodes, Some(idx), &param.name) {
            Some(owner) => document_parameter(nodes, owner, param, grouping)?,
            None => debug!(
                path = %nodes[idx].path,
                parameter = %param.name,
                "Documented path parameter does not appear in the path."
            ),
        }
    }

    nodes[idx].methods.push(ResourceMethod {
        endpoint: endpoint.clone(),
        traits: dedup_traits(endpoint.traits.iter()),
        origin: sourced.origin.clone(),
    });
    Ok(())
}

/// Fold one endpoint's documentation of a path parameter into the shared
/// declaration. The first non-empty description and type win; allowed values
/// must agree across every endpoint that states them.
fn document_parameter(
    nodes: &mut [Node],
    owner: usize,
    param: &Parameter,
    grouping: &str,
) -> Result<(), MergeError> {
    let path = nodes[owner].path.clone();
    let Some(declared) = nodes[owner]
        .uri_parameters
        .iter_mut()
        .find(|p| p.name == param.name)
    else {
        return Ok(());
    };

    if declared.description.as_deref().is_none_or(str::is_empty)
        && let Some(description) = param.description.as_ref().filter(|d| !d.is_empty())
    {
        declared.description = Some(description.clone());
    }
    if declared.ty.is_none() {
        declared.ty.clone_from(&param.ty);
    }
    if let Some(values) = param.allowed_values.as_ref().filter(|v| !v.is_empty()) {
        match &declared.allowed_values {
            None => declared.allowed_values = Some(values.clone()),
            Some(existing) if existing != values => {
                return Err(MergeError::AmbiguousUriParameter {
                    name: param.name.clone(),
                    path,
                    grouping: grouping.to_string(),
                    reason: format!(
                        "allowed values [{}] conflict with [{}]",
                        values.join(", "),
                        existing.join(", ")
                    ),
                });
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn dedup_traits<'a>(traits: impl Iterator<Item = &'a StabilityTrait>) -> Vec<StabilityTrait> {
    let mut out: Vec<StabilityTrait> = Vec::new();
    for t in traits {
        if !out.contains(t) {
            out.push(t.clone());
        }
    }
    out
}

/// View-level trait declarations: the known stability traits in their fixed
/// order, then any other trait in first-seen order.
fn declared_traits<'a>(traits: impl Iterator<Item = &'a StabilityTrait>) -> Vec<StabilityTrait> {
    let mut declared = dedup_traits(traits);
    declared.sort_by_key(|t| t.known_rank().unwrap_or(usize::MAX));
    declared
}

fn collect_security(endpoints: &[&Endpoint]) -> Vec<SecurityScheme> {
    let mut schemes: Vec<SecurityScheme> = Vec::new();
    for security in endpoints.iter().filter_map(|e| e.security.as_ref()) {
        let position = match schemes.iter().position(|s| s.name == security.scheme) {
            Some(position) => position,
            None => {
                schemes.push(SecurityScheme {
                    name: security.scheme.clone(),
                    scopes: Vec::new(),
                });
                schemes.len() - 1
            }
        };
        let scheme = &mut schemes[position];
        for scope in security.scopes() {
            if !scheme.scopes.contains(scope) {
                scheme.scopes.push(scope.clone());
            }
        }
    }
    schemes
}

fn assemble(nodes: &mut [Node], idx: usize) -> Resource {
    let children: Vec<Resource> = mem::take(&mut nodes[idx].children)
        .into_iter()
        .map(|child| assemble(nodes, child))
        .collect();
    let node = &mut nodes[idx];
    Resource {
        path: mem::take(&mut node.path),
        relative_path: mem::take(&mut node.relative_path),
        uri_parameters: mem::take(&mut node.uri_parameters),
        methods: mem::take(&mut node.methods),
        children,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use restdoc_model::{HttpMethod, SecurityRequirement, TypeNode};

    fn grouping(endpoints: Vec<Endpoint>) -> Grouping {
        Grouping {
            endpoints: endpoints
                .into_iter()
                .map(|endpoint| SourcedEndpoint {
                    origin: "Widgets.java".to_string(),
                    endpoint,
                })
                .collect(),
            ..Grouping::default()
        }
    }

    #[test]
    fn test_nested_parameter_declared_once() {
        let view = build_view(grouping(vec![
            Endpoint::new(HttpMethod::Get, "/mount/api/v1/widgets/{id1}/gizmos"),
            Endpoint::new(HttpMethod::Get, "/mount/api/v1/widgets/{id1}/gizmos/{id2}")
                .path_param(Parameter::new("id1").with_description("Widget id")),
        ]))
        .unwrap();

        assert_eq!(view.resources.len(), 1);
        let gizmos = &view.resources[0];
        assert_eq!(gizmos.path, "/mount/api/v1/widgets/{id1}/gizmos");
        assert_eq!(gizmos.uri_parameters.len(), 1);
        assert_eq!(gizmos.uri_parameters[0].name, "id1");
        assert_eq!(gizmos.uri_parameters[0].position, 4);
        assert_eq!(
            gizmos.uri_parameters[0].description.as_deref(),
            Some("Widget id")
        );

        let child = &gizmos.children[0];
        assert_eq!(child.relative_path, "/{id2}");
        let names: Vec<_> = child.uri_parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["id2"]);
        assert_eq!(child.uri_parameters[0].position, 6);
    }

    #[test]
    fn test_child_declared_before_parent_still_nests() {
        let view = build_view(grouping(vec![
            Endpoint::new(HttpMethod::Get, "/widgets/{id}"),
            Endpoint::new(HttpMethod::Get, "/widgets"),
        ]))
        .unwrap();
        assert_eq!(view.resources.len(), 1);
        assert_eq!(view.resources[0].path, "/widgets");
        assert_eq!(view.resources[0].children[0].relative_path, "/{id}");
    }

    #[test]
    fn test_parameter_at_different_position_is_ambiguous() {
        let err = build_view(grouping(vec![
            Endpoint::new(HttpMethod::Get, "/{id}"),
            Endpoint::new(HttpMethod::Get, "/{id}/parts/{id}"),
        ]))
        .unwrap_err();
        assert!(matches!(err, MergeError::AmbiguousUriParameter { ref name, .. } if name == "id"));
    }

    #[test]
    fn test_conflicting_allowed_values_are_ambiguous() {
        let err = build_view(grouping(vec![
            Endpoint::new(HttpMethod::Get, "/colors/{color}")
                .path_param(Parameter::new("color").with_type(TypeNode::enumeration("Color", ["RED", "GREEN"]))),
            Endpoint::new(HttpMethod::Put, "/colors/{color}")
                .path_param(Parameter::new("color").with_type(TypeNode::enumeration("Shade", ["DARK"]))),
        ]))
        .unwrap_err();
        assert!(matches!(err, MergeError::AmbiguousUriParameter { .. }));
    }

    #[test]
    fn test_duplicate_operation() {
        let err = build_view(grouping(vec![
            Endpoint::new(HttpMethod::Get, "/widgets"),
            Endpoint::new(HttpMethod::Post, "/widgets"),
            Endpoint::new(HttpMethod::Get, "/widgets"),
        ]))
        .unwrap_err();
        assert!(matches!(err, MergeError::DuplicateOperation { ref method, .. } if method == "GET"));
    }

    #[test]
    fn test_multi_mount_endpoint_appears_on_each_resource() {
        let view = build_view(grouping(vec![
            Endpoint::new(HttpMethod::Get, "/mount/api/v1/voidreturn")
                .mounted_at("/mount/api/v1/voidreturn2"),
        ]))
        .unwrap();
        assert_eq!(view.resources.len(), 2);
        assert_eq!(view.method_count(), 2);
    }

    #[test]
    fn test_traits_and_security_resolution() {
        let view = build_view(grouping(vec![
            Endpoint::new(HttpMethod::Get, "/experimentaldeprecated3")
                .stability("experimental")
                .stability("deprecated")
                .stability("experimental"),
            Endpoint::new(HttpMethod::Get, "/deprecated2")
                .stability("deprecated")
                .secured_by(SecurityRequirement::oauth2(["svc:read"])),
            Endpoint::new(HttpMethod::Post, "/deprecated2")
                .secured_by(SecurityRequirement::oauth2(["svc:write", "svc:read"])),
        ]))
        .unwrap();

        assert_eq!(
            view.traits,
            vec![StabilityTrait::experimental(), StabilityTrait::deprecated()]
        );
        let methods = &view.resources[0].methods;
        assert_eq!(
            methods[0].traits,
            vec![StabilityTrait::experimental(), StabilityTrait::deprecated()]
        );
        assert_eq!(view.security_schemes.len(), 1);
        assert_eq!(view.security_schemes[0].scopes, vec!["svc:read", "svc:write"]);
    }

    #[test]
    fn test_known_traits_are_declared_first() {
        let view = build_view(grouping(vec![
            Endpoint::new(HttpMethod::Get, "/stable1"),
            Endpoint::new(HttpMethod::Get, "/beta1").stability("beta"),
            Endpoint::new(HttpMethod::Get, "/deprecated2").stability("deprecated"),
            Endpoint::new(HttpMethod::Get, "/experimentaldeprecated3")
                .stability("deprecated")
                .stability("experimental"),
            Endpoint::new(HttpMethod::Get, "/internal1").stability("internal"),
        ]))
        .unwrap();

        let declared: Vec<_> = view.traits.iter().map(StabilityTrait::name).collect();
        assert_eq!(declared, vec!["experimental", "deprecated", "beta", "internal"]);
        let method = &view.resource("/experimentaldeprecated3").unwrap().methods[0];
        assert_eq!(
            method.traits,
            vec![StabilityTrait::deprecated(), StabilityTrait::experimental()]
        );
    }

    #[test]
    fn test_title_falls_back_to_id() {
        let mut g = grouping(vec![Endpoint::new(HttpMethod::Get, "/a")]);
        g.id = Some("Ultimate".to_string());
        assert_eq!(build_view(g).unwrap().title, "Ultimate");
        assert_eq!(
            build_view(grouping(vec![Endpoint::new(HttpMethod::Get, "/a")]))
                .unwrap()
                .title,
            "API"
        );
    }
}
