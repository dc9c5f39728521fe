//! Serializable shape of values exchanged by an endpoint.
//!
//! A [`TypeNode`] is a finite tree. Genuine recursion in the underlying type is
//! cut with a [`TypeNode::Reference`] pointing back at an ancestor that is still
//! being expanded, so every graph can be walked without cycle bookkeeping.

use serde::{Deserialize, Serialize};

/// Label used in reference paths for the element slot of a container.
pub const ELEMENT_LABEL: &str = "[]";

/// Kind of a container node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    /// Fixed-size array.
    Array,
    /// Ordered sequence.
    List,
    /// Unordered collection of distinct elements.
    Set,
    /// String-keyed map; the element is the value type.
    Map,
}

impl ContainerKind {
    /// Lower-case name used in type names.
    pub fn as_str(self) -> &'static str {
        match self {
            ContainerKind::Array => "array",
            ContainerKind::List => "list",
            ContainerKind::Set => "set",
            ContainerKind::Map => "map",
        }
    }

    /// Whether the container is keyed.
    pub fn is_map(self) -> bool {
        matches!(self, ContainerKind::Map)
    }
}

/// A named member of an object node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Serialized member name.
    pub name: String,
    /// Member type.
    #[serde(rename = "type")]
    pub ty: TypeNode,
}

impl Field {
    /// Field `name` of type `ty`.
    pub fn new(name: impl Into<String>, ty: TypeNode) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Recursive description of a value's serializable shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeNode {
    /// Atomic value: `string`, `integer`, `uuid`, ...
    Primitive {
        /// Primitive type name.
        name: String,
    },
    /// Structured value with ordered fields.
    Object {
        /// Type name.
        name: String,
        /// Members in declaration order.
        fields: Vec<Field>,
    },
    /// List, array, set or map of a single element type.
    Container {
        /// Container kind.
        container: ContainerKind,
        /// Element type; the value type for maps.
        element: Box<TypeNode>,
    },
    /// Closed set of string literals, in declaration order.
    Enumeration {
        /// Type name.
        name: String,
        /// Allowed literals.
        literals: Vec<String>,
    },
    /// Back-reference to the nearest enclosing ancestor with identity `target`.
    Reference {
        /// Name of the referenced ancestor type.
        target: String,
        /// Field labels leading from the graph root to that ancestor; the
        /// root itself has an empty path.
        path: Vec<String>,
    },
}

impl TypeNode {
    /// Primitive node named `name`.
    pub fn primitive(name: impl Into<String>) -> Self {
        TypeNode::Primitive { name: name.into() }
    }

    /// Object node with `fields` in order.
    pub fn object(name: impl Into<String>, fields: Vec<Field>) -> Self {
        TypeNode::Object {
            name: name.into(),
            fields,
        }
    }

    /// Container node around `element`.
    pub fn container(container: ContainerKind, element: TypeNode) -> Self {
        TypeNode::Container {
            container,
            element: Box::new(element),
        }
    }

    /// Enumeration node with `literals` in order.
    pub fn enumeration<I, S>(name: impl Into<String>, literals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TypeNode::Enumeration {
            name: name.into(),
            literals: literals.into_iter().map(Into::into).collect(),
        }
    }

    /// Human-readable name of the node's type.
    pub fn type_name(&self) -> String {
        match self {
            TypeNode::Primitive { name }
            | TypeNode::Object { name, .. }
            | TypeNode::Enumeration { name, .. } => name.clone(),
            TypeNode::Container { container, element } => {
                format!("{}<{}>", container.as_str(), element.type_name())
            }
            TypeNode::Reference { target, .. } => target.clone(),
        }
    }

    /// All reference nodes in pre-order.
    pub fn references(&self) -> Vec<&TypeNode> {
        let mut found = Vec::new();
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            match node {
                TypeNode::Reference { .. } => found.push(node),
                TypeNode::Object { fields, .. } => {
                    pending.extend(fields.iter().rev().map(|f| &f.ty));
                }
                TypeNode::Container { element, .. } => pending.push(element),
                TypeNode::Primitive { .. } | TypeNode::Enumeration { .. } => {}
            }
        }
        found
    }

    /// Whether any descendant is a [`TypeNode::Reference`].
    pub fn contains_reference(&self) -> bool {
        !self.references().is_empty()
    }

    /// Walk a reference path from this node, returning the node it designates.
    pub fn resolve_path(&self, path: &[String]) -> Option<&TypeNode> {
        let mut current = self;
        for label in path {
            current = match current {
                TypeNode::Object { fields, .. } => {
                    &fields.iter().find(|f| &f.name == label)?.ty
                }
                TypeNode::Container { element, .. } if label == ELEMENT_LABEL => element,
                _ => return None,
            };
        }
        Some(current)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn tree() -> TypeNode {
        TypeNode::object(
            "Tree",
            vec![
                Field::new("value", TypeNode::primitive("string")),
                Field::new(
                    "children",
                    TypeNode::container(
                        ContainerKind::List,
                        TypeNode::Reference {
                            target: "Tree".into(),
                            path: vec![],
                        },
                    ),
                ),
            ],
        )
    }

    #[test]
    fn test_type_name() {
        let ty = TypeNode::container(ContainerKind::List, TypeNode::primitive("uuid"));
        assert_eq!(ty.type_name(), "list<uuid>");
        assert_eq!(tree().type_name(), "Tree");
    }

    #[test]
    fn test_references_found_in_nested_container() {
        let root = tree();
        let refs = root.references();
        assert_eq!(refs.len(), 1);
        assert!(matches!(refs[0], TypeNode::Reference { target, .. } if target == "Tree"));
    }

    #[test]
    fn test_resolve_path() {
        let root = tree();
        assert_eq!(root.resolve_path(&[]), Some(&root));
        let element = root
            .resolve_path(&["children".to_string(), ELEMENT_LABEL.to_string()])
            .map(TypeNode::type_name);
        assert_eq!(element.as_deref(), Some("Tree"));
        assert!(root.resolve_path(&["missing".to_string()]).is_none());
    }

    #[test]
    fn test_serde_tagging() {
        let json = serde_json::to_value(TypeNode::primitive("string")).unwrap();
        assert_eq!(json["kind"], "primitive");
        assert_eq!(json["name"], "string");

        let back: TypeNode = serde_json::from_value(serde_json::json!({
            "kind": "container",
            "container": "map",
            "element": { "kind": "primitive", "name": "integer" }
        }))
        .unwrap();
        assert_eq!(back.type_name(), "map<integer>");
    }
}
