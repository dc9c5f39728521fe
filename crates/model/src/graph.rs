//! Type-graph construction from registered type descriptors.
//!
//! The builder walks descriptors with an explicit stack of the identities that
//! are currently being expanded. Cycle detection only consults that stack, so a
//! type reused in two unrelated places is expanded twice, while a type that
//! reaches itself is cut with a [`TypeNode::Reference`].

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::ModelError;
use crate::types::{ContainerKind, ELEMENT_LABEL, Field, TypeNode};

/// Identity of a described type (usually its fully qualified name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(String);

impl TypeId {
    /// Identity from a type name.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identity as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Structural shape of a described type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeShape {
    /// Primitive rendered under the given name.
    Scalar(String),
    /// Visible members in declaration order.
    Object(Vec<(String, TypeId)>),
    /// Collection of the element type.
    Container(ContainerKind, TypeId),
    /// Literals in declaration order.
    Enumeration(Vec<String>),
}

/// A type as seen by extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// Identity used for cycle detection.
    pub id: TypeId,
    /// Display name used in rendered output.
    pub name: String,
    /// Structure of the type.
    pub shape: TypeShape,
}

/// All type descriptors known to one extraction run.
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    types: HashMap<TypeId, TypeDescriptor>,
    atomic: HashMap<TypeId, String>,
}

impl TypeRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `descriptor`, replacing any previous one with the same id.
    pub fn insert(&mut self, descriptor: TypeDescriptor) -> &mut Self {
        self.types.insert(descriptor.id.clone(), descriptor);
        self
    }

    /// Register a scalar rendered as the primitive `name`.
    pub fn scalar(&mut self, id: &str, name: &str) -> &mut Self {
        self.insert(TypeDescriptor {
            id: TypeId::new(id),
            name: name.to_string(),
            shape: TypeShape::Scalar(name.to_string()),
        })
    }

    /// Register an object with `(field, type id)` members in order.
    pub fn object(&mut self, id: &str, members: &[(&str, &str)]) -> &mut Self {
        let members = members
            .iter()
            .map(|(field, ty)| ((*field).to_string(), TypeId::new(*ty)))
            .collect();
        self.insert(TypeDescriptor {
            id: TypeId::new(id),
            name: short_name(id).to_string(),
            shape: TypeShape::Object(members),
        })
    }

    /// Register a container of `element`.
    pub fn container(&mut self, id: &str, kind: ContainerKind, element: &str) -> &mut Self {
        self.insert(TypeDescriptor {
            id: TypeId::new(id),
            name: short_name(id).to_string(),
            shape: TypeShape::Container(kind, TypeId::new(element)),
        })
    }

    /// Register an enumeration of `literals`.
    pub fn enumeration(&mut self, id: &str, literals: &[&str]) -> &mut Self {
        self.insert(TypeDescriptor {
            id: TypeId::new(id),
            name: short_name(id).to_string(),
            shape: TypeShape::Enumeration(literals.iter().map(|l| (*l).to_string()).collect()),
        })
    }

    /// Treat `id` as an atomic value rendered as the primitive `primitive`,
    /// whatever members its descriptor exposes.
    pub fn mark_atomic(&mut self, id: &str, primitive: &str) -> &mut Self {
        self.atomic.insert(TypeId::new(id), primitive.to_string());
        self
    }

    /// Descriptor registered under `id`.
    pub fn get(&self, id: &TypeId) -> Option<&TypeDescriptor> {
        self.types.get(id)
    }

    /// Whether `id` was marked atomic.
    pub fn is_atomic(&self, id: &TypeId) -> bool {
        self.atomic.contains_key(id)
    }

    /// Expand the graph rooted at `root`.
    pub fn build(&self, root: &TypeId) -> Result<TypeNode, ModelError> {
        TypeGraphBuilder::new(self).build(root)
    }
}

fn short_name(id: &str) -> &str {
    id.rsplit(['.', ':']).next().unwrap_or(id)
}

/// Expands registered descriptors into [`TypeNode`] trees.
#[derive(Debug, Clone, Copy)]
pub struct TypeGraphBuilder<'a> {
    registry: &'a TypeRegistry,
}

/// A type whose members are still being expanded.
#[derive(Debug)]
struct Frame<'a> {
    identity: &'a TypeId,
    name: &'a str,
    /// Label of the slot this frame fills in its parent; `None` for the root.
    label: Option<String>,
    state: FrameState<'a>,
}

#[derive(Debug)]
enum FrameState<'a> {
    Object {
        members: std::slice::Iter<'a, (String, TypeId)>,
        pending: Option<String>,
        fields: Vec<Field>,
    },
    Container {
        container: ContainerKind,
        element: &'a TypeId,
        opened: bool,
        node: Option<TypeNode>,
    },
}

impl<'a> Frame<'a> {
    fn next_member(&mut self) -> Option<(&'a TypeId, String)> {
        match &mut self.state {
            FrameState::Object {
                members, pending, ..
            } => {
                let (field, ty) = members.next()?;
                *pending = Some(field.clone());
                Some((ty, field.clone()))
            }
            FrameState::Container {
                element, opened, ..
            } => {
                if *opened {
                    return None;
                }
                *opened = true;
                Some((*element, ELEMENT_LABEL.to_string()))
            }
        }
    }

    fn accept(&mut self, child: TypeNode) {
        match &mut self.state {
            FrameState::Object {
                pending, fields, ..
            } => {
                let name = pending.take().unwrap_or_default();
                fields.push(Field::new(name, child));
            }
            FrameState::Container { node, .. } => *node = Some(child),
        }
    }

    fn finish(self) -> TypeNode {
        match self.state {
            FrameState::Object { fields, .. } => TypeNode::object(self.name, fields),
            FrameState::Container {
                container, node, ..
            } => {
                let element = node.unwrap_or_else(|| TypeNode::primitive("unknown"));
                TypeNode::container(container, element)
            }
        }
    }
}

enum Opened<'a> {
    Leaf(TypeNode),
    Frame(Frame<'a>),
}

impl<'a> TypeGraphBuilder<'a> {
    /// Builder over `registry`.
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self { registry }
    }

    /// Expand `root` into a finite tree, cutting cycles at the nearest ancestor
    /// with the same identity.
    pub fn build(&self, root: &'a TypeId) -> Result<TypeNode, ModelError> {
        let mut stack: Vec<Frame<'a>> = Vec::new();
        let mut built = None;
        let mut next = Some((root, None));

        while built.is_none() {
            if let Some((id, label)) = next.take() {
                match self.open(id, label, &stack)? {
                    Opened::Leaf(node) => built = settle(&mut stack, node),
                    Opened::Frame(frame) => stack.push(frame),
                }
                continue;
            }
            match stack.last_mut().and_then(|top| top.next_member()) {
                Some((id, label)) => next = Some((id, Some(label))),
                None => match stack.pop() {
                    Some(frame) => built = settle(&mut stack, frame.finish()),
                    None => break,
                },
            }
        }

        built.ok_or_else(|| ModelError::UnknownType {
            id: root.to_string(),
        })
    }

    fn open(
        &self,
        id: &'a TypeId,
        label: Option<String>,
        stack: &[Frame<'a>],
    ) -> Result<Opened<'a>, ModelError> {
        if let Some(depth) = stack.iter().rposition(|frame| frame.identity == id) {
            let path = stack[..=depth]
                .iter()
                .filter_map(|frame| frame.label.clone())
                .collect();
            trace!(type_id = %id, depth, "Cycle closed with a back-reference.");
            return Ok(Opened::Leaf(TypeNode::Reference {
                target: stack[depth].name.to_string(),
                path,
            }));
        }

        if let Some(primitive) = self.registry.atomic.get(id) {
            return Ok(Opened::Leaf(TypeNode::primitive(primitive.clone())));
        }

        let descriptor = self
            .registry
            .get(id)
            .ok_or_else(|| ModelError::UnknownType { id: id.to_string() })?;

        let state = match &descriptor.shape {
            TypeShape::Scalar(name) => return Ok(Opened::Leaf(TypeNode::primitive(name.clone()))),
            TypeShape::Enumeration(literals) => {
                return Ok(Opened::Leaf(TypeNode::enumeration(
                    descriptor.name.clone(),
                    literals.iter().cloned(),
                )));
            }
            TypeShape::Object(members) => FrameState::Object {
                members: members.iter(),
                pending: None,
                fields: Vec::with_capacity(members.len()),
            },
            TypeShape::Container(container, element) => FrameState::Container {
                container: *container,
                element,
                opened: false,
                node: None,
            },
        };

        Ok(Opened::Frame(Frame {
            identity: &descriptor.id,
            name: &descriptor.name,
            label,
            state,
        }))
    }
}

/// Hand a finished node to its parent frame, or return it when it is the root.
fn settle(stack: &mut [Frame<'_>], node: TypeNode) -> Option<TypeNode> {
    match stack.last_mut() {
        Some(parent) => {
            parent.accept(node);
            None
        }
        None => Some(node),
    }
}
