//! Intermediate representation of documented REST APIs.
//!
//! Extraction produces one [`Fragment`] per compiled source unit. A fragment
//! owns [`ApiGrouping`]s, which own [`Endpoint`]s, whose parameters and bodies
//! are described by [`TypeNode`] graphs built with [`TypeRegistry`].
//!
//! ## Module Structure
//!
//! - `types`: the recursive `TypeNode` shape
//! - `graph`: cycle-safe construction of `TypeNode`s from type descriptors
//! - `endpoint`: methods, parameters, scopes, stability traits, security
//! - `fragment`: groupings and the per-unit fragment container

mod endpoint;
mod error;
mod fragment;
mod graph;
mod types;

pub use endpoint::{
    Endpoint, HttpMethod, Parameter, Scope, SecurityRequirement, StabilityTrait,
};
pub use error::ModelError;
pub use fragment::{ApiGrouping, DocumentationItem, Fragment};
pub use graph::{TypeDescriptor, TypeGraphBuilder, TypeId, TypeRegistry, TypeShape};
pub use types::{ContainerKind, ELEMENT_LABEL, Field, TypeNode};
