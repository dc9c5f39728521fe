//! Documentation assembly engine.
//!
//! Fragments produced by extraction are merged into one [`ApiView`] per API
//! grouping, and each view is rendered once per requested output format.
//!
//! ## Module Structure
//!
//! - `template`: `${name}` placeholder substitution
//! - `path`: URI template normalization and parameter tokens
//! - `merge`: the fragment-to-view pipeline
//! - `view`: render-ready resource trees
//! - `render`: the `Renderer` boundary and the built-in formats
//! - `assemble`: artifact naming and fan-out

pub mod assemble;
mod error;
pub mod merge;
pub mod path;
pub mod render;
mod template;
mod view;

pub use assemble::{Artifact, Assembler, AssemblyRequest, artifact_name};
pub use error::{AssembleError, MergeError, RenderError};
pub use merge::{ExclusionSet, MergeOptions, merge};
pub use render::{Renderer, RendererRegistry};
pub use template::{TemplateValues, UnresolvedPlaceholder};
pub use view::{ApiView, Resource, ResourceMethod, SecurityScheme, UriParameter};
