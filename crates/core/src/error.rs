use restdoc_model::ModelError;
use thiserror::Error;

/// Fatal errors raised while merging fragments into views.
#[derive(Debug, Error)]
pub enum MergeError {
    /// A `${name}` placeholder has no value.
    #[error("unresolved placeholder ${{{placeholder}}} in {field} of grouping {grouping}")]
    UnresolvedTemplatePlaceholder {
        /// Placeholder name.
        placeholder: String,
        /// Grouping being substituted.
        grouping: String,
        /// Field holding the placeholder.
        field: String,
    },

    /// One URI parameter name is described in incompatible ways.
    #[error("URI parameter {name} is declared inconsistently in {path} of grouping {grouping}: {reason}")]
    AmbiguousUriParameter {
        /// Parameter name.
        name: String,
        /// Path where the conflict surfaced.
        path: String,
        /// Grouping being merged.
        grouping: String,
        /// What disagrees.
        reason: String,
    },

    /// The same method is mounted twice on one path.
    #[error("{method} {path} is documented twice in grouping {grouping} ({first} and {second})")]
    DuplicateOperation {
        /// HTTP method.
        method: String,
        /// Normalized path.
        path: String,
        /// Grouping being merged.
        grouping: String,
        /// Origin of the first declaration.
        first: String,
        /// Origin of the second declaration.
        second: String,
    },

    /// An exclusion pattern is not a valid regular expression.
    #[error("invalid exclusion pattern {pattern}: {source}")]
    InvalidExclusionPattern {
        /// Pattern as supplied.
        pattern: String,
        /// Compilation error.
        #[source]
        source: regex::Error,
    },
}

/// Failure to produce a single artifact. Other artifacts of the same run are
/// unaffected.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The HTML template failed.
    #[error("template rendering failed: {0}")]
    Template(#[from] tera::Error),

    /// A structured document could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for RenderError {
    fn from(err: serde_json::Error) -> Self {
        RenderError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for RenderError {
    fn from(err: serde_yaml::Error) -> Self {
        RenderError::Serialization(err.to_string())
    }
}

/// Errors that abort an assembly run before any artifact is produced.
#[derive(Debug, Error)]
pub enum AssembleError {
    /// Merging failed.
    #[error(transparent)]
    Merge(#[from] MergeError),

    /// Fragments could not be loaded.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// No renderer is registered for the format.
    #[error("unknown output format {format} (available: {available})")]
    UnknownFormat {
        /// Requested format.
        format: String,
        /// Registered formats, comma-separated.
        available: String,
    },

    /// Two views map to the same artifact file name.
    #[error("artifact name {name} is shared by groupings {first} and {second}")]
    DuplicateArtifactName {
        /// Colliding file name.
        name: String,
        /// Label of the first grouping.
        first: String,
        /// Label of the second grouping.
        second: String,
    },
}
