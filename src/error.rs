use thiserror::Error;

/// Failure to turn a qualified type name into a descriptor, or to construct
/// a descriptor through the catalog.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("malformed type name `{input}`: {reason}")]
    Malformed { input: String, reason: String },

    #[error("unknown type `{0}`")]
    UnknownType(String),

    #[error("`{name}` takes {expected} type arguments but {supplied} were supplied")]
    Arity {
        name: String,
        expected: usize,
        supplied: usize,
    },

    #[error("`{0}` is not a generic type definition")]
    NotGeneric(String),
}

/// Failure of an apply/unapply step of the algebra.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SketchError {
    /// Too many or too few arguments for the free parameter slots.
    #[error("`{name}` has {expected} free parameter slots but {supplied} arguments were supplied")]
    ArityMismatch {
        name: String,
        expected: usize,
        supplied: usize,
    },

    #[error("`{name}` has no free type parameters")]
    NotGeneric { name: String },

    #[error(transparent)]
    Catalog(#[from] ResolveError),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid catalog json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid catalog: {0}")]
    Schema(String),

    #[error("type `{0}` is already defined")]
    Duplicate(String),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}
