use std::{
    error::Error,
    fmt::{self, Display},
};

/// The result type used in the entire crate.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The crate's error type.
#[derive(Debug)]
pub enum MlErr {
    /// The operands of a matrix operation have incompatible dimensions.
    ShapeMismatch {
        /// The operation or container that rejected its operands.
        what: &'static str,
        /// The observed `(rows, cols)`.
        got: (usize, usize),
        /// The `(rows, cols)` the operation required.
        expected: (usize, usize),
    },
    /// A `StackedMatrix` was built out of zero matrices.
    EmptyStack,
    /// A configuration value failed validation.
    InvalidConfig(String),
    /// A configuration or layer state could not be (de)serialized.
    Json(serde_json::Error),
}

impl MlErr {
    pub(crate) fn shape(what: &'static str, got: (usize, usize), expected: (usize, usize)) -> Self {
        Self::ShapeMismatch {
            what,
            got,
            expected,
        }
    }

    /// Whether this error is a `ShapeMismatch`.
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(self, Self::ShapeMismatch { .. })
    }
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::ShapeMismatch {
                what,
                got: (gr, gc),
                expected: (er, ec),
            } => write!(
                f,
                "There's a shape mismatch in {what}, got ({gr}, {gc}) and expected ({er}, {ec})"
            ),
            MlErr::EmptyStack => write!(f, "A stacked matrix needs at least one matrix"),
            MlErr::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            MlErr::Json(e) => write!(f, "json error: {e}"),
        }
    }
}

impl Error for MlErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MlErr::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for MlErr {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}
