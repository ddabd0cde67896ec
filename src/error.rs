use thiserror::Error;

/// Error types for the bindfit-rs library.
#[derive(Error, Debug)]
pub enum FitError {
    /// Error indicating a mismatch in table or vector dimensions.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Fewer active residuals than free parameters.
    #[error("Underdetermined system: {residuals} active residuals for {parameters} free parameters")]
    UnderdeterminedSystem { residuals: usize, parameters: usize },

    /// Residuals or statistics evaluated to NaN or infinity.
    #[error("Non-finite value: {0}")]
    NonFinite(String),

    /// Error indicating a singular matrix was encountered.
    #[error("Singular matrix encountered")]
    SingularMatrix,

    /// Error indicating the algorithm failed to converge.
    #[error("Algorithm failed to converge: {0}")]
    ConvergenceFailure(String),

    /// Error for invalid parameter values or indices.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Invalid input data.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Structurally invalid job descriptor.
    #[error("Invalid job: {0}")]
    InvalidJob(String),

    /// Model id not known to the factory.
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// Failure inside a statistical distribution.
    #[error("Statistics error: {0}")]
    Statistics(String),

    /// I/O error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for cases that don't fit the other categories.
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for bindfit-rs operations.
pub type Result<T> = std::result::Result<T, FitError>;

impl From<String> for FitError {
    fn from(s: String) -> Self {
        FitError::Other(s)
    }
}

impl From<&str> for FitError {
    fn from(s: &str) -> Self {
        FitError::Other(s.to_string())
    }
}
