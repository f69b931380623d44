//! Error types for schema binding, encoding and decoding.

use thiserror::Error;

/// The ABI could not be turned into a usable schema, or a call does not fit it.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("abi is required")]
    MissingAbi,

    #[error("failed to parse abi: {reason}")]
    InvalidJson { reason: String },

    #[error("abi declares no functions")]
    NoFunctions,

    #[error("function '{function}' not found in abi")]
    UnknownFunction { function: String },

    #[error("'{function}' returns {expected} values but the output record has {got} fields")]
    OutputArity {
        function: String,
        expected: usize,
        got: usize,
    },
}

/// Inputs could not be encoded for the named function.
#[derive(Debug, Error)]
pub enum PackError {
    #[error("function '{function}' not found in abi")]
    UnknownFunction { function: String },

    #[error("'{function}' takes {expected} arguments, got {got}")]
    ArgumentCount {
        function: String,
        expected: usize,
        got: usize,
    },

    #[error("'{function}' argument {index}: expected {expected}: {reason}")]
    ArgumentType {
        function: String,
        index: usize,
        expected: String,
        reason: String,
    },

    #[error("failed to encode '{function}' inputs: {reason}")]
    Encode { function: String, reason: String },
}

/// Return data could not be decoded into the named function's outputs.
#[derive(Debug, Error)]
pub enum UnpackError {
    #[error("function '{function}' not found in abi")]
    UnknownFunction { function: String },

    #[error("failed to unpack '{function}' outputs: {reason}")]
    Malformed { function: String, reason: String },

    #[error("failed to unpack '{function}' outputs: {source}")]
    Record {
        function: String,
        #[source]
        source: RecordError,
    },
}

/// Decoded values do not fit an output record.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("expected {expected} values, got {got}")]
    FieldCount { expected: usize, got: usize },

    #[error("field {index}: {source}")]
    Field {
        index: usize,
        #[source]
        source: ConvertError,
    },
}

/// A single decoded value cannot become the requested Rust type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected}, got {got}")]
pub struct ConvertError {
    pub expected: String,
    pub got: String,
}

impl ConvertError {
    pub fn new(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
            got: got.into(),
        }
    }
}
