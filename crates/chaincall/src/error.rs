//! Error type for multicall dispatch.

use chaincall_abi::{PackError, SchemaError, UnpackError};
use chaincall_rpc::TransportError;
use thiserror::Error;

/// Errors returned by [`Caller`](crate::Caller).
///
/// Indices are positions in the slice handed to the failing dispatch; for
/// [`CallError::Chunk`] that is the chunk, and `offset` maps it back to the
/// full call list.
#[derive(Debug, Error)]
pub enum CallError {
    /// A call could not be encoded. Nothing was sent.
    #[error("failed to pack call inputs at index [{index}]: {source}")]
    Pack {
        index: usize,
        #[source]
        source: PackError,
    },

    /// The aggregate call itself failed: transport error, or a revert caused
    /// by a call that was not allowed to fail.
    #[error("multicall failed: {0}")]
    Aggregate(#[source] TransportError),

    /// The aggregator broke the one-result-per-call contract.
    #[error("multicall returned {got} results for {expected} calls")]
    ResultCount { expected: usize, got: usize },

    /// A successful call's return data did not fit its output record.
    #[error("failed to unpack call outputs at index [{index}]: {source}")]
    Unpack {
        index: usize,
        #[source]
        source: UnpackError,
    },

    /// One chunk of a chunked dispatch failed; no call was updated.
    #[error("call chunk [{chunk}] (calls from index {offset}) failed: {source}")]
    Chunk {
        chunk: usize,
        offset: usize,
        #[source]
        source: Box<CallError>,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("failed to connect: {0}")]
    Connect(#[source] TransportError),

    #[error("invalid caller configuration: {0}")]
    Config(String),
}

impl CallError {
    /// Index of the offending call in the caller's full list, if the error
    /// points at a single call.
    pub fn call_index(&self) -> Option<usize> {
        match self {
            Self::Pack { index, .. } | Self::Unpack { index, .. } => Some(*index),
            Self::Chunk { offset, source, .. } => source.call_index().map(|i| offset + i),
            _ => None,
        }
    }
}
