//! chaincall-rpc: the JSON-RPC plumbing underneath chaincall.
//!
//! # Overview
//!
//! Multicall batching only needs one RPC method (`eth_call`), so this crate
//! keeps the transport layer small:
//!
//! - [`RpcTransport`]: the async trait every transport implements
//! - [`JsonRpcRequest`] / [`JsonRpcResponse`]: wire types
//! - [`TransportError`]: structured error type
//! - [`HttpRpcClient`]: `reqwest`-backed HTTP transport
//! - [`connect`]: validate an endpoint URL and open an HTTP transport

pub mod error;
pub mod http;
pub mod request;
pub mod transport;

pub use error::TransportError;
pub use http::{connect, connect_with, HttpClientConfig, HttpRpcClient};
pub use request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId, RpcParam};
pub use transport::RpcTransport;
