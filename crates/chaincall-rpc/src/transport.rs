//! The `RpcTransport` trait, the seam between chaincall and the network.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::TransportError;
use crate::request::{JsonRpcRequest, JsonRpcResponse};

/// The async trait every RPC transport must implement.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` for use across Tokio tasks.
///
/// # Object Safety
/// The trait is object-safe and can be stored as `Arc<dyn RpcTransport>`.
#[async_trait]
pub trait RpcTransport: Send + Sync + 'static {
    /// Send a single JSON-RPC request and return the response.
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError>;

    /// Return the transport's identifier (URL or name).
    fn url(&self) -> &str;

    /// Convenience: call a method and deserialize the result.
    async fn call<T: DeserializeOwned>(
        &self,
        id: u64,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, TransportError>
    where
        Self: Sized,
    {
        let req = JsonRpcRequest::new(id, method, params);
        let resp = self.send(req).await?;
        let result = resp.into_result().map_err(TransportError::Rpc)?;
        serde_json::from_value(result).map_err(TransportError::Deserialization)
    }
}

#[async_trait]
impl<T: RpcTransport + ?Sized> RpcTransport for std::sync::Arc<T> {
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        (**self).send(req).await
    }

    fn url(&self) -> &str {
        (**self).url()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{JsonRpcError, RpcId};
    use std::sync::Arc;

    struct MockTransport {
        revert: bool,
    }

    #[async_trait]
    impl RpcTransport for MockTransport {
        async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
            if self.revert {
                Ok(JsonRpcResponse::failure(
                    req.id,
                    JsonRpcError {
                        code: 3,
                        message: "execution reverted".into(),
                        data: None,
                    },
                ))
            } else {
                Ok(JsonRpcResponse::success(req.id, Value::String("0xabcd".into())))
            }
        }

        fn url(&self) -> &str {
            "mock://node"
        }
    }

    #[tokio::test]
    async fn call_deserializes_result() {
        let t = MockTransport { revert: false };
        let out: String = t.call(1, "eth_call", vec![]).await.unwrap();
        assert_eq!(out, "0xabcd");
    }

    #[tokio::test]
    async fn call_maps_node_error() {
        let t = MockTransport { revert: true };
        let err = t.call::<String>(1, "eth_call", vec![]).await.unwrap_err();
        assert!(err.is_execution_error());
    }

    #[tokio::test]
    async fn arc_dyn_transport_forwards() {
        let t: Arc<dyn RpcTransport> = Arc::new(MockTransport { revert: false });
        let resp = t.send(JsonRpcRequest::new(9, "eth_call", vec![])).await.unwrap();
        assert_eq!(resp.id, RpcId::Number(9));
        assert_eq!(t.url(), "mock://node");
    }
}
