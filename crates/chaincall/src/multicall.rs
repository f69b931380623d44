//! The remote side of a batch: the `Aggregator` trait and its Multicall3
//! implementation over JSON-RPC `eth_call`.
//!
//! # How it works
//! - Every call becomes a `(target, allowFailure, callData)` tuple
//! - The tuples are ABI-encoded as `aggregate3((address,bool,bytes)[])`
//! - One `eth_call` to the Multicall3 contract executes them all
//! - The result decodes as `(bool success, bytes returnData)[]`, one entry per
//!   call, in request order

use std::sync::atomic::{AtomicU64, Ordering};

use alloy_primitives::{address, Address, Bytes, B256};
use async_trait::async_trait;
use chaincall_abi::{AbiSchema, DynSolValue, FromAbiValue, SchemaError};
use chaincall_rpc::{RpcTransport, TransportError};
use serde_json::{json, Value};

/// Multicall3 is deployed at the same address on most EVM chains.
/// See <https://github.com/mds1/multicall>.
pub const DEFAULT_MULTICALL3_ADDRESS: &str = "0xcA11bde05977b3631167028862bE2a173976CA11";

/// [`DEFAULT_MULTICALL3_ADDRESS`] as an [`Address`].
pub const MULTICALL3_ADDRESS: Address = address!("cA11bde05977b3631167028862bE2a173976CA11");

const MULTICALL3_ABI: &str = r#"[
    {
        "type": "function",
        "name": "aggregate3",
        "stateMutability": "payable",
        "inputs": [
            {
                "name": "calls",
                "type": "tuple[]",
                "internalType": "struct Multicall3.Call3[]",
                "components": [
                    {"name": "target", "type": "address", "internalType": "address"},
                    {"name": "allowFailure", "type": "bool", "internalType": "bool"},
                    {"name": "callData", "type": "bytes", "internalType": "bytes"}
                ]
            }
        ],
        "outputs": [
            {
                "name": "returnData",
                "type": "tuple[]",
                "internalType": "struct Multicall3.Result[]",
                "components": [
                    {"name": "success", "type": "bool", "internalType": "bool"},
                    {"name": "returnData", "type": "bytes", "internalType": "bytes"}
                ]
            }
        ]
    }
]"#;

/// One entry of an `aggregate3` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call3 {
    pub target: Address,
    pub allow_failure: bool,
    pub call_data: Bytes,
}

/// One entry of an `aggregate3` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call3Result {
    pub success: bool,
    pub return_data: Bytes,
}

/// Block at which the aggregate call executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockTag {
    #[default]
    Latest,
    Pending,
    Safe,
    Finalized,
    Earliest,
    Number(u64),
    /// EIP-1898 block hash.
    Hash(B256),
}

impl BlockTag {
    /// The block parameter of an `eth_call` request.
    pub fn to_param(&self) -> Value {
        match self {
            Self::Latest => json!("latest"),
            Self::Pending => json!("pending"),
            Self::Safe => json!("safe"),
            Self::Finalized => json!("finalized"),
            Self::Earliest => json!("earliest"),
            Self::Number(n) => json!(format!("0x{n:x}")),
            Self::Hash(h) => json!({ "blockHash": format!("{h:#x}") }),
        }
    }
}

/// Execution context for one aggregate call.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    pub block: BlockTag,
    /// `from` address of the simulated call.
    pub from: Option<Address>,
}

impl CallOptions {
    pub fn latest() -> Self {
        Self::default()
    }

    pub fn pending() -> Self {
        Self {
            block: BlockTag::Pending,
            from: None,
        }
    }

    pub fn at_block(number: u64) -> Self {
        Self {
            block: BlockTag::Number(number),
            from: None,
        }
    }

    /// Simulate the call as sent by `from`.
    pub fn sender(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }
}

/// The remote aggregation capability.
///
/// Implementations execute `calls` as one request and return exactly one
/// [`Call3Result`] per call, in request order. Whether a failing call with
/// `allow_failure == false` fails the whole request is up to the remote
/// side; Multicall3 reverts the entire `aggregate3` call, which surfaces
/// here as an `Err`.
#[async_trait]
pub trait Aggregator: Send + Sync {
    async fn aggregate3(
        &self,
        opts: &CallOptions,
        calls: Vec<Call3>,
    ) -> Result<Vec<Call3Result>, TransportError>;

    /// Address of the aggregator contract.
    fn address(&self) -> Address;
}

#[async_trait]
impl<A: Aggregator + ?Sized> Aggregator for std::sync::Arc<A> {
    async fn aggregate3(
        &self,
        opts: &CallOptions,
        calls: Vec<Call3>,
    ) -> Result<Vec<Call3Result>, TransportError> {
        (**self).aggregate3(opts, calls).await
    }

    fn address(&self) -> Address {
        (**self).address()
    }
}

/// Multicall3 `aggregate3` over any JSON-RPC transport.
pub struct Multicall3<T> {
    transport: T,
    address: Address,
    schema: AbiSchema,
    next_id: AtomicU64,
}

impl<T: RpcTransport> Multicall3<T> {
    /// Multicall3 at its canonical address.
    pub fn new(transport: T) -> Result<Self, SchemaError> {
        Self::at(transport, MULTICALL3_ADDRESS)
    }

    /// Multicall3 deployed at `address`.
    pub fn at(transport: T, address: Address) -> Result<Self, SchemaError> {
        Ok(Self {
            transport,
            address,
            schema: AbiSchema::from_json(MULTICALL3_ABI)?,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Calldata for `aggregate3(calls)`.
    pub fn encode_aggregate3(&self, calls: &[Call3]) -> Result<Vec<u8>, TransportError> {
        let tuples = calls
            .iter()
            .map(|c| {
                DynSolValue::Tuple(vec![
                    DynSolValue::Address(c.target),
                    DynSolValue::Bool(c.allow_failure),
                    DynSolValue::Bytes(c.call_data.to_vec()),
                ])
            })
            .collect();
        self.schema
            .encode("aggregate3", &[DynSolValue::Array(tuples)])
            .map_err(|e| TransportError::Other(format!("failed to encode aggregate3: {e}")))
    }

    /// Decode `aggregate3` return data.
    pub fn decode_aggregate3(&self, data: &[u8]) -> Result<Vec<Call3Result>, TransportError> {
        let mut values = self
            .schema
            .decode("aggregate3", data)
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;
        let results = values
            .pop()
            .ok_or_else(|| TransportError::InvalidResponse("aggregate3 returned nothing".into()))?;
        let pairs = Vec::<(bool, Bytes)>::from_abi_value(results)
            .map_err(|e| TransportError::InvalidResponse(format!("aggregate3 results: {e}")))?;
        Ok(pairs
            .into_iter()
            .map(|(success, return_data)| Call3Result {
                success,
                return_data,
            })
            .collect())
    }
}

#[async_trait]
impl<T: RpcTransport> Aggregator for Multicall3<T> {
    async fn aggregate3(
        &self,
        opts: &CallOptions,
        calls: Vec<Call3>,
    ) -> Result<Vec<Call3Result>, TransportError> {
        let calldata = self.encode_aggregate3(&calls)?;

        let mut tx = json!({
            "to": format!("{:#x}", self.address),
            "data": format!("0x{}", hex::encode(&calldata)),
        });
        if let Some(from) = opts.from {
            tx["from"] = json!(format!("{from:#x}"));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            id,
            calls = calls.len(),
            bytes = calldata.len(),
            url = %self.transport.url(),
            "eth_call aggregate3"
        );

        let raw: String = self
            .transport
            .call(id, "eth_call", vec![tx, opts.block.to_param()])
            .await?;
        let data = hex::decode(raw.trim_start_matches("0x"))
            .map_err(|e| TransportError::InvalidResponse(format!("eth_call result is not hex: {e}")))?;

        self.decode_aggregate3(&data)
    }

    fn address(&self) -> Address {
        self.address
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chaincall_rpc::{JsonRpcRequest, JsonRpcResponse};

    struct EchoTransport;

    #[async_trait]
    impl RpcTransport for EchoTransport {
        async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
            Ok(JsonRpcResponse::success(req.id, json!("0x")))
        }

        fn url(&self) -> &str {
            "mock://echo"
        }
    }

    #[test]
    fn default_address_constants_agree() {
        let parsed: Address = DEFAULT_MULTICALL3_ADDRESS.parse().unwrap();
        assert_eq!(parsed, MULTICALL3_ADDRESS);
    }

    #[test]
    fn aggregate3_selector() {
        let m = Multicall3::new(EchoTransport).unwrap();
        let data = m
            .encode_aggregate3(&[Call3 {
                target: Address::repeat_byte(1),
                allow_failure: true,
                call_data: Bytes::from(vec![0x70, 0xa0, 0x82, 0x31]),
            }])
            .unwrap();
        // keccak256("aggregate3((address,bool,bytes)[])")[:4]
        assert_eq!(hex::encode(&data[..4]), "82ad56cb");
    }

    #[test]
    fn results_roundtrip_through_abi() {
        let m = Multicall3::new(EchoTransport).unwrap();
        let encoded = DynSolValue::Tuple(vec![DynSolValue::Array(vec![
            DynSolValue::Tuple(vec![DynSolValue::Bool(true), DynSolValue::Bytes(vec![1, 2, 3])]),
            DynSolValue::Tuple(vec![DynSolValue::Bool(false), DynSolValue::Bytes(vec![])]),
        ])])
        .abi_encode_params();
        let results = m.decode_aggregate3(&encoded).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].success);
        assert_eq!(results[0].return_data.as_ref(), &[1, 2, 3]);
        assert!(!results[1].success);
    }

    #[test]
    fn block_tag_params() {
        assert_eq!(BlockTag::Latest.to_param(), json!("latest"));
        assert_eq!(BlockTag::Number(255).to_param(), json!("0xff"));
        let hash = BlockTag::Hash(B256::repeat_byte(0xab)).to_param();
        assert!(hash["blockHash"].as_str().unwrap().starts_with("0xabab"));
    }

    #[tokio::test]
    async fn empty_return_is_invalid_response() {
        let m = Multicall3::new(EchoTransport).unwrap();
        let err = m.aggregate3(&CallOptions::latest(), vec![]).await.unwrap_err();
        assert!(matches!(err, TransportError::InvalidResponse(_)));
    }
}
