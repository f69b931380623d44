//! # chaincall
//!
//! Batch many read-only contract calls into one Multicall3 `aggregate3`
//! request and get typed, per-call results back.
//!
//! ## Features
//! - Typed outputs: each call lands in an [`OutputRecord`] checked against the ABI
//! - Per-call fault tolerance via [`Call::allow_failure`]
//! - Bounded batches with [`Caller::call_chunked`] and an optional cooldown
//! - Pluggable remote side: any [`Aggregator`], or [`Multicall3`] over any
//!   [`RpcTransport`](chaincall_rpc::RpcTransport)
//!
//! ## Usage
//! ```no_run
//! use chaincall::{Caller, CallOptions, Contract, DynSolValue};
//! use alloy_primitives::Address;
//!
//! # async fn run(token: Address, holders: Vec<Address>) -> Result<(), Box<dyn std::error::Error>> {
//! let erc20 = Contract::new(r#"[{"type":"function","name":"balanceOf","stateMutability":"view",
//!     "inputs":[{"name":"owner","type":"address"}],"outputs":[{"name":"","type":"uint256"}]}]"#, token)?;
//! let caller = Caller::builder().rpc_url("https://eth.llamarpc.com").build()?;
//!
//! let mut calls = holders
//!     .iter()
//!     .map(|h| erc20.new_call::<(alloy_primitives::U256,)>("balanceOf", [DynSolValue::Address(*h)]))
//!     .collect::<Result<Vec<_>, _>>()?;
//! caller.call_chunked(&CallOptions::latest(), 100, std::time::Duration::ZERO, &mut calls).await?;
//! # Ok(())
//! # }
//! ```

pub mod call;
pub mod caller;
pub mod chunk;
pub mod config;
pub mod contract;
pub mod error;
pub mod multicall;
pub mod telemetry;

pub use call::Call;
pub use caller::{Caller, CallerBuilder};
pub use chaincall_abi::{output_record, AbiSchema, DynSolValue, FromAbiValue, OutputRecord};
pub use chunk::chunk_inputs;
pub use config::CallerConfig;
pub use contract::{Contract, ContractBuilder};
pub use error::CallError;
pub use multicall::{
    Aggregator, BlockTag, Call3, Call3Result, CallOptions, Multicall3, DEFAULT_MULTICALL3_ADDRESS,
    MULTICALL3_ADDRESS,
};
