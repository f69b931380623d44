//! # erc20_balances
//!
//! Reads USDC balances for a handful of holders through Multicall3, two
//! holders per aggregate request.
//!
//! Run with:
//! ```sh
//! cargo run --bin erc20_balances
//!
//! # Against your own node, with debug logs for the dispatcher:
//! RPC_URL=http://localhost:8545 RUST_LOG=chaincall=debug cargo run --bin erc20_balances
//! ```
//!
//! Note: requires network access to an Ethereum mainnet endpoint.

use std::time::Duration;

use alloy_primitives::{Address, U256};
use anyhow::Result;
use chaincall::telemetry::{init_tracing, LogConfig};
use chaincall::{CallOptions, Caller, Contract, DynSolValue};

const ERC20_ABI: &str = r#"[
    {
        "name": "balanceOf",
        "type": "function",
        "inputs": [{"name": "owner", "type": "address"}],
        "outputs": [{"name": "", "type": "uint256"}],
        "stateMutability": "view"
    },
    {
        "name": "decimals",
        "type": "function",
        "inputs": [],
        "outputs": [{"name": "", "type": "uint8"}],
        "stateMutability": "view"
    }
]"#;

const USDC: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";

const HOLDERS: &[&str] = &[
    "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045", // vitalik.eth
    "0x28C6c06298d514Db089934071355E5743bf21d60", // Binance 14
    "0x0000000000000000000000000000000000000001",
];

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(&LogConfig {
        json: std::env::var("LOG_JSON").is_ok(),
        ..LogConfig::default()
    });

    let rpc_url = std::env::var("RPC_URL").unwrap_or_else(|_| "https://eth.llamarpc.com".into());
    let caller = Caller::builder()
        .rpc_url(&rpc_url)
        .request_timeout(Duration::from_secs(10))
        .build()?;

    println!("chaincall — ERC-20 balances via Multicall3");
    println!("═══════════════════════════════════════════════════════");
    println!("  rpc:       {rpc_url}");
    println!("  multicall: {}", caller.multicall_address());

    let usdc = Contract::new(ERC20_ABI, USDC.parse()?)?;

    // ── 1. One call on its own ─────────────────────────────────────────────────
    let mut decimals = [usdc.new_call::<(u8,)>("decimals", [])?.name("decimals")];
    caller.call(&CallOptions::latest(), &mut decimals).await?;
    let scale = decimals[0].outputs::<(u8,)>().map(|d| d.0).unwrap_or(6);
    println!("\nUSDC decimals: {scale}");

    // ── 2. Many calls, two per request ─────────────────────────────────────────
    let mut calls = Vec::with_capacity(HOLDERS.len());
    for holder in HOLDERS {
        let owner: Address = holder.parse()?;
        calls.push(
            usdc.new_call::<(U256,)>("balanceOf", [DynSolValue::Address(owner)])?
                .name(*holder)
                .allow_failure(),
        );
    }
    caller
        .call_chunked(&CallOptions::latest(), 2, Duration::from_millis(100), &mut calls)
        .await?;

    println!("\n─── Balances ─────────────────────────────────────────");
    for call in &calls {
        let label = call.label().unwrap_or("?");
        match call.outputs::<(U256,)>() {
            Some((raw,)) if !call.failed() => println!("  {label}  {}", format_units(*raw, scale)),
            _ => println!("  {label}  (call failed)"),
        }
    }

    Ok(())
}

fn format_units(raw: U256, decimals: u8) -> String {
    let base = U256::from(10u64).pow(U256::from(decimals));
    let whole = raw / base;
    let frac = raw % base;
    format!("{whole}.{frac:0>width$}", frac = frac.to_string(), width = decimals as usize)
}
