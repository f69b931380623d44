//! # pool_reserves
//!
//! Reads Uniswap V2 pair state through Multicall3, landing `getReserves()`
//! in a named struct declared with `output_record!`.
//!
//! The caller is built from a JSON `CallerConfig`, so chunking and cooldown
//! come from configuration rather than code.
//!
//! Run with:
//! ```sh
//! cargo run --bin pool_reserves
//!
//! # Custom config:
//! CHAINCALL_CONFIG='{"rpc_url":"http://localhost:8545","chunk_size":4}' cargo run --bin pool_reserves
//! ```

use alloy_primitives::Address;
use anyhow::Result;
use chaincall::telemetry::{init_tracing, LogConfig};
use chaincall::{output_record, CallOptions, Caller, CallerConfig, Contract};
use tracing::info;

const PAIR_ABI: &str = r#"[
    {
        "name": "getReserves",
        "type": "function",
        "inputs": [],
        "outputs": [
            {"name": "_reserve0", "type": "uint112"},
            {"name": "_reserve1", "type": "uint112"},
            {"name": "_blockTimestampLast", "type": "uint32"}
        ],
        "stateMutability": "view"
    },
    {
        "name": "token0",
        "type": "function",
        "inputs": [],
        "outputs": [{"name": "", "type": "address"}],
        "stateMutability": "view"
    },
    {
        "name": "token1",
        "type": "function",
        "inputs": [],
        "outputs": [{"name": "", "type": "address"}],
        "stateMutability": "view"
    }
]"#;

const PAIRS: &[(&str, &str)] = &[
    ("USDC/WETH", "0xB4e16d0168e52d35CaCD2c6185b44281Ec28C9Dc"),
    ("DAI/WETH", "0xA478c2975Ab1Ea89e8196811F51A7B7Ade33eB11"),
];

output_record! {
    #[derive(Debug, Default)]
    pub struct Reserves {
        pub reserve0: u128,
        pub reserve1: u128,
        pub block_timestamp_last: u32,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(&LogConfig::default().with_component("chaincall", "debug"));

    let config = match std::env::var("CHAINCALL_CONFIG") {
        Ok(json) => CallerConfig::from_json(&json)?,
        Err(_) => {
            let mut config = CallerConfig::new("https://eth.llamarpc.com");
            config.chunk_size = 3;
            config.cooldown_ms = 50;
            config
        }
    };
    let caller = Caller::from_config(&config)?;
    info!(rpc = %config.rpc_url, chunk_size = config.chunk_size, "caller configured");

    let template = Contract::new(PAIR_ABI, Address::ZERO)?;
    let mut calls = Vec::new();
    for (label, address) in PAIRS {
        let pair = template.at(address.parse()?);
        calls.push(pair.new_call::<Reserves>("getReserves", [])?.name(*label));
        calls.push(pair.new_call::<(Address,)>("token0", [])?.name(*label));
        calls.push(pair.new_call::<(Address,)>("token1", [])?.name(*label));
    }

    caller.call_batched(&CallOptions::latest(), &mut calls).await?;

    println!("chaincall — Uniswap V2 reserves");
    println!("═══════════════════════════════════════════════════════");
    for group in calls.chunks(3) {
        let label = group[0].label().unwrap_or("?");
        let (Some(reserves), Some((token0,)), Some((token1,))) = (
            group[0].outputs::<Reserves>(),
            group[1].outputs::<(Address,)>(),
            group[2].outputs::<(Address,)>(),
        ) else {
            continue;
        };
        println!("\n─── {label} ({}) ───", group[0].target());
        println!("  token0:   {token0}  reserve {}", reserves.reserve0);
        println!("  token1:   {token1}  reserve {}", reserves.reserve1);
        println!("  updated:  {}", reserves.block_timestamp_last);
    }

    Ok(())
}
