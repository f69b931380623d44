//! `AbiSchema`: a parsed contract ABI, addressed by function name.
//!
//! # How it works
//! - `encode` = 4-byte selector ++ ABI-encoded inputs, in declaration order
//! - `decode` = ABI-decode the return data against the declared outputs
//! - Overloaded functions resolve to the first declaration with that name

use alloy_dyn_abi::{DynSolType, DynSolValue, Specifier};
use alloy_json_abi::{Function, JsonAbi};
use alloy_primitives::Selector;

use crate::convert::{coerce_input, type_name};
use crate::error::{PackError, SchemaError, UnpackError};

/// Parsed ABI used to encode calls and decode their results.
#[derive(Debug, Clone)]
pub struct AbiSchema {
    abi: JsonAbi,
}

impl AbiSchema {
    /// Wrap an already-parsed ABI.
    ///
    /// # Errors
    /// `SchemaError::NoFunctions` if the ABI declares no functions.
    pub fn new(abi: JsonAbi) -> Result<Self, SchemaError> {
        if abi.functions().next().is_none() {
            return Err(SchemaError::NoFunctions);
        }
        Ok(Self { abi })
    }

    /// Parse a standard Ethereum ABI JSON string.
    pub fn from_json(abi_json: &str) -> Result<Self, SchemaError> {
        let abi: JsonAbi = serde_json::from_str(abi_json).map_err(|e| SchemaError::InvalidJson {
            reason: e.to_string(),
        })?;
        Self::new(abi)
    }

    /// The underlying ABI.
    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// Look up a function by name.
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.abi.functions().find(|f| f.name == name)
    }

    /// Returns all function names in this ABI.
    pub fn function_names(&self) -> Vec<&str> {
        self.abi.functions().map(|f| f.name.as_str()).collect()
    }

    /// Returns the 4-byte selector for a named function.
    pub fn selector_for(&self, name: &str) -> Option<Selector> {
        self.function(name).map(|f| f.selector())
    }

    /// Number of values the named function returns.
    pub fn output_count(&self, name: &str) -> Result<usize, SchemaError> {
        self.function(name)
            .map(|f| f.outputs.len())
            .ok_or_else(|| SchemaError::UnknownFunction {
                function: name.to_string(),
            })
    }

    /// Encode a call to `function_name` with `args` in declaration order.
    ///
    /// Arguments are coerced to the declared types first (see
    /// [`coerce_input`]); a mismatch names the offending position.
    pub fn encode(&self, function_name: &str, args: &[DynSolValue]) -> Result<Vec<u8>, PackError> {
        let func = self
            .function(function_name)
            .ok_or_else(|| PackError::UnknownFunction {
                function: function_name.to_string(),
            })?;

        if args.len() != func.inputs.len() {
            return Err(PackError::ArgumentCount {
                function: function_name.to_string(),
                expected: func.inputs.len(),
                got: args.len(),
            });
        }

        let mut values = Vec::with_capacity(args.len());
        for (index, (param, arg)) in func.inputs.iter().zip(args.iter()).enumerate() {
            let sol_type = param.resolve().map_err(|e| PackError::Encode {
                function: function_name.to_string(),
                reason: format!("param {index}: {e}"),
            })?;
            let value = coerce_input(arg.clone(), &sol_type).map_err(|reason| PackError::ArgumentType {
                function: function_name.to_string(),
                index,
                expected: type_name(&sol_type),
                reason,
            })?;
            values.push(value);
        }

        let mut calldata = func.selector().to_vec();
        calldata.extend_from_slice(&DynSolValue::Tuple(values).abi_encode_params());
        Ok(calldata)
    }

    /// Decode `function_name`'s return data into its outputs, in order.
    pub fn decode(&self, function_name: &str, data: &[u8]) -> Result<Vec<DynSolValue>, UnpackError> {
        let func = self
            .function(function_name)
            .ok_or_else(|| UnpackError::UnknownFunction {
                function: function_name.to_string(),
            })?;

        let types = func
            .outputs
            .iter()
            .map(|p| p.resolve())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| UnpackError::Malformed {
                function: function_name.to_string(),
                reason: e.to_string(),
            })?;

        if types.is_empty() {
            return Ok(vec![]);
        }
        if data.is_empty() {
            return Err(UnpackError::Malformed {
                function: function_name.to_string(),
                reason: "empty return data".into(),
            });
        }

        let decoded = DynSolType::Tuple(types)
            .abi_decode_params(data)
            .map_err(|e| UnpackError::Malformed {
                function: function_name.to_string(),
                reason: e.to_string(),
            })?;

        match decoded {
            DynSolValue::Tuple(values) => Ok(values),
            other => Ok(vec![other]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, U256};

    const ERC20_ABI: &str = r#"[
        {
            "name": "balanceOf",
            "type": "function",
            "inputs": [{"name": "owner", "type": "address"}],
            "outputs": [{"name": "", "type": "uint256"}],
            "stateMutability": "view"
        },
        {
            "name": "symbol",
            "type": "function",
            "inputs": [],
            "outputs": [{"name": "", "type": "string"}],
            "stateMutability": "view"
        },
        {
            "name": "transfer",
            "type": "function",
            "inputs": [
                {"name": "to", "type": "address"},
                {"name": "amount", "type": "uint256"}
            ],
            "outputs": [{"name": "", "type": "bool"}],
            "stateMutability": "nonpayable"
        }
    ]"#;

    fn owner() -> Address {
        "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045".parse().unwrap()
    }

    #[test]
    fn parses_function_names() {
        let schema = AbiSchema::from_json(ERC20_ABI).unwrap();
        let names = schema.function_names();
        assert!(names.contains(&"balanceOf"));
        assert!(names.contains(&"transfer"));
        assert_eq!(schema.output_count("symbol").unwrap(), 1);
    }

    #[test]
    fn invalid_json_rejected() {
        assert!(matches!(
            AbiSchema::from_json("not json"),
            Err(SchemaError::InvalidJson { .. })
        ));
    }

    #[test]
    fn empty_abi_rejected() {
        assert!(matches!(AbiSchema::from_json("[]"), Err(SchemaError::NoFunctions)));
    }

    #[test]
    fn encode_balance_of() {
        let schema = AbiSchema::from_json(ERC20_ABI).unwrap();
        let calldata = schema.encode("balanceOf", &[DynSolValue::Address(owner())]).unwrap();
        // keccak256("balanceOf(address)")[:4] = 0x70a08231
        assert_eq!(&calldata[..4], hex::decode("70a08231").unwrap().as_slice());
        assert_eq!(calldata.len(), 4 + 32);
        assert_eq!(&calldata[16..36], owner().as_slice());
    }

    #[test]
    fn wrong_arg_count_names_function() {
        let schema = AbiSchema::from_json(ERC20_ABI).unwrap();
        let err = schema.encode("transfer", &[DynSolValue::Address(owner())]).unwrap_err();
        assert_eq!(err.to_string(), "'transfer' takes 2 arguments, got 1");
    }

    #[test]
    fn wrong_arg_type_names_position() {
        let schema = AbiSchema::from_json(ERC20_ABI).unwrap();
        let err = schema
            .encode(
                "transfer",
                &[DynSolValue::Address(owner()), DynSolValue::String("ten".into())],
            )
            .unwrap_err();
        match err {
            PackError::ArgumentType { function, index, expected, .. } => {
                assert_eq!(function, "transfer");
                assert_eq!(index, 1);
                assert_eq!(expected, "uint256");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn oversized_int_rejected_for_mid_width_param() {
        let schema = AbiSchema::from_json(
            r#"[{"name": "f", "type": "function",
                 "inputs": [{"name": "x", "type": "int136"}],
                 "outputs": [], "stateMutability": "view"}]"#,
        )
        .unwrap();
        let big = alloy_primitives::I256::from_raw(U256::from(1u8) << 200usize);
        let err = schema.encode("f", &[DynSolValue::Int(big, 256)]).unwrap_err();
        match err {
            PackError::ArgumentType { function, index, expected, .. } => {
                assert_eq!(function, "f");
                assert_eq!(index, 0);
                assert_eq!(expected, "int136");
            }
            other => panic!("unexpected {other:?}"),
        }

        let small = alloy_primitives::I256::try_from(-42i64).unwrap();
        let calldata = schema.encode("f", &[DynSolValue::Int(small, 256)]).unwrap();
        assert_eq!(calldata.len(), 4 + 32);
    }

    #[test]
    fn unknown_function_on_encode() {
        let schema = AbiSchema::from_json(ERC20_ABI).unwrap();
        assert!(matches!(
            schema.encode("mint", &[]),
            Err(PackError::UnknownFunction { .. })
        ));
    }

    #[test]
    fn decode_uint_output() {
        let schema = AbiSchema::from_json(ERC20_ABI).unwrap();
        let data = DynSolValue::Tuple(vec![DynSolValue::Uint(U256::from(1_000_000u64), 256)]).abi_encode_params();
        let out = schema.decode("balanceOf", &data).unwrap();
        assert_eq!(out, vec![DynSolValue::Uint(U256::from(1_000_000u64), 256)]);
    }

    #[test]
    fn decode_dynamic_string_output() {
        let schema = AbiSchema::from_json(ERC20_ABI).unwrap();
        let data = DynSolValue::Tuple(vec![DynSolValue::String("USDC".into())]).abi_encode_params();
        let out = schema.decode("symbol", &data).unwrap();
        assert_eq!(out, vec![DynSolValue::String("USDC".into())]);
    }

    #[test]
    fn decode_short_payload_fails() {
        let schema = AbiSchema::from_json(ERC20_ABI).unwrap();
        assert!(matches!(
            schema.decode("balanceOf", &[0u8; 4]),
            Err(UnpackError::Malformed { .. })
        ));
        assert!(matches!(
            schema.decode("balanceOf", &[]),
            Err(UnpackError::Malformed { .. })
        ));
    }
}
