//! `Contract`: an ABI bound to a target address, and the factory for calls.
//!
//! # Example
//!
//! ```rust,no_run
//! use chaincall::Contract;
//! use alloy_primitives::Address;
//!
//! # fn build(abi_json: &str, token: Address) -> Result<(), chaincall_abi::SchemaError> {
//! let erc20 = Contract::builder()
//!     .abi_json(abi_json)
//!     .address(token)
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use alloy_json_abi::JsonAbi;
use alloy_primitives::Address;
use chaincall_abi::{AbiSchema, DynSolValue, OutputRecord, SchemaError};

use crate::call::Call;

/// A parsed ABI plus the address calls are sent to.
///
/// Cheap to clone: the schema is shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Contract {
    schema: Arc<AbiSchema>,
    address: Address,
}

impl Contract {
    /// Fluent builder.
    pub fn builder() -> ContractBuilder {
        ContractBuilder::default()
    }

    /// Parse `abi_json` and bind it to `address`.
    pub fn new(abi_json: &str, address: Address) -> Result<Self, SchemaError> {
        Self::builder().abi_json(abi_json).address(address).build()
    }

    /// Bind an already-parsed schema to `address`.
    pub fn from_schema(schema: Arc<AbiSchema>, address: Address) -> Self {
        Self { schema, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn schema(&self) -> &AbiSchema {
        &self.schema
    }

    /// The same ABI at a different address.
    pub fn at(&self, address: Address) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            address,
        }
    }

    /// Create a call whose outputs land in a default-initialised `O`.
    ///
    /// # Errors
    /// `SchemaError::UnknownFunction` if `method` is not in the ABI, and
    /// `SchemaError::OutputArity` if `O` does not have one field per output.
    pub fn new_call<O: OutputRecord + Default>(
        &self,
        method: &str,
        inputs: impl IntoIterator<Item = DynSolValue>,
    ) -> Result<Call, SchemaError> {
        self.new_call_with(O::default(), method, inputs)
    }

    /// Create a call whose outputs land in `outputs`.
    ///
    /// `outputs` is returned untouched by [`Call::outputs`] until the call
    /// has been dispatched successfully.
    pub fn new_call_with<O: OutputRecord>(
        &self,
        outputs: O,
        method: &str,
        inputs: impl IntoIterator<Item = DynSolValue>,
    ) -> Result<Call, SchemaError> {
        let expected = self.schema.output_count(method)?;
        if expected != O::FIELD_COUNT {
            return Err(SchemaError::OutputArity {
                function: method.to_string(),
                expected,
                got: O::FIELD_COUNT,
            });
        }
        Ok(Call::new(self.clone(), method, inputs.into_iter().collect(), outputs))
    }
}

enum AbiSource {
    Parsed(JsonAbi),
    Json(String),
    Schema(Arc<AbiSchema>),
}

/// Fluent builder for [`Contract`].
///
/// The ABI is required; the address defaults to the zero address.
#[derive(Default)]
pub struct ContractBuilder {
    abi: Option<AbiSource>,
    address: Address,
}

impl ContractBuilder {
    /// Use an already-parsed ABI.
    pub fn abi(mut self, abi: JsonAbi) -> Self {
        self.abi = Some(AbiSource::Parsed(abi));
        self
    }

    /// Parse the ABI from JSON when `build` runs.
    pub fn abi_json(mut self, abi_json: impl Into<String>) -> Self {
        self.abi = Some(AbiSource::Json(abi_json.into()));
        self
    }

    /// Share a schema that is already bound elsewhere.
    pub fn schema(mut self, schema: Arc<AbiSchema>) -> Self {
        self.abi = Some(AbiSource::Schema(schema));
        self
    }

    /// Set the target address.
    pub fn address(mut self, address: Address) -> Self {
        self.address = address;
        self
    }

    pub fn build(self) -> Result<Contract, SchemaError> {
        let schema = match self.abi {
            None => return Err(SchemaError::MissingAbi),
            Some(AbiSource::Parsed(abi)) => Arc::new(AbiSchema::new(abi)?),
            Some(AbiSource::Json(json)) => Arc::new(AbiSchema::from_json(&json)?),
            Some(AbiSource::Schema(schema)) => schema,
        };
        Ok(Contract {
            schema,
            address: self.address,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;

    const ERC20_ABI: &str = r#"[
        {
            "name": "balanceOf",
            "type": "function",
            "inputs": [{"name": "owner", "type": "address"}],
            "outputs": [{"name": "", "type": "uint256"}],
            "stateMutability": "view"
        }
    ]"#;

    #[test]
    fn builder_requires_abi() {
        let err = Contract::builder().address(Address::ZERO).build().unwrap_err();
        assert!(matches!(err, SchemaError::MissingAbi));
    }

    #[test]
    fn builder_surfaces_parse_error() {
        let err = Contract::builder().abi_json("{").build().unwrap_err();
        assert!(err.to_string().starts_with("failed to parse abi"));
    }

    #[test]
    fn builder_accepts_parsed_abi() {
        let abi: JsonAbi = serde_json::from_str(ERC20_ABI).unwrap();
        let c = Contract::builder().abi(abi).build().unwrap();
        assert_eq!(c.address(), Address::ZERO);
        assert!(c.schema().function("balanceOf").is_some());
    }

    #[test]
    fn at_shares_schema() {
        let a = Contract::new(ERC20_ABI, Address::ZERO).unwrap();
        let b = a.at(Address::repeat_byte(0x11));
        assert!(Arc::ptr_eq(&a.schema, &b.schema));
        assert_eq!(b.address(), Address::repeat_byte(0x11));
    }

    #[test]
    fn new_call_checks_function() {
        let c = Contract::new(ERC20_ABI, Address::ZERO).unwrap();
        let err = c.new_call::<(U256,)>("totalSupply", []).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownFunction { .. }));
    }

    #[test]
    fn new_call_checks_output_arity() {
        let c = Contract::new(ERC20_ABI, Address::ZERO).unwrap();
        let err = c
            .new_call::<(U256, bool)>("balanceOf", [DynSolValue::Address(Address::ZERO)])
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::OutputArity { expected: 1, got: 2, .. }
        ));
    }
}
