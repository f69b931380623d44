//! `Call`: one contract call waiting to be batched.

use std::any::Any;
use std::fmt;

use alloy_primitives::Address;
use chaincall_abi::{DynSolValue, OutputRecord, PackError, RecordError, UnpackError};

use crate::contract::Contract;

type ErasedRecord = Box<dyn Any + Send + Sync>;
type BuildRecord = fn(Vec<DynSolValue>) -> Result<ErasedRecord, RecordError>;

fn build_record<O: OutputRecord>(values: Vec<DynSolValue>) -> Result<ErasedRecord, RecordError> {
    O::from_values(values).map(|record| Box::new(record) as ErasedRecord)
}

/// What a dispatch decided for one call.
pub(crate) enum Outcome {
    /// The target call failed and the call was allowed to fail.
    Failed,
    /// The target call succeeded; this is the freshly built output record.
    Decoded(ErasedRecord),
}

/// A single contract call: target, function, inputs and typed output record.
///
/// Created with [`Contract::new_call`]. A call is mutated in place when it is
/// dispatched: [`Call::failed`] is set and, on success, the output record is
/// replaced by the decoded one.
///
/// A call is meant to belong to one dispatch at a time; the `&mut` borrow
/// taken by [`Caller`](crate::Caller) enforces that.
pub struct Call {
    name: Option<String>,
    contract: Contract,
    method: String,
    inputs: Vec<DynSolValue>,
    outputs: ErasedRecord,
    build_outputs: BuildRecord,
    output_type: &'static str,
    can_fail: bool,
    failed: bool,
    dispatched: bool,
}

impl Call {
    pub(crate) fn new<O: OutputRecord>(
        contract: Contract,
        method: &str,
        inputs: Vec<DynSolValue>,
        outputs: O,
    ) -> Self {
        Self {
            name: None,
            contract,
            method: method.to_string(),
            inputs,
            outputs: Box::new(outputs),
            build_outputs: build_record::<O>,
            output_type: std::any::type_name::<O>(),
            can_fail: false,
            failed: false,
            dispatched: false,
        }
    }

    /// Set a label for the call. Ignored once the call has been dispatched.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        if self.dispatched {
            tracing::debug!(method = %self.method, "call already dispatched; name ignored");
            return self;
        }
        self.name = Some(name.into());
        self
    }

    /// Let this call fail without reverting the whole aggregate call.
    /// Ignored once the call has been dispatched.
    pub fn allow_failure(mut self) -> Self {
        if self.dispatched {
            tracing::debug!(method = %self.method, "call already dispatched; allow_failure ignored");
            return self;
        }
        self.can_fail = true;
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    pub fn target(&self) -> Address {
        self.contract.address()
    }

    pub fn inputs(&self) -> &[DynSolValue] {
        &self.inputs
    }

    /// Whether the call may fail without failing the batch.
    pub fn can_fail(&self) -> bool {
        self.can_fail
    }

    /// Set after dispatch when the target call failed.
    pub fn failed(&self) -> bool {
        self.failed
    }

    pub fn is_dispatched(&self) -> bool {
        self.dispatched
    }

    /// The output record, if `O` is the type the call was created with.
    pub fn outputs<O: OutputRecord>(&self) -> Option<&O> {
        self.outputs.downcast_ref::<O>()
    }

    /// Consume the call and take its output record.
    pub fn into_outputs<O: OutputRecord>(self) -> Option<O> {
        self.outputs.downcast::<O>().ok().map(|b| *b)
    }

    /// Encode the call's inputs into calldata.
    pub fn pack(&self) -> Result<Vec<u8>, PackError> {
        self.contract.schema().encode(&self.method, &self.inputs)
    }

    /// Decode `data` and replace the output record with the result.
    ///
    /// Either every field is written or none is.
    pub fn unpack(&mut self, data: &[u8]) -> Result<(), UnpackError> {
        self.outputs = self.decode_outputs(data)?;
        Ok(())
    }

    /// Decode `data` into a new output record without touching this call.
    pub(crate) fn decode_outputs(&self, data: &[u8]) -> Result<ErasedRecord, UnpackError> {
        let values = self.contract.schema().decode(&self.method, data)?;
        (self.build_outputs)(values).map_err(|source| UnpackError::Record {
            function: self.method.clone(),
            source,
        })
    }

    /// Record the result of a dispatch.
    pub(crate) fn settle(&mut self, outcome: Outcome) {
        self.dispatched = true;
        match outcome {
            Outcome::Failed => self.failed = true,
            Outcome::Decoded(record) => {
                self.failed = false;
                self.outputs = record;
            }
        }
    }
}

impl fmt::Debug for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Call")
            .field("name", &self.name)
            .field("target", &self.contract.address())
            .field("method", &self.method)
            .field("inputs", &self.inputs)
            .field("outputs", &self.output_type)
            .field("can_fail", &self.can_fail)
            .field("failed", &self.failed)
            .finish()
    }
}
