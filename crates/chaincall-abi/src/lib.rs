//! # chaincall-abi
//!
//! The schema half of chaincall: a parsed contract ABI that encodes calldata
//! and decodes return data by function name, plus the typed-output contract
//! used to land decoded values in plain Rust structs.
//!
//! ## Implementation notes
//! - ABI JSON is parsed with `alloy-json-abi`; encode/decode uses `alloy-dyn-abi`
//! - Inputs are `DynSolValue`s, coerced to the declared parameter types
//!   (integer widths, short fixed bytes) before encoding
//! - Outputs land in any [`OutputRecord`]: tuples of [`FromAbiValue`] types,
//!   or structs declared with [`output_record!`]

pub mod convert;
pub mod error;
pub mod record;
pub mod schema;

pub use alloy_dyn_abi::{DynSolType, DynSolValue};
pub use convert::{coerce_input, type_name, value_type_name, FromAbiValue};
pub use error::{ConvertError, PackError, RecordError, SchemaError, UnpackError};
pub use record::{FieldReader, OutputRecord};
pub use schema::AbiSchema;
