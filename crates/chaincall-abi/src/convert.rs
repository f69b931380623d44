//! Value conversions at both ends of a call.
//!
//! - [`coerce_input`] fits a caller-supplied `DynSolValue` to a declared
//!   parameter type before encoding.
//! - [`FromAbiValue`] turns a decoded `DynSolValue` into a concrete Rust type
//!   when an output record is filled.

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{Address, Bytes, FixedBytes, B256, I256, U256};

use crate::error::ConvertError;

/// Solidity name of a resolved ABI type, e.g. `uint256` or `(address,bool)[]`.
pub fn type_name(ty: &DynSolType) -> String {
    match ty {
        DynSolType::Bool => "bool".into(),
        DynSolType::Int(bits) => format!("int{bits}"),
        DynSolType::Uint(bits) => format!("uint{bits}"),
        DynSolType::FixedBytes(n) => format!("bytes{n}"),
        DynSolType::Address => "address".into(),
        DynSolType::Function => "function".into(),
        DynSolType::Bytes => "bytes".into(),
        DynSolType::String => "string".into(),
        DynSolType::Array(inner) => format!("{}[]", type_name(inner)),
        DynSolType::FixedArray(inner, len) => format!("{}[{len}]", type_name(inner)),
        DynSolType::Tuple(types) => {
            let parts: Vec<_> = types.iter().map(type_name).collect();
            format!("({})", parts.join(","))
        }
        #[allow(unreachable_patterns)]
        _ => "tuple".into(),
    }
}

/// Solidity name of the type a decoded value carries.
pub fn value_type_name(val: &DynSolValue) -> String {
    match val {
        DynSolValue::Bool(_) => "bool".into(),
        DynSolValue::Int(_, bits) => format!("int{bits}"),
        DynSolValue::Uint(_, bits) => format!("uint{bits}"),
        DynSolValue::FixedBytes(_, n) => format!("bytes{n}"),
        DynSolValue::Address(_) => "address".into(),
        DynSolValue::Function(_) => "function".into(),
        DynSolValue::Bytes(_) => "bytes".into(),
        DynSolValue::String(_) => "string".into(),
        DynSolValue::Array(vals) => match vals.first() {
            Some(first) => format!("{}[]", value_type_name(first)),
            None => "[]".into(),
        },
        DynSolValue::FixedArray(vals) => match vals.first() {
            Some(first) => format!("{}[{}]", value_type_name(first), vals.len()),
            None => "[0]".into(),
        },
        DynSolValue::Tuple(vals) => {
            let parts: Vec<_> = vals.iter().map(value_type_name).collect();
            format!("({})", parts.join(","))
        }
        #[allow(unreachable_patterns)]
        _ => "tuple".into(),
    }
}

/// Fit `val` to the declared parameter type `expected`.
///
/// Integers are re-tagged to the declared width when the value fits, and
/// fixed bytes shorter than the declared length are right-padded. Every other
/// combination must already match exactly.
pub fn coerce_input(val: DynSolValue, expected: &DynSolType) -> Result<DynSolValue, String> {
    match (val, expected) {
        (DynSolValue::Bool(b), DynSolType::Bool) => Ok(DynSolValue::Bool(b)),

        (DynSolValue::Uint(u, _), DynSolType::Uint(bits)) => {
            if u.bit_len() > *bits {
                return Err(format!("value {u} does not fit in uint{bits}"));
            }
            Ok(DynSolValue::Uint(u, *bits))
        }

        (DynSolValue::Int(i, _), DynSolType::Int(bits)) => {
            if !int_fits(i, *bits) {
                return Err(format!("value {i} does not fit in int{bits}"));
            }
            Ok(DynSolValue::Int(i, *bits))
        }

        (DynSolValue::Address(a), DynSolType::Address) => Ok(DynSolValue::Address(a)),

        (DynSolValue::Function(f), DynSolType::Function) => Ok(DynSolValue::Function(f)),

        (DynSolValue::Bytes(b), DynSolType::Bytes) => Ok(DynSolValue::Bytes(b)),

        (DynSolValue::FixedBytes(word, size), DynSolType::FixedBytes(n)) => {
            if size > *n {
                return Err(format!("bytes{size} does not fit in bytes{n}"));
            }
            Ok(DynSolValue::FixedBytes(word, *n))
        }

        (DynSolValue::Bytes(b), DynSolType::FixedBytes(n)) => {
            if b.len() > *n {
                return Err(format!("bytes{n}: got {} bytes", b.len()));
            }
            let mut word = B256::ZERO;
            word[..b.len()].copy_from_slice(&b);
            Ok(DynSolValue::FixedBytes(word, *n))
        }

        (DynSolValue::String(s), DynSolType::String) => Ok(DynSolValue::String(s)),

        (DynSolValue::Array(elems), DynSolType::Array(inner)) => {
            Ok(DynSolValue::Array(coerce_elements(elems, inner)?))
        }

        (DynSolValue::Array(elems) | DynSolValue::FixedArray(elems), DynSolType::FixedArray(inner, len)) => {
            if elems.len() != *len {
                return Err(format!(
                    "fixed array length mismatch: expected {len}, got {}",
                    elems.len()
                ));
            }
            Ok(DynSolValue::FixedArray(coerce_elements(elems, inner)?))
        }

        (DynSolValue::Tuple(fields), DynSolType::Tuple(types)) => {
            if fields.len() != types.len() {
                return Err(format!(
                    "tuple length mismatch: expected {}, got {}",
                    types.len(),
                    fields.len()
                ));
            }
            let coerced = fields
                .into_iter()
                .zip(types.iter())
                .enumerate()
                .map(|(i, (v, t))| coerce_input(v, t).map_err(|e| format!("component {i}: {e}")))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(DynSolValue::Tuple(coerced))
        }

        (other, _) => Err(format!("got {}", value_type_name(&other))),
    }
}

fn coerce_elements(elems: Vec<DynSolValue>, inner: &DynSolType) -> Result<Vec<DynSolValue>, String> {
    elems
        .into_iter()
        .enumerate()
        .map(|(i, e)| coerce_input(e, inner).map_err(|err| format!("element {i}: {err}")))
        .collect()
}

/// `i` lies in `[-2^(bits-1), 2^(bits-1))`.
fn int_fits(i: I256, bits: usize) -> bool {
    if bits == 0 || bits >= 256 {
        return bits == 256;
    }
    let bound = U256::from(1u8) << (bits - 1);
    if i.is_negative() {
        i.unsigned_abs() <= bound
    } else {
        i.unsigned_abs() < bound
    }
}

/// Conversion from a decoded ABI value into a concrete Rust type.
///
/// This is the per-field half of the output contract: an [`OutputRecord`]
/// is filled by converting each decoded value in declaration order.
///
/// [`OutputRecord`]: crate::OutputRecord
pub trait FromAbiValue: Sized {
    fn from_abi_value(val: DynSolValue) -> Result<Self, ConvertError>;
}

impl FromAbiValue for DynSolValue {
    fn from_abi_value(val: DynSolValue) -> Result<Self, ConvertError> {
        Ok(val)
    }
}

impl FromAbiValue for bool {
    fn from_abi_value(val: DynSolValue) -> Result<Self, ConvertError> {
        match val {
            DynSolValue::Bool(b) => Ok(b),
            other => Err(ConvertError::new("bool", value_type_name(&other))),
        }
    }
}

impl FromAbiValue for U256 {
    fn from_abi_value(val: DynSolValue) -> Result<Self, ConvertError> {
        match val {
            DynSolValue::Uint(u, _) => Ok(u),
            other => Err(ConvertError::new("uint", value_type_name(&other))),
        }
    }
}

impl FromAbiValue for I256 {
    fn from_abi_value(val: DynSolValue) -> Result<Self, ConvertError> {
        match val {
            DynSolValue::Int(i, _) => Ok(i),
            other => Err(ConvertError::new("int", value_type_name(&other))),
        }
    }
}

macro_rules! impl_from_uint {
    ($($t:ty),+) => {$(
        impl FromAbiValue for $t {
            fn from_abi_value(val: DynSolValue) -> Result<Self, ConvertError> {
                match val {
                    DynSolValue::Uint(u, bits) => u128::try_from(u)
                        .ok()
                        .and_then(|v| <$t>::try_from(v).ok())
                        .ok_or_else(|| {
                            ConvertError::new(stringify!($t), format!("uint{bits} value {u} (out of range)"))
                        }),
                    other => Err(ConvertError::new(stringify!($t), value_type_name(&other))),
                }
            }
        }
    )+};
}

macro_rules! impl_from_int {
    ($($t:ty),+) => {$(
        impl FromAbiValue for $t {
            fn from_abi_value(val: DynSolValue) -> Result<Self, ConvertError> {
                match val {
                    DynSolValue::Int(i, bits) => i128::try_from(i)
                        .ok()
                        .and_then(|v| <$t>::try_from(v).ok())
                        .ok_or_else(|| {
                            ConvertError::new(stringify!($t), format!("int{bits} value {i} (out of range)"))
                        }),
                    other => Err(ConvertError::new(stringify!($t), value_type_name(&other))),
                }
            }
        }
    )+};
}

impl_from_uint!(u8, u16, u32, u64, u128, usize);
impl_from_int!(i8, i16, i32, i64, i128);

impl FromAbiValue for Address {
    fn from_abi_value(val: DynSolValue) -> Result<Self, ConvertError> {
        match val {
            DynSolValue::Address(a) => Ok(a),
            other => Err(ConvertError::new("address", value_type_name(&other))),
        }
    }
}

impl FromAbiValue for String {
    fn from_abi_value(val: DynSolValue) -> Result<Self, ConvertError> {
        match val {
            DynSolValue::String(s) => Ok(s),
            other => Err(ConvertError::new("string", value_type_name(&other))),
        }
    }
}

impl FromAbiValue for Bytes {
    fn from_abi_value(val: DynSolValue) -> Result<Self, ConvertError> {
        match val {
            DynSolValue::Bytes(b) => Ok(Bytes::from(b)),
            DynSolValue::FixedBytes(word, size) => Ok(Bytes::from(word[..size].to_vec())),
            other => Err(ConvertError::new("bytes", value_type_name(&other))),
        }
    }
}

impl<const N: usize> FromAbiValue for FixedBytes<N> {
    fn from_abi_value(val: DynSolValue) -> Result<Self, ConvertError> {
        match val {
            DynSolValue::FixedBytes(word, size) if size == N => {
                Ok(FixedBytes::<N>::from_slice(&word[..N]))
            }
            other => Err(ConvertError::new(format!("bytes{N}"), value_type_name(&other))),
        }
    }
}

impl<T: FromAbiValue> FromAbiValue for Vec<T> {
    fn from_abi_value(val: DynSolValue) -> Result<Self, ConvertError> {
        match val {
            DynSolValue::Array(elems) | DynSolValue::FixedArray(elems) => convert_elements(elems),
            other => Err(ConvertError::new("array", value_type_name(&other))),
        }
    }
}

impl<T: FromAbiValue, const N: usize> FromAbiValue for [T; N] {
    fn from_abi_value(val: DynSolValue) -> Result<Self, ConvertError> {
        match val {
            DynSolValue::Array(elems) | DynSolValue::FixedArray(elems) => {
                let got = elems.len();
                let converted: Vec<T> = convert_elements(elems)?;
                converted.try_into().map_err(|_| {
                    ConvertError::new(format!("array of length {N}"), format!("array of length {got}"))
                })
            }
            other => Err(ConvertError::new(format!("array of length {N}"), value_type_name(&other))),
        }
    }
}

fn convert_elements<T: FromAbiValue>(elems: Vec<DynSolValue>) -> Result<Vec<T>, ConvertError> {
    elems
        .into_iter()
        .enumerate()
        .map(|(i, e)| {
            T::from_abi_value(e).map_err(|err| ConvertError {
                expected: format!("{} at element {i}", err.expected),
                got: err.got,
            })
        })
        .collect()
}
