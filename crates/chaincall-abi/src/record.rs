//! Typed output records.
//!
//! A function's return values land in an [`OutputRecord`]: an ordered set of
//! fields, one per declared output, each convertible with [`FromAbiValue`].
//! Records are built in one go from the decoded values, so a conversion
//! failure never leaves a half-written record behind.

use alloy_dyn_abi::DynSolValue;

use crate::convert::{value_type_name, FromAbiValue};
use crate::error::{ConvertError, RecordError};

/// A structurally typed destination for a function's outputs.
///
/// Implemented for tuples of up to eight [`FromAbiValue`] types and, through
/// [`output_record!`](crate::output_record), for named structs.
pub trait OutputRecord: Sized + Send + Sync + 'static {
    /// Number of fields; must equal the function's declared output count.
    const FIELD_COUNT: usize;

    /// Build the record from decoded values in declaration order.
    fn from_values(values: Vec<DynSolValue>) -> Result<Self, RecordError>;
}

/// Sequential field reader shared by the tuple impls and `output_record!`.
#[doc(hidden)]
pub struct FieldReader {
    values: std::vec::IntoIter<DynSolValue>,
    index: usize,
}

impl FieldReader {
    pub fn new(values: Vec<DynSolValue>, expected: usize) -> Result<Self, RecordError> {
        if values.len() != expected {
            return Err(RecordError::FieldCount {
                expected,
                got: values.len(),
            });
        }
        Ok(Self {
            values: values.into_iter(),
            index: 0,
        })
    }

    /// Convert the next value into `T`.
    pub fn next<T: FromAbiValue>(&mut self) -> Result<T, RecordError> {
        let index = self.index;
        self.index += 1;
        let value = self.values.next().ok_or(RecordError::FieldCount {
            expected: index + 1,
            got: index,
        })?;
        T::from_abi_value(value).map_err(|source| RecordError::Field { index, source })
    }
}

/// Flatten a record error into a conversion error, for records nested in tuples.
fn nested(err: RecordError) -> ConvertError {
    match err {
        RecordError::FieldCount { expected, got } => ConvertError::new(
            format!("tuple of {expected} components"),
            format!("tuple of {got} components"),
        ),
        RecordError::Field { index, source } => ConvertError {
            expected: format!("{} at component {index}", source.expected),
            got: source.got,
        },
    }
}

macro_rules! impl_tuple_record {
    ($count:expr; $($ty:ident),+) => {
        impl<$($ty: FromAbiValue + Send + Sync + 'static),+> OutputRecord for ($($ty,)+) {
            const FIELD_COUNT: usize = $count;

            fn from_values(values: Vec<DynSolValue>) -> Result<Self, RecordError> {
                let mut fields = FieldReader::new(values, $count)?;
                Ok(($(fields.next::<$ty>()?,)+))
            }
        }

        impl<$($ty: FromAbiValue + Send + Sync + 'static),+> FromAbiValue for ($($ty,)+) {
            fn from_abi_value(val: DynSolValue) -> Result<Self, ConvertError> {
                match val {
                    DynSolValue::Tuple(values) => {
                        <Self as OutputRecord>::from_values(values).map_err(nested)
                    }
                    other => Err(ConvertError::new("tuple", value_type_name(&other))),
                }
            }
        }
    };
}

impl_tuple_record!(1; A);
impl_tuple_record!(2; A, B);
impl_tuple_record!(3; A, B, C);
impl_tuple_record!(4; A, B, C, D);
impl_tuple_record!(5; A, B, C, D, E);
impl_tuple_record!(6; A, B, C, D, E, F);
impl_tuple_record!(7; A, B, C, D, E, F, G);
impl_tuple_record!(8; A, B, C, D, E, F, G, H);

/// Declare a struct whose fields receive a function's outputs in order.
///
/// ```ignore
/// chaincall_abi::output_record! {
///     #[derive(Debug, Default)]
///     pub struct Reserves {
///         pub reserve0: u128,
///         pub reserve1: u128,
///         pub block_timestamp_last: u32,
///     }
/// }
/// ```
///
/// The struct can also be used as a field of another record when the ABI
/// returns a nested tuple.
#[macro_export]
macro_rules! output_record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $(#[$fmeta:meta])* $fvis:vis $field:ident : $ty:ty ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( $(#[$fmeta])* $fvis $field: $ty ),+
        }

        impl $crate::OutputRecord for $name {
            const FIELD_COUNT: usize = [$(stringify!($field)),+].len();

            fn from_values(
                values: ::std::vec::Vec<$crate::DynSolValue>,
            ) -> ::std::result::Result<Self, $crate::RecordError> {
                let mut fields = $crate::FieldReader::new(
                    values,
                    <Self as $crate::OutputRecord>::FIELD_COUNT,
                )?;
                Ok(Self {
                    $( $field: fields.next::<$ty>()? ),+
                })
            }
        }

        impl $crate::FromAbiValue for $name {
            fn from_abi_value(
                val: $crate::DynSolValue,
            ) -> ::std::result::Result<Self, $crate::ConvertError> {
                match val {
                    $crate::DynSolValue::Tuple(values) => {
                        <Self as $crate::OutputRecord>::from_values(values).map_err(|e| {
                            $crate::ConvertError::new(stringify!($name), e.to_string())
                        })
                    }
                    other => Err($crate::ConvertError::new(
                        stringify!($name),
                        $crate::value_type_name(&other),
                    )),
                }
            }
        }
    };
}
