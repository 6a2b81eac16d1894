//! Purpose: Single-slot typed boxes used as in/out call parameters.
//! Exports: `HolderValue`, `Holder`, `DynHolder`.
//! Role: What a transport reads and writes when it marshals call arguments and results.
//! Invariants: A holder's kind never changes after construction.
//! Invariants: Out-of-range integers fail with `OutOfRange`; foreign kinds fail with `InvalidType`.
//! Invariants: Nothing is coerced silently (no wrapping, no truncation, no stringification).
use std::fmt;

use num_bigint::BigInt;

use crate::core::decimal::Decimal;
use crate::core::error::{Error, ErrorKind};
use crate::core::timestamp::Timestamp;
use crate::core::value::{ArrayRef, HolderKind, ObjectRef, Value, WireString};

fn wrong_kind(expected: HolderKind, value: &Value) -> Error {
    Error::new(ErrorKind::InvalidType).with_message(format!(
        "{expected} holder cannot accept a {} value",
        value.kind()
    ))
}

/// Concrete slot type of one [`HolderKind`].
pub trait HolderValue: Clone + fmt::Debug + Default + PartialEq + Sized {
    const KIND: HolderKind;

    fn into_value(self) -> Value;

    fn from_value(value: Value) -> Result<Self, Error>;
}

macro_rules! integer_holder_value {
    ($ty:ty, $kind:ident) => {
        impl HolderValue for $ty {
            const KIND: HolderKind = HolderKind::$kind;

            fn into_value(self) -> Value {
                Value::$kind(self)
            }

            fn from_value(value: Value) -> Result<Self, Error> {
                if let Value::$kind(v) = value {
                    return Ok(v);
                }
                let Some(integer) = value.as_bigint() else {
                    return Err(wrong_kind(Self::KIND, &value));
                };
                <$ty>::try_from(&integer).map_err(|_| {
                    Error::new(ErrorKind::OutOfRange).with_message(format!(
                        "{integer} is outside {}..={}",
                        <$ty>::MIN,
                        <$ty>::MAX
                    ))
                })
            }
        }
    };
}

integer_holder_value!(i8, I8);
integer_holder_value!(i16, I16);
integer_holder_value!(i32, I32);
integer_holder_value!(i64, I64);
integer_holder_value!(u8, U8);
integer_holder_value!(u16, U16);
integer_holder_value!(u32, U32);
integer_holder_value!(u64, U64);

macro_rules! exact_holder_value {
    ($ty:ty, $kind:ident) => {
        impl HolderValue for $ty {
            const KIND: HolderKind = HolderKind::$kind;

            fn into_value(self) -> Value {
                Value::$kind(self)
            }

            fn from_value(value: Value) -> Result<Self, Error> {
                match value {
                    Value::$kind(v) => Ok(v),
                    other => Err(wrong_kind(Self::KIND, &other)),
                }
            }
        }
    };
}

exact_holder_value!(bool, Bool);
exact_holder_value!(WireString, String);
exact_holder_value!(Decimal, Decimal);
exact_holder_value!(Timestamp, Timestamp);
exact_holder_value!(ArrayRef, Array);
exact_holder_value!(ObjectRef, Object);

impl HolderValue for BigInt {
    const KIND: HolderKind = HolderKind::BigInt;

    fn into_value(self) -> Value {
        Value::BigInt(self)
    }

    fn from_value(value: Value) -> Result<Self, Error> {
        value
            .as_bigint()
            .ok_or_else(|| wrong_kind(Self::KIND, &value))
    }
}

/// Statically typed holder.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Holder<T: HolderValue> {
    value: T,
}

impl<T: HolderValue> Holder<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    /// Range- and type-checked construction from a tagged value.
    pub fn from_value(value: Value) -> Result<Self, Error> {
        T::from_value(value).map(Self::new)
    }

    pub fn kind(&self) -> HolderKind {
        T::KIND
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn set(&mut self, value: T) {
        self.value = value;
    }

    /// Leaves the holder untouched when the value is rejected.
    pub fn set_value(&mut self, value: Value) -> Result<(), Error> {
        self.value = T::from_value(value)?;
        Ok(())
    }

    pub fn replace(&mut self, value: T) -> T {
        std::mem::replace(&mut self.value, value)
    }

    pub fn to_value(&self) -> Value {
        self.value.clone().into_value()
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Holder whose kind is chosen at runtime and then fixed.
#[derive(Clone, Debug, PartialEq)]
pub struct DynHolder {
    kind: HolderKind,
    value: Value,
}

impl DynHolder {
    pub fn new(kind: HolderKind) -> Self {
        Self {
            kind,
            value: Value::default_for(kind),
        }
    }

    pub fn with_value(kind: HolderKind, value: Value) -> Result<Self, Error> {
        let mut holder = Self::new(kind);
        holder.set(value)?;
        Ok(holder)
    }

    pub fn kind(&self) -> HolderKind {
        self.kind
    }

    pub fn get(&self) -> &Value {
        &self.value
    }

    pub fn set(&mut self, value: Value) -> Result<(), Error> {
        self.value = coerce(self.kind, value)?;
        Ok(())
    }

    pub fn into_value(self) -> Value {
        self.value
    }
}

fn coerce(kind: HolderKind, value: Value) -> Result<Value, Error> {
    match kind {
        HolderKind::I8 => i8::from_value(value).map(Value::I8),
        HolderKind::I16 => i16::from_value(value).map(Value::I16),
        HolderKind::I32 => i32::from_value(value).map(Value::I32),
        HolderKind::I64 => i64::from_value(value).map(Value::I64),
        HolderKind::U8 => u8::from_value(value).map(Value::U8),
        HolderKind::U16 => u16::from_value(value).map(Value::U16),
        HolderKind::U32 => u32::from_value(value).map(Value::U32),
        HolderKind::U64 => u64::from_value(value).map(Value::U64),
        HolderKind::Bool => bool::from_value(value).map(Value::Bool),
        HolderKind::String => WireString::from_value(value).map(Value::String),
        HolderKind::Decimal => Decimal::from_value(value).map(Value::Decimal),
        HolderKind::BigInt => BigInt::from_value(value).map(Value::BigInt),
        HolderKind::Timestamp => Timestamp::from_value(value).map(Value::Timestamp),
        HolderKind::Array => ArrayRef::from_value(value).map(Value::Array),
        HolderKind::Object => ObjectRef::from_value(value).map(Value::Object),
    }
}
