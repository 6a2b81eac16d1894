//! Purpose: Canonical text form for every holder kind.
//! Exports: `TextValue`, `TextCodec`, `TextAdapter`.
//! Role: Boundary used by configuration loading and debugging output.
//! Invariants: `set_as_text` rejects exactly what the holder's text constructor rejects.
//! Invariants: Integer text fails `InvalidNumericLiteral` on grammar, `OutOfRange` on magnitude.
//! Invariants: `get_as_text` never fails for a holder in a valid state.
//! Notes: Absent strings render as "" and absent references as "null"; the string case is lossy.
use num_bigint::BigInt;

use crate::core::decimal::{DECIMAL_GRAMMAR, Decimal};
use crate::core::error::{Error, ErrorKind};
use crate::core::holder::{DynHolder, Holder, HolderValue};
use crate::core::timestamp::{TIMESTAMP_GRAMMAR, Timestamp};
use crate::core::value::{ArrayRef, HolderKind, ObjectRef, Value, WireString};

const BOOL_GRAMMAR: &str = "boolean literal: true or false (any case)";
const BIG_INT_GRAMMAR: &str = "integer literal: optional '-' followed by digits";
const REFERENCE_GRAMMAR: &str = "null (opaque references have no other text form)";

/// A holder value type with a canonical text grammar.
pub trait TextValue: HolderValue {
    /// Human-readable grammar, quoted in parse errors.
    const GRAMMAR: &'static str;

    fn to_text(&self) -> String;

    fn parse_text(text: &str) -> Result<Self, Error>;
}

/// Text access to a holder's slot.
pub trait TextCodec {
    fn kind(&self) -> HolderKind;

    fn get_as_text(&self) -> String;

    fn set_as_text(&mut self, text: &str) -> Result<(), Error>;
}

fn parse_integer_literal(text: &str, grammar: &str) -> Result<BigInt, Error> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::literal(ErrorKind::InvalidNumericLiteral, text, grammar));
    }
    BigInt::parse_bytes(text.as_bytes(), 10)
        .ok_or_else(|| Error::literal(ErrorKind::InvalidNumericLiteral, text, grammar))
}

macro_rules! integer_text_value {
    ($ty:ty, $grammar:literal) => {
        impl TextValue for $ty {
            const GRAMMAR: &'static str = $grammar;

            fn to_text(&self) -> String {
                self.to_string()
            }

            fn parse_text(text: &str) -> Result<Self, Error> {
                let integer = parse_integer_literal(text, Self::GRAMMAR)?;
                <$ty>::try_from(&integer)
                    .map_err(|_| Error::literal(ErrorKind::OutOfRange, text, Self::GRAMMAR))
            }
        }
    };
}

integer_text_value!(i8, "integer literal in -128..=127");
integer_text_value!(i16, "integer literal in -32768..=32767");
integer_text_value!(i32, "integer literal in -2147483648..=2147483647");
integer_text_value!(i64, "integer literal in -9223372036854775808..=9223372036854775807");
integer_text_value!(u8, "integer literal in 0..=255");
integer_text_value!(u16, "integer literal in 0..=65535");
integer_text_value!(u32, "integer literal in 0..=4294967295");
integer_text_value!(u64, "integer literal in 0..=18446744073709551615");

impl TextValue for bool {
    const GRAMMAR: &'static str = BOOL_GRAMMAR;

    fn to_text(&self) -> String {
        self.to_string()
    }

    fn parse_text(text: &str) -> Result<Self, Error> {
        if text.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if text.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(Error::literal(ErrorKind::InvalidType, text, Self::GRAMMAR))
        }
    }
}

impl TextValue for WireString {
    const GRAMMAR: &'static str = "any text";

    fn to_text(&self) -> String {
        self.as_str().unwrap_or_default().to_string()
    }

    fn parse_text(text: &str) -> Result<Self, Error> {
        Ok(WireString::new(text))
    }
}

impl TextValue for Decimal {
    const GRAMMAR: &'static str = DECIMAL_GRAMMAR;

    fn to_text(&self) -> String {
        Decimal::to_text(self)
    }

    fn parse_text(text: &str) -> Result<Self, Error> {
        Decimal::parse(text)
    }
}

impl TextValue for BigInt {
    const GRAMMAR: &'static str = BIG_INT_GRAMMAR;

    fn to_text(&self) -> String {
        self.to_string()
    }

    fn parse_text(text: &str) -> Result<Self, Error> {
        parse_integer_literal(text, Self::GRAMMAR)
    }
}

impl TextValue for Timestamp {
    const GRAMMAR: &'static str = TIMESTAMP_GRAMMAR;

    fn to_text(&self) -> String {
        Timestamp::to_text(self)
    }

    fn parse_text(text: &str) -> Result<Self, Error> {
        Timestamp::parse(text)
    }
}

impl TextValue for ArrayRef {
    const GRAMMAR: &'static str = REFERENCE_GRAMMAR;

    fn to_text(&self) -> String {
        self.describe()
    }

    fn parse_text(text: &str) -> Result<Self, Error> {
        match text {
            "null" => Ok(ArrayRef::absent()),
            _ => Err(Error::literal(ErrorKind::InvalidType, text, Self::GRAMMAR)),
        }
    }
}

impl TextValue for ObjectRef {
    const GRAMMAR: &'static str = REFERENCE_GRAMMAR;

    fn to_text(&self) -> String {
        self.describe()
    }

    fn parse_text(text: &str) -> Result<Self, Error> {
        match text {
            "null" => Ok(ObjectRef::absent()),
            _ => Err(Error::literal(ErrorKind::InvalidType, text, Self::GRAMMAR)),
        }
    }
}

impl<T: TextValue> Holder<T> {
    /// Text constructor; shares its grammar with [`TextAdapter::set_as_text`].
    pub fn parse(text: &str) -> Result<Self, Error> {
        T::parse_text(text).map(Holder::new)
    }
}

/// Text codec owning a private holder.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextAdapter<T: TextValue> {
    holder: Holder<T>,
}

impl<T: TextValue> TextAdapter<T> {
    pub fn new() -> Self {
        Self {
            holder: Holder::default(),
        }
    }

    pub fn with_value(value: T) -> Self {
        Self {
            holder: Holder::new(value),
        }
    }

    pub fn holder(&self) -> &Holder<T> {
        &self.holder
    }

    pub fn holder_mut(&mut self) -> &mut Holder<T> {
        &mut self.holder
    }

    pub fn into_holder(self) -> Holder<T> {
        self.holder
    }
}

impl<T: TextValue> TextCodec for TextAdapter<T> {
    fn kind(&self) -> HolderKind {
        T::KIND
    }

    fn get_as_text(&self) -> String {
        self.holder.get().to_text()
    }

    fn set_as_text(&mut self, text: &str) -> Result<(), Error> {
        self.holder.set(T::parse_text(text)?);
        Ok(())
    }
}

impl TextCodec for DynHolder {
    fn kind(&self) -> HolderKind {
        DynHolder::kind(self)
    }

    fn get_as_text(&self) -> String {
        match self.get() {
            Value::I8(v) => v.to_text(),
            Value::I16(v) => v.to_text(),
            Value::I32(v) => v.to_text(),
            Value::I64(v) => v.to_text(),
            Value::U8(v) => v.to_text(),
            Value::U16(v) => v.to_text(),
            Value::U32(v) => v.to_text(),
            Value::U64(v) => v.to_text(),
            Value::Bool(v) => v.to_text(),
            Value::String(v) => v.to_text(),
            Value::Decimal(v) => TextValue::to_text(v),
            Value::BigInt(v) => v.to_text(),
            Value::Timestamp(v) => TextValue::to_text(v),
            Value::Array(v) => v.to_text(),
            Value::Object(v) => v.to_text(),
        }
    }

    fn set_as_text(&mut self, text: &str) -> Result<(), Error> {
        let value = match DynHolder::kind(self) {
            HolderKind::I8 => i8::parse_text(text)?.into_value(),
            HolderKind::I16 => i16::parse_text(text)?.into_value(),
            HolderKind::I32 => i32::parse_text(text)?.into_value(),
            HolderKind::I64 => i64::parse_text(text)?.into_value(),
            HolderKind::U8 => u8::parse_text(text)?.into_value(),
            HolderKind::U16 => u16::parse_text(text)?.into_value(),
            HolderKind::U32 => u32::parse_text(text)?.into_value(),
            HolderKind::U64 => u64::parse_text(text)?.into_value(),
            HolderKind::Bool => bool::parse_text(text)?.into_value(),
            HolderKind::String => WireString::parse_text(text)?.into_value(),
            HolderKind::Decimal => Decimal::parse_text(text)?.into_value(),
            HolderKind::BigInt => BigInt::parse_text(text)?.into_value(),
            HolderKind::Timestamp => Timestamp::parse_text(text)?.into_value(),
            HolderKind::Array => ArrayRef::parse_text(text)?.into_value(),
            HolderKind::Object => ObjectRef::parse_text(text)?.into_value(),
        };
        self.set(value)
    }
}
