//! Purpose: Closed set of holder kinds and the tagged value union they carry.
//! Exports: `HolderKind`, `Value`, `WireString`, `ArrayRef`, `ObjectRef`.
//! Role: Runtime tag used wherever a holder is chosen dynamically (config, CLI, transports).
//! Invariants: Every kind has exactly one `Value` variant and one canonical name.
//! Invariants: Array and object references compare by identity, never by contents.
use std::any::Any;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use crate::core::decimal::Decimal;
use crate::core::error::{Error, ErrorKind};
use crate::core::timestamp::Timestamp;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolderKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    Bool,
    String,
    Decimal,
    BigInt,
    Timestamp,
    Array,
    Object,
}

impl HolderKind {
    pub const ALL: [HolderKind; 15] = [
        HolderKind::I8,
        HolderKind::I16,
        HolderKind::I32,
        HolderKind::I64,
        HolderKind::U8,
        HolderKind::U16,
        HolderKind::U32,
        HolderKind::U64,
        HolderKind::Bool,
        HolderKind::String,
        HolderKind::Decimal,
        HolderKind::BigInt,
        HolderKind::Timestamp,
        HolderKind::Array,
        HolderKind::Object,
    ];

    pub fn name(self) -> &'static str {
        match self {
            HolderKind::I8 => "i8",
            HolderKind::I16 => "i16",
            HolderKind::I32 => "i32",
            HolderKind::I64 => "i64",
            HolderKind::U8 => "u8",
            HolderKind::U16 => "u16",
            HolderKind::U32 => "u32",
            HolderKind::U64 => "u64",
            HolderKind::Bool => "bool",
            HolderKind::String => "string",
            HolderKind::Decimal => "decimal",
            HolderKind::BigInt => "big_int",
            HolderKind::Timestamp => "timestamp",
            HolderKind::Array => "array",
            HolderKind::Object => "object",
        }
    }

    /// True for the fixed-width integer kinds.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            HolderKind::I8
                | HolderKind::I16
                | HolderKind::I32
                | HolderKind::I64
                | HolderKind::U8
                | HolderKind::U16
                | HolderKind::U32
                | HolderKind::U64
        )
    }
}

impl fmt::Display for HolderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HolderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HolderKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| {
                let names = HolderKind::ALL.map(HolderKind::name).join(", ");
                Error::new(ErrorKind::Usage)
                    .with_message(format!("unknown holder kind {s:?}"))
                    .with_hint(format!("expected one of: {names}"))
            })
    }
}

/// String slot that keeps "absent" apart from the empty default.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct WireString(Option<String>);

impl Default for WireString {
    fn default() -> Self {
        Self(Some(String::new()))
    }
}

impl WireString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Some(value.into()))
    }

    pub fn absent() -> Self {
        Self(None)
    }

    pub fn is_absent(&self) -> bool {
        self.0.is_none()
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn into_option(self) -> Option<String> {
        self.0
    }
}

impl From<&str> for WireString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for WireString {
    fn from(value: String) -> Self {
        Self(Some(value))
    }
}

/// Opaque shared array; equality is pointer identity.
#[derive(Clone, Debug, Default)]
pub struct ArrayRef(Option<Arc<Vec<Value>>>);

impl ArrayRef {
    pub fn new(items: Vec<Value>) -> Self {
        Self(Some(Arc::new(items)))
    }

    pub fn absent() -> Self {
        Self(None)
    }

    pub fn is_absent(&self) -> bool {
        self.0.is_none()
    }

    pub fn items(&self) -> Option<&[Value]> {
        self.0.as_deref().map(Vec::as_slice)
    }

    pub fn describe(&self) -> String {
        match &self.0 {
            None => "null".to_string(),
            Some(items) => format!("array[{}]", items.len()),
        }
    }
}

impl PartialEq for ArrayRef {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (None, None) => true,
            (Some(lhs), Some(rhs)) => Arc::ptr_eq(lhs, rhs),
            _ => false,
        }
    }
}

impl Eq for ArrayRef {}

/// Opaque shared object handed through a call untouched; equality is pointer identity.
#[derive(Clone, Default)]
pub struct ObjectRef(Option<Arc<dyn Any + Send + Sync>>);

impl ObjectRef {
    pub fn new<T: Any + Send + Sync>(object: T) -> Self {
        Self(Some(Arc::new(object)))
    }

    pub fn absent() -> Self {
        Self(None)
    }

    pub fn is_absent(&self) -> bool {
        self.0.is_none()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_deref().and_then(|object| object.downcast_ref::<T>())
    }

    pub fn describe(&self) -> String {
        match &self.0 {
            None => "null".to_string(),
            Some(_) => "object".to_string(),
        }
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            None => f.write_str("ObjectRef(null)"),
            Some(object) => write!(f, "ObjectRef({:p})", Arc::as_ptr(object) as *const ()),
        }
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (None, None) => true,
            (Some(lhs), Some(rhs)) => {
                std::ptr::addr_eq(Arc::as_ptr(lhs), Arc::as_ptr(rhs))
            }
            _ => false,
        }
    }
}

impl Eq for ObjectRef {}

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Bool(bool),
    String(WireString),
    Decimal(Decimal),
    BigInt(BigInt),
    Timestamp(Timestamp),
    Array(ArrayRef),
    Object(ObjectRef),
}

impl Value {
    pub fn kind(&self) -> HolderKind {
        match self {
            Value::I8(_) => HolderKind::I8,
            Value::I16(_) => HolderKind::I16,
            Value::I32(_) => HolderKind::I32,
            Value::I64(_) => HolderKind::I64,
            Value::U8(_) => HolderKind::U8,
            Value::U16(_) => HolderKind::U16,
            Value::U32(_) => HolderKind::U32,
            Value::U64(_) => HolderKind::U64,
            Value::Bool(_) => HolderKind::Bool,
            Value::String(_) => HolderKind::String,
            Value::Decimal(_) => HolderKind::Decimal,
            Value::BigInt(_) => HolderKind::BigInt,
            Value::Timestamp(_) => HolderKind::Timestamp,
            Value::Array(_) => HolderKind::Array,
            Value::Object(_) => HolderKind::Object,
        }
    }

    /// Numeric zero, `false`, the empty string, the epoch, or an absent reference.
    pub fn default_for(kind: HolderKind) -> Value {
        match kind {
            HolderKind::I8 => Value::I8(0),
            HolderKind::I16 => Value::I16(0),
            HolderKind::I32 => Value::I32(0),
            HolderKind::I64 => Value::I64(0),
            HolderKind::U8 => Value::U8(0),
            HolderKind::U16 => Value::U16(0),
            HolderKind::U32 => Value::U32(0),
            HolderKind::U64 => Value::U64(0),
            HolderKind::Bool => Value::Bool(false),
            HolderKind::String => Value::String(WireString::default()),
            HolderKind::Decimal => Value::Decimal(Decimal::default()),
            HolderKind::BigInt => Value::BigInt(BigInt::default()),
            HolderKind::Timestamp => Value::Timestamp(Timestamp::default()),
            HolderKind::Array => Value::Array(ArrayRef::absent()),
            HolderKind::Object => Value::Object(ObjectRef::absent()),
        }
    }

    /// Integral payload of any integer-valued variant.
    pub fn as_bigint(&self) -> Option<BigInt> {
        match self {
            Value::I8(v) => Some(BigInt::from(*v)),
            Value::I16(v) => Some(BigInt::from(*v)),
            Value::I32(v) => Some(BigInt::from(*v)),
            Value::I64(v) => Some(BigInt::from(*v)),
            Value::U8(v) => Some(BigInt::from(*v)),
            Value::U16(v) => Some(BigInt::from(*v)),
            Value::U32(v) => Some(BigInt::from(*v)),
            Value::U64(v) => Some(BigInt::from(*v)),
            Value::BigInt(v) => Some(v.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ArrayRef, HolderKind, ObjectRef, Value, WireString};
    use crate::core::error::ErrorKind;

    #[test]
    fn kind_names_round_trip() {
        for kind in HolderKind::ALL {
            assert_eq!(kind.name().parse::<HolderKind>().unwrap(), kind);
            assert_eq!(Value::default_for(kind).kind(), kind);
        }
        let err = "float".parse::<HolderKind>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert!(err.hint().unwrap().contains("big_int"));
    }

    #[test]
    fn kind_serde_uses_canonical_names() {
        for kind in HolderKind::ALL {
            let json = serde_json::to_string(&kind).expect("serialize");
            assert_eq!(json, format!("\"{}\"", kind.name()));
        }
    }

    #[test]
    fn empty_string_is_not_absent() {
        let empty = WireString::default();
        assert_eq!(empty.as_str(), Some(""));
        assert!(!empty.is_absent());
        assert_ne!(empty, WireString::absent());
    }

    #[test]
    fn references_compare_by_identity() {
        let first = ArrayRef::new(vec![Value::U8(1)]);
        let same_contents = ArrayRef::new(vec![Value::U8(1)]);
        assert_eq!(first, first.clone());
        assert_ne!(first, same_contents);
        assert_eq!(ArrayRef::absent(), ArrayRef::default());
        assert_eq!(first.describe(), "array[1]");

        let object = ObjectRef::new(String::from("session"));
        assert_eq!(object, object.clone());
        assert_ne!(object, ObjectRef::new(String::from("session")));
        assert_eq!(object.downcast_ref::<String>().map(String::as_str), Some("session"));
        assert!(object.downcast_ref::<u32>().is_none());
    }
}
