//! Purpose: Define the stable public Rust API boundary for wirebox.
//! Exports: Core types and operations needed by transports and the CLI.
//! Role: Public, additive-only surface over the core modules.
//! Invariants: Items re-exported here keep their names and semantics across minor releases.

pub use crate::core::buffer::{ByteBuffer, ByteOrder, MAX_BUFFER_LEN, SubView, WireBuf};
pub use crate::core::codec::{TextAdapter, TextCodec, TextValue};
pub use crate::core::context_map::{CallContextMap, ContextHandle};
pub use crate::core::decimal::{Decimal, Rounding};
#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::fault::{Facility, Fault, FaultKind, Severity};
pub use crate::core::holder::{DynHolder, Holder, HolderValue};
pub use crate::core::params::ParameterSet;
pub use crate::core::registry::{CallIdRegistry, check_reply};
pub use crate::core::structure::{Layout, Structure, StructureView};
pub use crate::core::timestamp::Timestamp;
pub use crate::core::value::{ArrayRef, HolderKind, ObjectRef, Value, WireString};
pub use crate::core::xid::Xid;
