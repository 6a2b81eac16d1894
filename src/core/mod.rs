// Core modules implementing buffers, numeric types, holders, views and call bookkeeping.
pub mod buffer;
pub mod codec;
pub mod context_map;
pub mod decimal;
pub mod error;
pub mod fault;
pub mod holder;
pub mod params;
pub mod registry;
pub mod structure;
pub mod timestamp;
pub mod value;
pub mod xid;
