//! Purpose: Shared library crate used by the `wirebox` CLI and by IPC transports.
//! Exports: `api` (stable surface), `core` (buffers, decimals, views, holders, registries, errors).
//! Role: Marshalling layer between transport byte streams and typed values.
//! Invariants: Transports own registries and maps explicitly; the crate holds no global state.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod api;
pub mod core;
