//! Domain types shared by the FluxEngine admission pipeline and HTTP layer.
//!
//! This crate has zero internal dependencies: it holds the job value object,
//! the typed per-kind payloads validated at admission, the job lifecycle
//! state machine, the statistics engine, and the domain error type.

pub mod error;
pub mod job;
pub mod payload;
pub mod statistics;
pub mod types;
