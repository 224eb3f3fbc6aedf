//! Field Behavior System
//!
//! This module provides the per-kind behavior of fields:
//!
//! - `FieldBehavior` trait - normalize, denormalize, legal operators, compare
//! - `ValueCodec` - async normalization including adapter resolution
//! - `AdapterBridge` - bounded, uncached embed metadata lookups
//!
//! Field kinds form a closed enum; the trait is implemented once on
//! `FieldKind` rather than per type.

pub mod adapter_bridge;
pub mod codec;
pub mod decimal;

pub use adapter_bridge::AdapterBridge;
pub use codec::{FieldBehavior, Normalized, ValueCodec};
