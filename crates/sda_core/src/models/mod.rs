//! Data models for the alignment core.
//!
//! This module contains the plain data structures the reconciliation logic
//! operates on:
//! - Stream identity and cardinality (StreamKind, PrimaryStream, StreamSet)
//! - Frame vocabulary (RealFrame, FrameLookup, FrameOverride)
//! - Data bound to the frame index (DerivedData, AuxiliaryData)

mod bindings;
mod frames;
mod streams;

// Re-export all public types
pub use bindings::{AuxiliaryData, AuxiliaryKind, DerivedData};
pub use frames::{FrameLookup, FrameOverride, OverrideMap, RealFrame};
pub use streams::{PrimaryStream, StreamKind, StreamSet};
