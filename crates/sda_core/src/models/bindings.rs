//! Data bound to the virtual frame index: derived and auxiliary records.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::frames::{FrameLookup, RealFrame};
use super::streams::StreamKind;

/// Kind of auxiliary record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuxiliaryKind {
    /// A stimulation/trigger protocol applied during acquisition.
    TriggerProtocol,
    /// A unit of analysis spanning imaging and ephys frames.
    AnalysisUnit,
}

impl fmt::Display for AuxiliaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuxiliaryKind::TriggerProtocol => write!(f, "trigger protocol"),
            AuxiliaryKind::AnalysisUnit => write!(f, "analysis unit"),
        }
    }
}

/// Per-frame data computed from exactly one primary stream.
///
/// Derived data is frame-for-frame with its source by construction: it is
/// computed directly from that stream and never cross-referenced through
/// the virtual index, so its cardinality tracks the source one-to-one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedData {
    /// Analysis-assigned label (e.g. "roi mean", "dF/F").
    pub name: String,
    /// The single stream this data was computed from.
    pub source: StreamKind,
    /// Frame count; kept equal to the source's effective count by the
    /// binder.
    pub frame_count: usize,
}

impl DerivedData {
    /// Create a derived record for a source stream.
    pub fn new(name: impl Into<String>, source: StreamKind, frame_count: usize) -> Self {
        Self {
            name: name.into(),
            source,
            frame_count,
        }
    }
}

/// Auxiliary record referencing both imaging and ephys frames.
///
/// Created by the user or a detector with however many rows the creating
/// tool produced (`native_count`, immutable). Normalization reconciles that
/// row count against the virtual frame index and attaches a lookup table so
/// per-frame queries resolve in O(1); afterwards `frame_count` equals the
/// virtual frame count. Must be renormalized after every successful index
/// rebuild - renormalization always starts from the native row count, so a
/// changed virtual count cannot compound through repeated normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuxiliaryData {
    /// User- or detector-assigned label.
    pub name: String,
    /// What this record represents.
    pub kind: AuxiliaryKind,
    /// The streams this record references.
    pub related: Vec<StreamKind>,
    /// Native row count as produced by the creating tool.
    native_count: usize,
    /// Native count before normalization, virtual frame count after.
    pub frame_count: usize,
    /// Attached by the binder on normalization; never persisted (the
    /// lookup is always rebuilt from counts and stored overrides on load).
    #[serde(skip)]
    lookup: Option<FrameLookup>,
}

impl AuxiliaryData {
    /// Create an un-normalized auxiliary record with `frame_count` rows.
    pub fn new(
        name: impl Into<String>,
        kind: AuxiliaryKind,
        related: Vec<StreamKind>,
        frame_count: usize,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            related,
            native_count: frame_count,
            frame_count,
            lookup: None,
        }
    }

    /// Row count as produced by the creating tool.
    pub fn native_count(&self) -> usize {
        self.native_count
    }

    /// Whether this record has been normalized against an index.
    pub fn is_normalized(&self) -> bool {
        self.lookup.is_some()
    }

    /// Resolve which of this record's native rows applies to a virtual
    /// frame. `None` before normalization or outside the frame range.
    pub fn real_frame(&self, virtual_frame: usize) -> Option<RealFrame> {
        self.lookup.as_ref()?.get(virtual_frame)
    }

    pub(crate) fn attach_lookup(&mut self, lookup: FrameLookup, frame_count: usize) {
        self.frame_count = frame_count;
        self.lookup = Some(lookup);
    }
}
