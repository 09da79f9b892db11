//! Virtual-to-real frame vocabulary.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::streams::StreamKind;

/// The real-frame answer for one virtual frame of one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RealFrame {
    /// Real frame (or sweep) index in the stream's native numbering.
    Frame(usize),
    /// No real data maps to this virtual frame in this stream.
    Absent,
}

impl RealFrame {
    /// Check if no real data backs this virtual frame.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Get the real index if one exists.
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Frame(idx) => Some(*idx),
            Self::Absent => None,
        }
    }
}

impl From<Option<usize>> for RealFrame {
    fn from(value: Option<usize>) -> Self {
        match value {
            Some(idx) => Self::Frame(idx),
            None => Self::Absent,
        }
    }
}

impl fmt::Display for RealFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Frame(idx) => write!(f, "frame {}", idx),
            Self::Absent => write!(f, "absent"),
        }
    }
}

/// Per-stream mapping from virtual frame index to real frame.
///
/// Immutable once built. When stream counts change, the owning index is
/// rebuilt wholesale and a fresh table replaces this one; the table itself
/// is never edited in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLookup {
    slots: Vec<RealFrame>,
}

impl FrameLookup {
    /// The empty table (an experiment with zero virtual frames).
    pub fn empty() -> Self {
        Self { slots: Vec::new() }
    }

    /// Identity table: virtual frame k maps to real frame k.
    pub fn identity(len: usize) -> Self {
        Self {
            slots: (0..len).map(RealFrame::Frame).collect(),
        }
    }

    /// Broadcast table: every virtual frame maps to real frame 0.
    pub fn broadcast(len: usize) -> Self {
        Self {
            slots: vec![RealFrame::Frame(0); len],
        }
    }

    /// Table where no virtual frame has real data.
    pub fn absent(len: usize) -> Self {
        Self {
            slots: vec![RealFrame::Absent; len],
        }
    }

    /// Build a table from explicit slots.
    pub fn from_slots(slots: Vec<RealFrame>) -> Self {
        Self { slots }
    }

    /// Number of virtual frames covered.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the table covers no virtual frames.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Resolve a virtual frame, `None` outside `[0, len)`.
    pub fn get(&self, virtual_frame: usize) -> Option<RealFrame> {
        self.slots.get(virtual_frame).copied()
    }

    /// Iterate over the slots in virtual-frame order.
    pub fn iter(&self) -> impl Iterator<Item = RealFrame> + '_ {
        self.slots.iter().copied()
    }
}

/// Externally supplied virtual→real dictionary.
///
/// Required for the reconciliation cases where the mapping is not derivable
/// from frame counts alone (fewer or more real frames than virtual frames).
/// The core never infers these; loaders or the user supply them, and the
/// persistence layer stores them as plain data. `None` entries mark virtual
/// frames with no real counterpart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameOverride {
    entries: Vec<Option<usize>>,
}

impl FrameOverride {
    /// Create from one entry per virtual frame.
    pub fn from_entries(entries: Vec<Option<usize>>) -> Self {
        Self { entries }
    }

    /// Create from fully-mapped real indices (no skipped virtual frames).
    pub fn mapped(reals: impl IntoIterator<Item = usize>) -> Self {
        Self {
            entries: reals.into_iter().map(Some).collect(),
        }
    }

    /// Number of virtual frames this dictionary covers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dictionary has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the entries in virtual-frame order.
    pub fn iter(&self) -> impl Iterator<Item = Option<usize>> + '_ {
        self.entries.iter().copied()
    }
}

/// Stored overrides per non-master stream.
pub type OverrideMap = BTreeMap<StreamKind, FrameOverride>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_frame_accessors() {
        assert_eq!(RealFrame::Frame(3).index(), Some(3));
        assert!(!RealFrame::Frame(3).is_absent());
        assert_eq!(RealFrame::Absent.index(), None);
        assert!(RealFrame::Absent.is_absent());
    }

    #[test]
    fn real_frame_from_option() {
        assert_eq!(RealFrame::from(Some(5)), RealFrame::Frame(5));
        assert_eq!(RealFrame::from(None), RealFrame::Absent);
    }

    #[test]
    fn identity_table_maps_each_frame_to_itself() {
        let table = FrameLookup::identity(4);
        assert_eq!(table.len(), 4);
        for k in 0..4 {
            assert_eq!(table.get(k), Some(RealFrame::Frame(k)));
        }
        assert_eq!(table.get(4), None);
    }

    #[test]
    fn broadcast_table_maps_everything_to_zero() {
        let table = FrameLookup::broadcast(3);
        for k in 0..3 {
            assert_eq!(table.get(k), Some(RealFrame::Frame(0)));
        }
    }

    #[test]
    fn absent_table_has_no_real_data() {
        let table = FrameLookup::absent(2);
        assert_eq!(table.get(0), Some(RealFrame::Absent));
        assert_eq!(table.get(1), Some(RealFrame::Absent));
    }

    #[test]
    fn empty_table_answers_nothing() {
        let table = FrameLookup::empty();
        assert!(table.is_empty());
        assert_eq!(table.get(0), None);
    }

    #[test]
    fn override_round_trips_through_json() {
        let ov = FrameOverride::from_entries(vec![Some(0), None, Some(2)]);
        let json = serde_json::to_string(&ov).unwrap();
        let parsed: FrameOverride = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ov);
    }

    #[test]
    fn mapped_override_has_no_gaps() {
        let ov = FrameOverride::mapped([4, 4, 5]);
        assert_eq!(ov.len(), 3);
        assert!(ov.iter().all(|entry| entry.is_some()));
    }
}
