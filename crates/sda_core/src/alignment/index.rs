//! The virtual frame index.
//!
//! An immutable snapshot of the reconciliation result: the master
//! assignment, the virtual frame count, and one lookup table per present
//! non-master stream. "Rebuild" means constructing a fresh index and
//! swapping the reference; a snapshot is never edited after construction,
//! so readers always see a consistent state.

use std::collections::BTreeMap;

use tracing::debug;

use crate::models::{FrameLookup, OverrideMap, RealFrame, StreamKind, StreamSet};

use super::errors::{AlignmentError, AlignmentResult};
use super::lookup;
use super::master::{self, MasterPolicy};

/// Mapping from virtual frame indices to per-stream real frames.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualFrameIndex {
    master: Option<StreamKind>,
    frame_count: usize,
    lookups: BTreeMap<StreamKind, FrameLookup>,
}

impl VirtualFrameIndex {
    /// The empty index: no master, zero virtual frames, no registered
    /// streams. Every experiment without image data (under the default
    /// policy) lives here, and all consumers must tolerate it.
    pub fn empty() -> Self {
        Self {
            master: None,
            frame_count: 0,
            lookups: BTreeMap::new(),
        }
    }

    /// Build an index for the given streams.
    ///
    /// Resolves the master under `policy`, then builds a lookup table for
    /// every present non-master stream, consulting `overrides` for the
    /// ambiguous count relationships. Any single failure aborts the whole
    /// build, so a caller holding a previous index keeps it intact.
    pub fn build(
        streams: &StreamSet,
        overrides: &OverrideMap,
        policy: MasterPolicy,
    ) -> AlignmentResult<Self> {
        let Some(master_kind) = master::resolve(streams, policy) else {
            debug!("no master stream; building empty index");
            return Ok(Self::empty());
        };

        let master_count = streams.frame_count(master_kind);
        let mut lookups = BTreeMap::new();

        for kind in StreamKind::ALL {
            if kind == master_kind || !streams.is_present(kind) {
                continue;
            }
            let table = lookup::build(
                master_count,
                streams.frame_count(kind),
                overrides.get(&kind),
            )?;
            lookups.insert(kind, table);
        }

        debug!(
            master = %master_kind,
            frame_count = master_count,
            streams = lookups.len() + 1,
            "built virtual frame index"
        );

        Ok(Self {
            master: Some(master_kind),
            frame_count: master_count,
            lookups,
        })
    }

    /// The experiment's virtual frame count (the master's frame count, or
    /// zero without a master).
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// The master stream, if any.
    pub fn master(&self) -> Option<StreamKind> {
        self.master
    }

    /// Whether this is the empty index.
    pub fn is_empty(&self) -> bool {
        self.master.is_none()
    }

    /// Whether a stream participates in this index.
    pub fn registered(&self, kind: StreamKind) -> bool {
        self.master == Some(kind) || self.lookups.contains_key(&kind)
    }

    /// Resolve the real frame of `kind` behind a virtual frame.
    ///
    /// The master answers with the virtual frame itself (biunivocal, no
    /// table consulted); other registered streams go through their lookup.
    /// Out-of-range virtual frames and unregistered streams are caller
    /// bugs and fail accordingly.
    pub fn real_index(&self, kind: StreamKind, virtual_frame: usize) -> AlignmentResult<RealFrame> {
        if self.master == Some(kind) {
            if virtual_frame < self.frame_count {
                return Ok(RealFrame::Frame(virtual_frame));
            }
            return Err(AlignmentError::out_of_range(virtual_frame, self.frame_count));
        }

        let table = self
            .lookups
            .get(&kind)
            .ok_or_else(|| AlignmentError::unknown_stream(kind))?;
        table
            .get(virtual_frame)
            .ok_or_else(|| AlignmentError::out_of_range(virtual_frame, self.frame_count))
    }
}

impl Default for VirtualFrameIndex {
    fn default() -> Self {
        Self::empty()
    }
}
