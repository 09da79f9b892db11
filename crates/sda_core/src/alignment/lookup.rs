//! Frame-lookup construction.
//!
//! This module is the single source of truth for reconciling one stream's
//! frame count against the master count. Four cases, evaluated in priority
//! order, first match wins:
//!
//! 1. **Equal counts** - identity mapping.
//! 2. **Singleton** (`other == 1`, `master != 1`) - every virtual frame
//!    maps to real frame 0: a lone frame (e.g. one reference scene
//!    snapshot) contextualizes the whole experiment.
//! 3. **Sparse** (`1 < other < master`) - some virtual frames must share a
//!    real frame. The pattern is not derivable from counts alone; an
//!    explicit frame lookup is required.
//! 4. **Surplus** (`other > master`) - some real frames go unlinked. As in
//!    case 3, an explicit frame lookup is required.
//!
//! Edge cases: a zero master count builds the empty table; a zero other
//! count maps every virtual frame to absent. Neither is an error.

use tracing::debug;

use crate::models::{FrameLookup, FrameOverride, RealFrame};

use super::errors::{AlignmentError, AlignmentResult};

/// Build the lookup table for one non-master stream.
///
/// `overrides`, when given, is consulted only for the ambiguous cases (3
/// and 4); the unambiguous cases ignore it. Without an override those
/// cases fail with [`AlignmentError::AmbiguousMapping`] - the core never
/// guesses a correspondence.
pub fn build(
    master_count: usize,
    other_count: usize,
    overrides: Option<&FrameOverride>,
) -> AlignmentResult<FrameLookup> {
    if master_count == 0 {
        return Ok(FrameLookup::empty());
    }
    if other_count == 0 {
        return Ok(FrameLookup::absent(master_count));
    }
    if other_count == master_count {
        return Ok(FrameLookup::identity(master_count));
    }
    if other_count == 1 {
        return Ok(FrameLookup::broadcast(master_count));
    }

    // Sparse or surplus: the mapping must come from outside
    match overrides {
        Some(ov) => {
            debug!(
                master_count,
                other_count, "building frame lookup from supplied override"
            );
            from_override(master_count, other_count, ov)
        }
        None => Err(AlignmentError::ambiguous(master_count, other_count)),
    }
}

/// Validate and materialize an externally supplied lookup.
fn from_override(
    master_count: usize,
    other_count: usize,
    overrides: &FrameOverride,
) -> AlignmentResult<FrameLookup> {
    if overrides.len() != master_count {
        return Err(AlignmentError::invalid_override(format!(
            "expected {} entries (one per virtual frame), got {}",
            master_count,
            overrides.len()
        )));
    }

    let mut slots = Vec::with_capacity(master_count);
    for (virtual_frame, entry) in overrides.iter().enumerate() {
        if let Some(real) = entry {
            if real >= other_count {
                return Err(AlignmentError::invalid_override(format!(
                    "virtual frame {} maps to real frame {}, but the stream has {} frames",
                    virtual_frame, real, other_count
                )));
            }
        }
        slots.push(RealFrame::from(entry));
    }

    Ok(FrameLookup::from_slots(slots))
}
