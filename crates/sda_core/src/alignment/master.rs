//! Master stream selection.
//!
//! The master's frame count defines the experiment's virtual frame
//! cardinality. The base rule only considers image streams: `scans` is
//! master whenever present, otherwise `scene`. `ephys` is never chosen by
//! the base rule; what happens when no image stream exists at all is a
//! policy decision, not a guess.

use serde::{Deserialize, Serialize};

use crate::models::{StreamKind, StreamSet};

/// Policy for experiments with no image streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MasterPolicy {
    /// Only `scans`/`scene` may be master. Ephys-only experiments are
    /// degenerate: zero virtual frames.
    #[default]
    ImageOnly,
    /// A present ephys stream becomes master when no image stream is,
    /// giving ephys-only experiments a virtual frame per sweep.
    EphysFallback,
}

/// Choose the master from image-stream presence alone.
///
/// Pure and total: `scans` wins whenever present, regardless of `scene`;
/// no image data means no master.
pub fn select(scans_present: bool, scene_present: bool) -> Option<StreamKind> {
    if scans_present {
        Some(StreamKind::Scans)
    } else if scene_present {
        Some(StreamKind::Scene)
    } else {
        None
    }
}

/// Resolve the master for a stream set under the given policy.
pub fn resolve(streams: &StreamSet, policy: MasterPolicy) -> Option<StreamKind> {
    select(
        streams.is_present(StreamKind::Scans),
        streams.is_present(StreamKind::Scene),
    )
    .or_else(|| match policy {
        MasterPolicy::EphysFallback if streams.is_present(StreamKind::Ephys) => {
            Some(StreamKind::Ephys)
        }
        _ => None,
    })
}
