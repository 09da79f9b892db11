//! Binding derived and auxiliary data to the frame cardinality.
//!
//! Derived data is frame-for-frame with its single source stream and never
//! goes through the index. Auxiliary data is reconciled against the virtual
//! frame count with the same four cases as a non-master stream, treating
//! the index as the master side of the mapping.
//!
//! Neither binder subscribes to anything: the owning aggregate re-invokes
//! `normalize_auxiliary` after every successful index rebuild.

use tracing::debug;

use crate::models::{AuxiliaryData, DerivedData, FrameOverride, PrimaryStream};

use super::errors::{AlignmentError, AlignmentResult};
use super::index::VirtualFrameIndex;
use super::lookup;

/// Bind a derived record to its source stream.
///
/// Sets the record's frame count to the source's effective count. Fails
/// with [`AlignmentError::SourceMismatch`] if the record claims a different
/// source, leaving the record untouched.
pub fn bind_derived(derived: &mut DerivedData, source: &PrimaryStream) -> AlignmentResult<()> {
    if derived.source != source.kind {
        return Err(AlignmentError::source_mismatch(derived.source, source.kind));
    }
    derived.frame_count = source.effective_frame_count();
    Ok(())
}

/// Normalize an auxiliary record against the virtual frame index.
///
/// The record's native row count versus `index.frame_count()` goes through
/// the same four reconciliation cases as a non-master stream, with the same
/// ambiguity semantics; `overrides` supplies the mapping for the ambiguous
/// cases. On success the record's count becomes the virtual frame count and
/// a lookup is attached so per-frame queries resolve in O(1). On failure
/// the record is untouched. Renormalization after a rebuild starts from the
/// native count again, so it stays well-defined however often the index
/// changes.
pub fn normalize_auxiliary(
    aux: &mut AuxiliaryData,
    index: &VirtualFrameIndex,
    overrides: Option<&FrameOverride>,
) -> AlignmentResult<()> {
    let table = lookup::build(index.frame_count(), aux.native_count(), overrides)?;

    debug!(
        name = %aux.name,
        kind = %aux.kind,
        native_count = aux.native_count(),
        frame_count = index.frame_count(),
        "normalized auxiliary record"
    );

    aux.attach_lookup(table, index.frame_count());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AuxiliaryKind, OverrideMap, PrimaryStream, RealFrame, StreamKind, StreamSet,
    };
    use crate::alignment::master::MasterPolicy;

    fn index_with_scans(frame_count: usize) -> VirtualFrameIndex {
        let mut streams = StreamSet::new();
        streams.attach(PrimaryStream::new(StreamKind::Scans, frame_count));
        VirtualFrameIndex::build(&streams, &OverrideMap::new(), MasterPolicy::default()).unwrap()
    }

    #[test]
    fn derived_tracks_its_source_count() {
        let source = PrimaryStream::new(StreamKind::Scans, 40);
        let mut derived = DerivedData::new("roi mean", StreamKind::Scans, 0);

        bind_derived(&mut derived, &source).unwrap();
        assert_eq!(derived.frame_count, 40);
    }

    #[test]
    fn derived_tracks_an_absent_source_to_zero() {
        let source = PrimaryStream::missing(StreamKind::Scene);
        let mut derived = DerivedData::new("background", StreamKind::Scene, 9);

        bind_derived(&mut derived, &source).unwrap();
        assert_eq!(derived.frame_count, 0);
    }

    #[test]
    fn derived_rejects_a_foreign_source() {
        let source = PrimaryStream::new(StreamKind::Ephys, 12);
        let mut derived = DerivedData::new("roi mean", StreamKind::Scans, 5);

        let err = bind_derived(&mut derived, &source).unwrap_err();
        assert!(matches!(
            err,
            AlignmentError::SourceMismatch {
                expected: StreamKind::Scans,
                actual: StreamKind::Ephys
            }
        ));
        // Record untouched on failure
        assert_eq!(derived.frame_count, 5);
    }

    #[test]
    fn auxiliary_with_matching_count_normalizes_to_identity() {
        let index = index_with_scans(6);
        let mut aux = AuxiliaryData::new(
            "stim A",
            AuxiliaryKind::TriggerProtocol,
            vec![StreamKind::Scans, StreamKind::Ephys],
            6,
        );

        normalize_auxiliary(&mut aux, &index, None).unwrap();
        assert_eq!(aux.frame_count, 6);
        assert_eq!(aux.real_frame(3), Some(RealFrame::Frame(3)));
    }

    #[test]
    fn singleton_auxiliary_applies_to_every_frame() {
        let index = index_with_scans(8);
        let mut aux = AuxiliaryData::new(
            "baseline protocol",
            AuxiliaryKind::TriggerProtocol,
            vec![StreamKind::Scans],
            1,
        );

        normalize_auxiliary(&mut aux, &index, None).unwrap();
        assert_eq!(aux.frame_count, 8);
        for k in 0..8 {
            assert_eq!(aux.real_frame(k), Some(RealFrame::Frame(0)));
        }
    }

    #[test]
    fn ambiguous_auxiliary_fails_and_stays_untouched() {
        let index = index_with_scans(6);
        let mut aux = AuxiliaryData::new(
            "epsc units",
            AuxiliaryKind::AnalysisUnit,
            vec![StreamKind::Ephys],
            4,
        );

        let err = normalize_auxiliary(&mut aux, &index, None).unwrap_err();
        assert!(matches!(err, AlignmentError::AmbiguousMapping { .. }));
        assert_eq!(aux.frame_count, 4);
        assert!(!aux.is_normalized());
    }

    #[test]
    fn auxiliary_override_resolves_the_ambiguity() {
        let index = index_with_scans(6);
        let mut aux = AuxiliaryData::new(
            "epsc units",
            AuxiliaryKind::AnalysisUnit,
            vec![StreamKind::Ephys],
            4,
        );
        let ov = FrameOverride::mapped([0, 0, 1, 2, 3, 3]);

        normalize_auxiliary(&mut aux, &index, Some(&ov)).unwrap();
        assert_eq!(aux.frame_count, 6);
        assert_eq!(aux.real_frame(5), Some(RealFrame::Frame(3)));
    }

    #[test]
    fn renormalization_starts_from_the_native_count() {
        let mut aux = AuxiliaryData::new(
            "baseline protocol",
            AuxiliaryKind::TriggerProtocol,
            vec![StreamKind::Scans],
            1,
        );

        normalize_auxiliary(&mut aux, &index_with_scans(4), None).unwrap();
        assert_eq!(aux.frame_count, 4);

        // The master grew; a singleton record still broadcasts
        normalize_auxiliary(&mut aux, &index_with_scans(6), None).unwrap();
        assert_eq!(aux.frame_count, 6);
        assert_eq!(aux.real_frame(5), Some(RealFrame::Frame(0)));
    }

    #[test]
    fn auxiliary_against_empty_index_collapses_to_zero() {
        let index = VirtualFrameIndex::empty();
        let mut aux = AuxiliaryData::new(
            "stim A",
            AuxiliaryKind::TriggerProtocol,
            vec![StreamKind::Scans],
            3,
        );

        normalize_auxiliary(&mut aux, &index, None).unwrap();
        assert_eq!(aux.frame_count, 0);
        assert!(aux.is_normalized());
        assert_eq!(aux.real_frame(0), None);
    }
}
