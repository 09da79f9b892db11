//! Primary stream identity and cardinality.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The three independently-acquired data sources of one experiment.
///
/// The set of stream kinds is fixed and exhaustive, so streams are modeled
/// as a closed enum with uniform accessors rather than trait objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    /// Line-scan images.
    Scans,
    /// Full-frame images.
    Scene,
    /// Electrophysiology recordings (one sweep per frame slot).
    Ephys,
}

impl StreamKind {
    /// All stream kinds, in master-priority order.
    pub const ALL: [StreamKind; 3] = [StreamKind::Scans, StreamKind::Scene, StreamKind::Ephys];

    /// Whether this kind carries image data (only image streams can be
    /// master under the base selection rule).
    pub fn is_imaging(&self) -> bool {
        !matches!(self, StreamKind::Ephys)
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Scans => write!(f, "scans"),
            StreamKind::Scene => write!(f, "scene"),
            StreamKind::Ephys => write!(f, "ephys"),
        }
    }
}

/// One named data source with a queryable frame/sweep count.
///
/// A stream with `present == false` is indistinguishable from one with a
/// zero frame count: loaders mark streams absent rather than deleting them,
/// and `effective_frame_count` collapses the two representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryStream {
    /// Which of the three sources this is.
    pub kind: StreamKind,
    /// Native frame (or sweep) count as reported by the loader.
    pub frame_count: usize,
    /// Whether the loader found this stream at all.
    pub present: bool,
}

impl PrimaryStream {
    /// Create a present stream with the given frame count.
    pub fn new(kind: StreamKind, frame_count: usize) -> Self {
        Self {
            kind,
            frame_count,
            present: true,
        }
    }

    /// Create an absent stream.
    pub fn missing(kind: StreamKind) -> Self {
        Self {
            kind,
            frame_count: 0,
            present: false,
        }
    }

    /// Frame count with absence collapsed to zero.
    pub fn effective_frame_count(&self) -> usize {
        if self.present {
            self.frame_count
        } else {
            0
        }
    }
}

/// The streams of one experiment, keyed by the closed kind set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSet {
    scans: PrimaryStream,
    scene: PrimaryStream,
    ephys: PrimaryStream,
}

impl StreamSet {
    /// Create a stream set with all three streams absent.
    pub fn new() -> Self {
        Self {
            scans: PrimaryStream::missing(StreamKind::Scans),
            scene: PrimaryStream::missing(StreamKind::Scene),
            ephys: PrimaryStream::missing(StreamKind::Ephys),
        }
    }

    /// Get the stream record for a kind.
    pub fn get(&self, kind: StreamKind) -> &PrimaryStream {
        match kind {
            StreamKind::Scans => &self.scans,
            StreamKind::Scene => &self.scene,
            StreamKind::Ephys => &self.ephys,
        }
    }

    fn get_mut(&mut self, kind: StreamKind) -> &mut PrimaryStream {
        match kind {
            StreamKind::Scans => &mut self.scans,
            StreamKind::Scene => &mut self.scene,
            StreamKind::Ephys => &mut self.ephys,
        }
    }

    /// Attach (or replace) a stream record.
    pub fn attach(&mut self, stream: PrimaryStream) {
        *self.get_mut(stream.kind) = stream;
    }

    /// Detach a stream, returning it to the absent state.
    pub fn detach(&mut self, kind: StreamKind) {
        *self.get_mut(kind) = PrimaryStream::missing(kind);
    }

    /// Update the frame count of a stream in place. Attaching via count is
    /// not supported: an absent stream stays absent.
    pub fn set_frame_count(&mut self, kind: StreamKind, frame_count: usize) {
        let stream = self.get_mut(kind);
        if stream.present {
            stream.frame_count = frame_count;
        }
    }

    /// Whether the stream was found by its loader.
    pub fn is_present(&self, kind: StreamKind) -> bool {
        self.get(kind).present
    }

    /// Effective frame count for a kind (zero when absent).
    pub fn frame_count(&self, kind: StreamKind) -> usize {
        self.get(kind).effective_frame_count()
    }

    /// Iterate over all three stream records.
    pub fn iter(&self) -> impl Iterator<Item = &PrimaryStream> {
        [&self.scans, &self.scene, &self.ephys].into_iter()
    }
}

impl Default for StreamSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_stream_has_zero_effective_count() {
        let mut stream = PrimaryStream::missing(StreamKind::Scene);
        assert_eq!(stream.effective_frame_count(), 0);

        // A stale count behind the absent flag still reads as zero
        stream.frame_count = 12;
        assert_eq!(stream.effective_frame_count(), 0);

        stream.present = true;
        assert_eq!(stream.effective_frame_count(), 12);
    }

    #[test]
    fn stream_set_attach_detach() {
        let mut streams = StreamSet::new();
        assert!(!streams.is_present(StreamKind::Scans));

        streams.attach(PrimaryStream::new(StreamKind::Scans, 40));
        assert!(streams.is_present(StreamKind::Scans));
        assert_eq!(streams.frame_count(StreamKind::Scans), 40);

        streams.detach(StreamKind::Scans);
        assert!(!streams.is_present(StreamKind::Scans));
        assert_eq!(streams.frame_count(StreamKind::Scans), 0);
    }

    #[test]
    fn set_frame_count_ignores_absent_streams() {
        let mut streams = StreamSet::new();
        streams.set_frame_count(StreamKind::Ephys, 7);
        assert!(!streams.is_present(StreamKind::Ephys));
        assert_eq!(streams.frame_count(StreamKind::Ephys), 0);

        streams.attach(PrimaryStream::new(StreamKind::Ephys, 3));
        streams.set_frame_count(StreamKind::Ephys, 7);
        assert_eq!(streams.frame_count(StreamKind::Ephys), 7);
    }

    #[test]
    fn stream_kind_serializes_lowercase() {
        let json = serde_json::to_string(&StreamKind::Ephys).unwrap();
        assert_eq!(json, "\"ephys\"");

        let parsed: StreamKind = serde_json::from_str("\"scans\"").unwrap();
        assert_eq!(parsed, StreamKind::Scans);
    }

    #[test]
    fn stream_kind_display_matches_loader_names() {
        assert_eq!(StreamKind::Scans.to_string(), "scans");
        assert_eq!(StreamKind::Scene.to_string(), "scene");
        assert_eq!(StreamKind::Ephys.to_string(), "ephys");
    }

    #[test]
    fn only_image_kinds_are_imaging() {
        assert!(StreamKind::Scans.is_imaging());
        assert!(StreamKind::Scene.is_imaging());
        assert!(!StreamKind::Ephys.is_imaging());
    }
}
