//! SDA Core - Scan-data alignment for multi-modal recordings.
//!
//! This crate establishes a single virtual frame index across the
//! independently-acquired data streams of one experiment (line scans,
//! full-frame scenes, electrophysiology sweeps) whose native frame counts
//! may disagree. It contains no I/O and no UI dependencies; file readers
//! and viewers consume it as a plain library.

pub mod alignment;
pub mod config;
pub mod logging;
pub mod models;
pub mod scan_data;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}
