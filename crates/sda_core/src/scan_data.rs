//! The experiment aggregate.
//!
//! `ScanData` owns the primary streams of one experiment together with the
//! stored overrides, the registered derived/auxiliary records, and the
//! currently published [`VirtualFrameIndex`]. Publication is copy-on-write:
//! a rebuild constructs a fresh index and freshly normalized auxiliary
//! records, then a single swap makes them visible. A failed rebuild leaves
//! everything previously published untouched and usable.
//!
//! The core is single-threaded by design; the lock around the published
//! `Arc` is only the swap-guard that keeps the replacement atomic when the
//! embedding application reads from another thread. All mutation still has
//! to be serialized by the embedder.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::alignment::{binders, AlignmentResult, MasterPolicy, VirtualFrameIndex};
use crate::models::{
    AuxiliaryData, DerivedData, FrameOverride, OverrideMap, PrimaryStream, RealFrame, StreamKind,
    StreamSet,
};

/// One experiment's streams, bound data, and published frame index.
pub struct ScanData {
    streams: StreamSet,
    overrides: OverrideMap,
    aux_overrides: BTreeMap<String, FrameOverride>,
    policy: MasterPolicy,
    derived: Vec<DerivedData>,
    auxiliary: Vec<AuxiliaryData>,
    published: RwLock<Option<Arc<VirtualFrameIndex>>>,
    stale: bool,
}

impl ScanData {
    /// Create an empty experiment under the default master policy.
    pub fn new() -> Self {
        Self::with_policy(MasterPolicy::default())
    }

    /// Create an empty experiment with an explicit master policy.
    pub fn with_policy(policy: MasterPolicy) -> Self {
        Self {
            streams: StreamSet::new(),
            overrides: OverrideMap::new(),
            aux_overrides: BTreeMap::new(),
            policy,
            derived: Vec::new(),
            auxiliary: Vec::new(),
            published: RwLock::new(None),
            stale: false,
        }
    }

    /// The experiment's streams.
    pub fn streams(&self) -> &StreamSet {
        &self.streams
    }

    /// The active master policy.
    pub fn policy(&self) -> MasterPolicy {
        self.policy
    }

    /// Registered derived records.
    pub fn derived(&self) -> &[DerivedData] {
        &self.derived
    }

    /// Registered auxiliary records.
    pub fn auxiliary(&self) -> &[AuxiliaryData] {
        &self.auxiliary
    }

    /// Look up an auxiliary record by name.
    pub fn auxiliary_named(&self, name: &str) -> Option<&AuxiliaryData> {
        self.auxiliary.iter().find(|aux| aux.name == name)
    }

    /// Whether the published index no longer reflects the streams.
    ///
    /// Set by every stream/override/policy mutation and cleared by the next
    /// successful [`rebuild`](Self::rebuild). Queries keep answering from
    /// the published snapshot in the meantime - a stale-but-consistent view
    /// is preferable to a silently guessed fresh one.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Attach (or replace) a primary stream.
    pub fn attach_stream(&mut self, stream: PrimaryStream) {
        debug!(kind = %stream.kind, frame_count = stream.frame_count, "attaching stream");
        self.streams.attach(stream);
        self.stale = true;
    }

    /// Detach a primary stream.
    pub fn detach_stream(&mut self, kind: StreamKind) {
        debug!(kind = %kind, "detaching stream");
        self.streams.detach(kind);
        self.stale = true;
    }

    /// Update a present stream's frame count (re-import, frame deletion).
    pub fn set_frame_count(&mut self, kind: StreamKind, frame_count: usize) {
        self.streams.set_frame_count(kind, frame_count);
        self.stale = true;
    }

    /// Store an override dictionary for a non-master stream.
    pub fn set_override(&mut self, kind: StreamKind, overrides: FrameOverride) {
        self.overrides.insert(kind, overrides);
        self.stale = true;
    }

    /// Remove a stored override dictionary.
    pub fn clear_override(&mut self, kind: StreamKind) {
        self.overrides.remove(&kind);
        self.stale = true;
    }

    /// Change the master policy.
    pub fn set_policy(&mut self, policy: MasterPolicy) {
        self.policy = policy;
        self.stale = true;
    }

    /// The published index, building it on first query.
    ///
    /// After a mutation this keeps returning the previous snapshot until
    /// [`rebuild`](Self::rebuild) succeeds; check
    /// [`is_stale`](Self::is_stale) to tell the two apart.
    pub fn index(&self) -> AlignmentResult<Arc<VirtualFrameIndex>> {
        if let Some(index) = self.published.read().as_ref() {
            return Ok(Arc::clone(index));
        }

        let built = Arc::new(VirtualFrameIndex::build(
            &self.streams,
            &self.overrides,
            self.policy,
        )?);

        let mut slot = self.published.write();
        // A concurrent reader may have published between our read and
        // write; keep whichever snapshot got there first.
        if let Some(existing) = slot.as_ref() {
            return Ok(Arc::clone(existing));
        }
        *slot = Some(Arc::clone(&built));
        Ok(built)
    }

    /// Resolve the real frame of `kind` behind a virtual frame.
    pub fn real_index(&self, kind: StreamKind, virtual_frame: usize) -> AlignmentResult<RealFrame> {
        self.index()?.real_index(kind, virtual_frame)
    }

    /// Rebuild the index and renormalize all bound data, transactionally.
    ///
    /// Builds a candidate index, renormalizes every auxiliary record
    /// against it into staged copies, and rebinds derived records; only
    /// when all of that succeeds are index and auxiliaries published in
    /// one step. Any error leaves the published state exactly as it was.
    pub fn rebuild(&mut self) -> AlignmentResult<Arc<VirtualFrameIndex>> {
        let candidate =
            VirtualFrameIndex::build(&self.streams, &self.overrides, self.policy)?;

        // Stage auxiliary renormalization before publishing anything
        let mut staged = self.auxiliary.clone();
        for aux in &mut staged {
            let overrides = self.aux_overrides.get(&aux.name);
            binders::normalize_auxiliary(aux, &candidate, overrides)?;
        }

        // Derived data tracks its source stream, not the index; rebinding
        // against the owning stream cannot mismatch
        for derived in &mut self.derived {
            let source = *self.streams.get(derived.source);
            binders::bind_derived(derived, &source)?;
        }

        let published = Arc::new(candidate);
        *self.published.get_mut() = Some(Arc::clone(&published));
        self.auxiliary = staged;
        self.stale = false;

        info!(
            master = ?published.master(),
            frame_count = published.frame_count(),
            auxiliary = self.auxiliary.len(),
            "rebuilt virtual frame index"
        );

        Ok(published)
    }

    /// Register derived data, binding it to its source stream.
    pub fn register_derived(&mut self, mut derived: DerivedData) -> AlignmentResult<()> {
        let source = *self.streams.get(derived.source);
        binders::bind_derived(&mut derived, &source)?;
        self.derived.push(derived);
        Ok(())
    }

    /// Register an auxiliary record, normalizing it against the current
    /// index (which is built first if this is the first query).
    ///
    /// `overrides` is kept for renormalization on later rebuilds. On error
    /// nothing is registered.
    pub fn register_auxiliary(
        &mut self,
        aux: AuxiliaryData,
        overrides: Option<FrameOverride>,
    ) -> AlignmentResult<()> {
        let index = self.index()?;
        let mut staged = aux;
        binders::normalize_auxiliary(&mut staged, &index, overrides.as_ref())?;

        if let Some(ov) = overrides {
            self.aux_overrides.insert(staged.name.clone(), ov);
        }
        self.auxiliary.push(staged);
        Ok(())
    }
}

impl Default for ScanData {
    fn default() -> Self {
        Self::new()
    }
}
