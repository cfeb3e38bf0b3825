//! Per-node expansion orchestration.
//!
//! [`Explorer`] owns exactly one current [`MindmapTree`], replaced atomically after every
//! successful merge or edit, plus the set of node ids with a collaborator call in flight.
//! Expansions of different nodes proceed concurrently; a second request for a node already
//! requesting is ignored (not queued, not an error). Each request has exactly one suspension
//! point — the outbound collaborator call — and its requesting flag is cleared on every exit
//! path, including errors.
//!
//! There is no cancellation: an expansion abandoned by the UI completes in the background
//! and merges against whatever the tree is by then, or is discarded with the explorer.

use parking_lot::RwLock;
use std::{collections::BTreeSet, sync::Arc};
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    error::RamifyError,
    event::MapEvent,
    locate::{find_node, find_path},
    merge::{edit_node, merge_children, MergeOutcome, NodePatch},
    properties::{MindmapTree, NodeId},
    source::{sanitize_candidates, validate_instruction, ConceptSource, EditRequest, GenerateRequest},
};

/// Terminal outcome of one expansion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expansion {
    /// Candidates merged under the target; `added` survived dedup (zero is still success).
    Merged { added: usize },
    /// The collaborator returned nothing usable — "nothing new to add", not a failure.
    NothingNew,
    /// The node already had a request in flight; this one was ignored.
    AlreadyRequesting,
    /// The target id is absent from the tree (stale reference).
    TargetMissing,
}

/// Terminal outcome of one edit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    Applied,
    AlreadyRequesting,
    TargetMissing,
}

struct MapState {
    tree: MindmapTree,
    /// Node ids with a collaborator call in flight. Keyed per node: no global lock is held
    /// across awaits.
    requesting: BTreeSet<NodeId>,
}

/// Orchestrates collaborator calls and feeds their results into the owned tree.
pub struct Explorer<S> {
    source: S,
    state: Arc<RwLock<MapState>>,
    events: Option<UnboundedSender<MapEvent>>,
}

impl<S: ConceptSource> Explorer<S> {
    /// Validates the initial tree against the size limits in [crate::properties].
    /// `events` is optional; pass a sender to receive [MapEvent] notifications for UI
    /// feedback.
    pub fn new(
        source: S,
        tree: MindmapTree,
        events: Option<UnboundedSender<MapEvent>>,
    ) -> Result<Self, RamifyError> {
        tree.validate()?;
        Ok(Explorer {
            source,
            state: Arc::new(RwLock::new(MapState {
                tree,
                requesting: BTreeSet::new(),
            })),
            events,
        })
    }

    /// Snapshot of the current tree. Cheap: root `Arc`s are shared, not copied.
    pub fn tree(&self) -> MindmapTree {
        self.state.read().tree.clone()
    }

    /// Install a wholesale regenerated tree, validating it first. In-flight expansions will
    /// merge against the new tree if their target id still exists, and report
    /// [Expansion::TargetMissing] otherwise.
    pub fn replace_tree(&self, tree: MindmapTree) -> Result<(), RamifyError> {
        tree.validate()?;
        self.state.write().tree = tree;
        Ok(())
    }

    /// Whether `id` currently has a request in flight. Drives per-node UI spinners.
    pub fn is_requesting(&self, id: &NodeId) -> bool {
        self.state.read().requesting.contains(id)
    }

    /// Snapshot of all node ids currently requesting.
    pub fn requesting(&self) -> BTreeSet<NodeId> {
        self.state.read().requesting.clone()
    }

    fn emit(&self, event: MapEvent) {
        if let Some(tx) = &self.events {
            if tx.send(event).is_err() {
                tracing::debug!("[explorer] event receiver dropped, notification discarded");
            }
        }
    }

    /// Expand the node `id` by one generation of sub-concepts.
    ///
    /// The optional `instruction` is trimmed and rejected with
    /// [RamifyError::Validation] beyond [crate::source::MAX_INSTRUCTION_LEN] characters —
    /// in that case the node never enters the requesting state. Collaborator failures come
    /// back as `Err` after an [MapEvent::ExpansionFailed] notification; the tree is left
    /// untouched. All other cases are [Expansion] variants.
    pub async fn expand(
        &self,
        id: &NodeId,
        instruction: Option<&str>,
    ) -> Result<Expansion, RamifyError> {
        let custom_instruction = validate_instruction(instruction)?;

        let request = {
            let mut state = self.state.write();
            if state.requesting.contains(id) {
                tracing::debug!("[explorer] expand ignored, node {id} already requesting");
                return Ok(Expansion::AlreadyRequesting);
            }
            let path = find_path(&state.tree.nodes, id);
            match path.split_last() {
                None => None,
                Some((target, ancestors)) => {
                    let request = GenerateRequest {
                        target_title: target.title.clone(),
                        ancestor_titles: ancestors.iter().map(|n| n.title.clone()).collect(),
                        custom_instruction,
                    };
                    state.requesting.insert(id.clone());
                    Some(request)
                }
            }
        };
        let Some(request) = request else {
            tracing::warn!("[explorer] expand requested for unknown node {id}");
            self.emit(MapEvent::TargetMissing(id.clone()));
            return Ok(Expansion::TargetMissing);
        };

        self.emit(MapEvent::ExpansionStarted(id.clone()));
        // Clears the requesting flag on every exit path below.
        let _guard = RequestingGuard {
            state: self.state.clone(),
            id: id.clone(),
        };

        match self.source.generate_children(&request).await {
            Ok(candidates) => {
                let batch = sanitize_candidates(candidates);
                if batch.rejected > 0 {
                    tracing::warn!(
                        "[explorer] dropped {} malformed candidate(s) for node {id}",
                        batch.rejected
                    );
                }
                if batch.accepted.is_empty() {
                    tracing::info!("[explorer] no new sub-concepts for node {id}");
                    self.emit(MapEvent::NothingNew(id.clone()));
                    return Ok(Expansion::NothingNew);
                }

                let outcome = {
                    let mut state = self.state.write();
                    let (tree, outcome) = merge_children(&state.tree, id, &batch.accepted);
                    if let MergeOutcome::Merged { .. } = outcome {
                        state.tree = tree;
                    }
                    outcome
                };
                match outcome {
                    MergeOutcome::Merged { added } => {
                        tracing::debug!("[explorer] merged {added} sub-concept(s) under {id}");
                        self.emit(MapEvent::ChildrenMerged(id.clone(), added));
                        Ok(Expansion::Merged { added })
                    }
                    MergeOutcome::TargetMissing => {
                        self.emit(MapEvent::TargetMissing(id.clone()));
                        Ok(Expansion::TargetMissing)
                    }
                }
            }
            Err(e) => {
                tracing::warn!("[explorer] expansion failed for node {id}: {e}");
                self.emit(MapEvent::ExpansionFailed(id.clone(), e.to_string()));
                Err(e)
            }
        }
    }

    /// Rewrite one node's display fields via the collaborator, preserving its children.
    ///
    /// The instruction must be non-empty after trimming and is subject to the same length
    /// limit as expansion instructions. Shares the per-node requesting guard with
    /// [Self::expand], so edits and expansions of the same node serialize.
    pub async fn edit(&self, id: &NodeId, instruction: &str) -> Result<Edit, RamifyError> {
        let Some(edit_instruction) = validate_instruction(Some(instruction))? else {
            return Err(RamifyError::Validation(
                "edit instruction is empty".to_string(),
            ));
        };

        let request = {
            let mut state = self.state.write();
            if state.requesting.contains(id) {
                tracing::debug!("[explorer] edit ignored, node {id} already requesting");
                return Ok(Edit::AlreadyRequesting);
            }
            let found = find_node(&state.tree.nodes, id).map(|node| {
                (
                    node.title.clone(),
                    node.summary.clone().unwrap_or_default(),
                )
            });
            match found {
                None => None,
                Some((current_title, current_summary)) => {
                    state.requesting.insert(id.clone());
                    Some(EditRequest {
                        target_id: id.clone(),
                        current_title,
                        current_summary,
                        edit_instruction,
                    })
                }
            }
        };
        let Some(request) = request else {
            tracing::warn!("[explorer] edit requested for unknown node {id}");
            self.emit(MapEvent::TargetMissing(id.clone()));
            return Ok(Edit::TargetMissing);
        };

        let _guard = RequestingGuard {
            state: self.state.clone(),
            id: id.clone(),
        };

        match self.source.edit_node(&request).await {
            Ok(candidate) => {
                let Some(node) = candidate.into_node() else {
                    let e = RamifyError::Collaborator(
                        "edit returned a malformed node (blank title)".to_string(),
                    );
                    self.emit(MapEvent::EditFailed(id.clone(), e.to_string()));
                    return Err(e);
                };
                let patch = NodePatch::from(&node);

                let outcome = {
                    let mut state = self.state.write();
                    let (tree, outcome) = edit_node(&state.tree, id, &patch);
                    if let MergeOutcome::Merged { .. } = outcome {
                        state.tree = tree;
                    }
                    outcome
                };
                match outcome {
                    MergeOutcome::Merged { .. } => {
                        self.emit(MapEvent::EditApplied(id.clone()));
                        Ok(Edit::Applied)
                    }
                    MergeOutcome::TargetMissing => {
                        self.emit(MapEvent::TargetMissing(id.clone()));
                        Ok(Edit::TargetMissing)
                    }
                }
            }
            Err(e) => {
                tracing::warn!("[explorer] edit failed for node {id}: {e}");
                self.emit(MapEvent::EditFailed(id.clone(), e.to_string()));
                Err(e)
            }
        }
    }
}

/// Removes a node id from the requesting set when dropped, so the flag clears whether the
/// request succeeded, failed, or was short-circuited.
struct RequestingGuard {
    state: Arc<RwLock<MapState>>,
    id: NodeId,
}

impl Drop for RequestingGuard {
    fn drop(&mut self) {
        self.state.write().requesting.remove(&self.id);
    }
}
