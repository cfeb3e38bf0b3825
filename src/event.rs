use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::properties::NodeId;

/// Notifications emitted by [crate::explore::Explorer] over its optional event channel.
///
/// These exist purely for UI feedback (spinners, transient toasts). Every dispatched
/// expansion emits `ExpansionStarted` followed by exactly one terminal event; requests
/// short-circuited before dispatch (unknown target, suppressed duplicate) emit at most the
/// terminal event. Dropping the receiver silently discards further notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapEvent {
    /// The node entered the requesting state.
    ExpansionStarted(NodeId),
    /// New children were merged under the node; count of candidates that survived dedup.
    ChildrenMerged(NodeId, usize),
    /// The collaborator succeeded but produced nothing new to add. Distinct from failure.
    NothingNew(NodeId),
    /// Node id, failure message. The tree was left untouched.
    ExpansionFailed(NodeId, String),
    /// An edit was applied to the node, children preserved.
    EditApplied(NodeId),
    /// Node id, failure message.
    EditFailed(NodeId, String),
    /// The merge or edit target was absent from the tree (stale reference).
    TargetMissing(NodeId),
}

impl Display for MapEvent {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            MapEvent::ExpansionStarted(_) => write!(f, "ExpansionStarted"),
            MapEvent::ChildrenMerged(_, _) => write!(f, "ChildrenMerged"),
            MapEvent::NothingNew(_) => write!(f, "NothingNew"),
            MapEvent::ExpansionFailed(_, _) => write!(f, "ExpansionFailed"),
            MapEvent::EditApplied(_) => write!(f, "EditApplied"),
            MapEvent::EditFailed(_, _) => write!(f, "EditFailed"),
            MapEvent::TargetMissing(_) => write!(f, "TargetMissing"),
        }
    }
}

impl MapEvent {
    /// The node this event concerns.
    pub fn node(&self) -> &NodeId {
        match self {
            MapEvent::ExpansionStarted(id) => id,
            MapEvent::ChildrenMerged(id, _) => id,
            MapEvent::NothingNew(id) => id,
            MapEvent::ExpansionFailed(id, _) => id,
            MapEvent::EditApplied(id) => id,
            MapEvent::EditFailed(id, _) => id,
            MapEvent::TargetMissing(id) => id,
        }
    }
}
