//! Contract with the external concept-generation collaborator.
//!
//! The real collaborator is an LLM-backed service living outside this crate. Its payloads
//! are loosely shaped ([`CandidateNode`]: everything but the title optional), so this module
//! also owns the sanitation step that turns a delivered batch into well-formed tree nodes —
//! tolerating and counting malformed entries rather than failing the whole batch.

use serde::{Deserialize, Serialize};
use std::{future::Future, sync::Arc};

use crate::{
    error::RamifyError,
    properties::{MindmapNode, NodeId},
};

/// Instruction strings longer than this (after trimming) are rejected before any
/// collaborator call is made.
pub const MAX_INSTRUCTION_LEN: usize = 1000;

/// Request for one generation of sub-concepts under a node. Ancestor titles travel along
/// so the collaborator can situate the target in its topic hierarchy.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub target_title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ancestor_titles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_instruction: Option<String>,
}

/// Request to rewrite one node's display fields. The caller preserves children regardless
/// of what comes back.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequest {
    pub target_id: NodeId,
    pub current_title: String,
    pub current_summary: String,
    pub edit_instruction: String,
}

/// A candidate node as delivered by the collaborator: duck-typed, every field beyond the
/// title optional.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CandidateNode {
    pub id: Option<String>,
    pub title: String,
    pub summary: Option<String>,
    pub ai_hint: Option<String>,
    pub study_actions: Vec<String>,
    pub priority: Option<i64>,
    pub references: Vec<String>,
}

impl CandidateNode {
    /// Upgrade this candidate into a well-formed (childless) tree node.
    ///
    /// A blank or whitespace-only title marks the candidate malformed (`None`). A missing
    /// or blank id gets a minted [NodeId] — ids must exist before dedup can work.
    pub fn into_node(self) -> Option<MindmapNode> {
        let title = self.title.trim();
        if title.is_empty() {
            return None;
        }
        let id = match self.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => NodeId::new(id),
            _ => NodeId::generate(),
        };
        Some(MindmapNode {
            id,
            title: title.to_string(),
            summary: self.summary,
            priority: self.priority,
            study_actions: self.study_actions,
            references: self.references,
            ai_hint: self.ai_hint,
            children: Vec::new(),
        })
    }
}

/// Result of sanitizing one delivered batch.
#[derive(Debug, Default)]
pub struct SanitizedBatch {
    pub accepted: Vec<Arc<MindmapNode>>,
    /// Malformed candidates dropped from the batch.
    pub rejected: usize,
}

pub fn sanitize_candidates(candidates: Vec<CandidateNode>) -> SanitizedBatch {
    let mut batch = SanitizedBatch::default();
    for candidate in candidates {
        match candidate.into_node() {
            Some(node) => batch.accepted.push(Arc::new(node)),
            None => {
                batch.rejected += 1;
                tracing::warn!("[source] dropping malformed candidate (blank title)");
            }
        }
    }
    batch
}

/// Trim an optional instruction, rejecting over-length input before any request is
/// dispatched. A whitespace-only instruction collapses to `None`.
pub(crate) fn validate_instruction(
    instruction: Option<&str>,
) -> Result<Option<String>, RamifyError> {
    let Some(raw) = instruction else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if len > MAX_INSTRUCTION_LEN {
        return Err(RamifyError::Validation(format!(
            "custom instruction exceeds {MAX_INSTRUCTION_LEN} characters ({len} given)"
        )));
    }
    if trimmed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(trimmed.to_string()))
    }
}

/// The external generation/edit collaborator (LLM-backed in the real system).
///
/// Implementations own transport, prompting, and timeout concerns entirely; this crate only
/// consumes the delivered candidates. Both methods take shared `&self` so one source can
/// serve concurrent expansions of different nodes.
pub trait ConceptSource: Sync {
    /// Produce an ordered batch of candidate sub-concepts for the target node.
    fn generate_children(
        &self,
        request: &GenerateRequest,
    ) -> impl Future<Output = Result<Vec<CandidateNode>, RamifyError>> + Send;

    /// Produce a replacement record for one node. Children in the response, if any, are
    /// ignored by the caller.
    fn edit_node(
        &self,
        request: &EditRequest,
    ) -> impl Future<Output = Result<CandidateNode, RamifyError>> + Send;
}

/// Shared-ownership delegation: an `Arc`-wrapped source is itself a source, so one
/// collaborator can be handed to an [Explorer](crate::explore::Explorer) while callers keep
/// a handle to it.
impl<T: ConceptSource + Send + Sync> ConceptSource for Arc<T> {
    fn generate_children(
        &self,
        request: &GenerateRequest,
    ) -> impl Future<Output = Result<Vec<CandidateNode>, RamifyError>> + Send {
        (**self).generate_children(request)
    }

    fn edit_node(
        &self,
        request: &EditRequest,
    ) -> impl Future<Output = Result<CandidateNode, RamifyError>> + Send {
        (**self).edit_node(request)
    }
}
