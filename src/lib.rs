//! # ramify-core
//!
//! A Rust library implementing the in-memory mind-map core of an AI-assisted study tool.
//!
//! The name "ramify" means to branch out — which is what a concept map does as a learner
//! explores it.
//!
//! ## Overview
//!
//! ramify-core models a study mind-map as an ordered forest of concept nodes
//! ([`properties::MindmapNode`]) carrying study metadata (summary, priority, suggested study
//! actions, references). Around that model it provides:
//!
//! - **Pure navigation** ([`locate`]): find a node or its root-to-node path by id.
//! - **Dedup merges with structural sharing** ([`merge`]): integrate a batch of freshly
//!   generated child concepts under one node, skipping duplicates by id or normalized title,
//!   re-deriving sibling order, and reusing every untouched subtree by reference.
//! - **Async expansion orchestration** ([`explore`]): a per-node state machine that calls an
//!   external LLM-backed collaborator ([`source::ConceptSource`]) and feeds its results into
//!   the tree, with per-node in-flight guards and an optional event stream for UI feedback.
//!
//! The collaborator itself — prompt construction, transport, model choice — is out of scope;
//! this crate owns the tree and everything that happens to it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ramify_core::{
//!     explore::{Expansion, Explorer},
//!     properties::{MindmapNode, MindmapTree, NodeId},
//!     source::{CandidateNode, ConceptSource, EditRequest, GenerateRequest},
//!     RamifyError,
//! };
//! use std::sync::Arc;
//!
//! /// A stand-in for the real LLM-backed collaborator.
//! struct CannedSource;
//!
//! impl ConceptSource for CannedSource {
//!     async fn generate_children(
//!         &self,
//!         _request: &GenerateRequest,
//!     ) -> Result<Vec<CandidateNode>, RamifyError> {
//!         Ok(vec![CandidateNode {
//!             title: "Derivatives".to_string(),
//!             ..Default::default()
//!         }])
//!     }
//!
//!     async fn edit_node(&self, _request: &EditRequest) -> Result<CandidateNode, RamifyError> {
//!         Err(RamifyError::Collaborator("edit not supported".to_string()))
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), RamifyError> {
//!     let tree = MindmapTree {
//!         title: "Math 101".to_string(),
//!         nodes: vec![Arc::new(MindmapNode {
//!             id: NodeId::new("calculus"),
//!             title: "Calculus".to_string(),
//!             ..Default::default()
//!         })],
//!         ..Default::default()
//!     };
//!
//!     let explorer = Explorer::new(CannedSource, tree, None)?;
//!     match explorer.expand(&NodeId::new("calculus"), None).await? {
//!         Expansion::Merged { added } => println!("added {added} sub-concepts"),
//!         outcome => println!("{outcome:?}"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Structural sharing
//!
//! [`merge::merge_children`] and [`merge::edit_node`] never mutate in place. They produce a
//! new [`properties::MindmapTree`] value in which only the spine from a root down to the
//! target node (plus the target's child list) is newly allocated; every unrelated subtree is
//! the same `Arc` as before. Consumers that skip re-render work on reference equality can
//! rely on untouched branches staying pointer-identical.
//!
//! ### Duplicate detection
//!
//! A candidate child is a duplicate when its id matches an existing sibling OR its
//! normalized title does. Titles are normalized case- and diacritic-insensitively
//! ([`properties::title_key`]), so the collaborator re-proposing "Génétique" under a node
//! that already holds "genetique" adds nothing.
//!
//! ### Per-node request serialization
//!
//! Expansions of *different* nodes may be in flight simultaneously. A second request for a
//! node that is already requesting is ignored — not queued, not an error. The requesting
//! flag is cleared on every exit path, success or failure.
//!
//! ## Module Guide
//!
//! Start with [`explore::Explorer`] for the orchestration surface, then [`merge`] for the
//! tree semantics. [`properties`] holds the data model; [`source`] the collaborator contract.

pub mod error;
pub mod event;
pub mod explore;
pub mod locate;
pub mod merge;
pub mod properties;
pub mod source;

pub use error::*;
