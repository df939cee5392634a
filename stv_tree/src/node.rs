//! Ballot-path trees.
//!
//! A node stands for one rank along all the ballots that share the same
//! prefix of preferences. Its count is the weight of the ballots that reach
//! this prefix, and each child holds the ballots that continue with this
//! particular next preference. The weight of a node that is not found in its
//! children belongs to ballots that stop at this rank.
//!
//! Eliminating a candidate then amounts to merging its children into the
//! trees of the candidates still running.

use std::collections::BTreeMap;
use std::ops::Add;
use std::sync::Arc;

use crate::config::{Candidate, CandidateId, VoteWeight};

pub type Children = BTreeMap<CandidateId, CandidateNode>;

#[derive(PartialEq, Debug, Clone)]
pub struct CandidateNode {
    candidate: Arc<Candidate>,
    count: VoteWeight,
    children: Children,
}

impl CandidateNode {
    pub fn new(candidate: Arc<Candidate>, count: VoteWeight) -> CandidateNode {
        CandidateNode {
            candidate,
            count,
            children: Children::new(),
        }
    }

    pub fn candidate(&self) -> &Arc<Candidate> {
        &self.candidate
    }

    pub fn id(&self) -> CandidateId {
        self.candidate.id
    }

    pub fn count(&self) -> VoteWeight {
        self.count
    }

    pub fn children(&self) -> &Children {
        &self.children
    }

    /// The weight of the ballots that stop at this node.
    pub fn exhausted(&self) -> VoteWeight {
        self.count - self.children.values().map(|c| c.count).sum()
    }

    /// Inserts a fresh child for this candidate, replacing any existing one.
    /// The count of this node is not changed.
    pub fn add_child(&mut self, candidate: Arc<Candidate>, count: VoteWeight) {
        self.children
            .insert(candidate.id, CandidateNode::new(candidate, count));
    }

    /// Returns a copy of this tree in which every count is scaled.
    pub fn multiply(&self, scale: f64) -> CandidateNode {
        CandidateNode {
            candidate: Arc::clone(&self.candidate),
            count: self.count * scale,
            children: self
                .children
                .iter()
                .map(|(cid, child)| (*cid, child.multiply(scale)))
                .collect(),
        }
    }

    pub(crate) fn add_weight(&mut self, weight: VoteWeight) {
        self.count += weight;
    }

    pub(crate) fn set_count(&mut self, count: VoteWeight) {
        self.count = count;
    }

    pub(crate) fn children_mut(&mut self) -> &mut Children {
        &mut self.children
    }

    pub(crate) fn into_children(self) -> Children {
        self.children
    }
}

/// Merges two trees of the same candidate.
///
/// Children found on both sides are merged recursively. The other children
/// are moved into the result untouched.
///
/// Panics if the two nodes are not for the same candidate.
impl Add for CandidateNode {
    type Output = CandidateNode;

    fn add(self, other: CandidateNode) -> CandidateNode {
        assert_eq!(
            self.id(),
            other.id(),
            "Cannot merge the trees of two different candidates"
        );
        let mut children = self.children;
        for (cid, theirs) in other.children {
            let merged = match children.remove(&cid) {
                Some(ours) => ours + theirs,
                None => theirs,
            };
            children.insert(cid, merged);
        }
        CandidateNode {
            candidate: self.candidate,
            count: self.count + other.count,
            children,
        }
    }
}
