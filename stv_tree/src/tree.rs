use log::debug;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::{Ballot, Candidate, CandidateId, StvErrors, VoteWeight};
use crate::node::{CandidateNode, Children};

/// The trees of all the candidates still running, keyed by first preference.
pub type Forest = Children;

pub type Roster = BTreeMap<CandidateId, Arc<Candidate>>;

/// Indexes the registered candidates by id.
pub fn roster(candidates: &[Candidate]) -> Result<Roster, StvErrors> {
    let mut res: Roster = BTreeMap::new();
    for c in candidates.iter() {
        if res.insert(c.id, Arc::new(c.clone())).is_some() {
            return Err(StvErrors::DuplicateCandidate(c.id));
        }
    }
    Ok(res)
}

/// Builds one tree per first preference.
///
/// Each ballot adds its weight to every node along its path. The last node of
/// the ballot keeps the weight: nothing is pushed to a child.
pub fn build_forest(ballots: &[Ballot], roster: &Roster) -> Result<Forest, StvErrors> {
    let mut forest: Forest = BTreeMap::new();
    for (idx, ballot) in ballots.iter().enumerate() {
        // A ballot without weight still has to reference registered candidates.
        let path: Vec<&Arc<Candidate>> = ballot
            .choices
            .iter()
            .map(|cid| {
                roster.get(cid).ok_or(StvErrors::UnknownCandidate {
                    ballot: idx,
                    id: *cid,
                })
            })
            .collect::<Result<_, _>>()?;
        if ballot.count == 0 || path.is_empty() {
            continue;
        }
        let weight = VoteWeight::from(ballot.count);
        let mut level: &mut Children = &mut forest;
        for candidate in path {
            let node = level
                .entry(candidate.id)
                .or_insert_with(|| CandidateNode::new(Arc::clone(candidate), VoteWeight::EMPTY));
            node.add_weight(weight);
            level = node.children_mut();
        }
    }
    debug!(
        "build_forest: {} ballots, {} first preferences",
        ballots.len(),
        forest.len()
    );
    Ok(forest)
}
