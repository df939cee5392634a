pub use crate::config::*;

use std::collections::HashSet;

/// A builder for adding ballots.
///
/// Using the builder catches unknown candidates as soon as a ballot is added.
///
/// ```
/// pub use stv_tree::builder::Builder;
/// pub use stv_tree::ElectionRules;
/// # use stv_tree::StvErrors;
///
/// let mut builder = Builder::new(&ElectionRules::with_seats(2))?
///     .candidates(&[(1, "Anna".to_string()), (2, "Bob".to_string()), (3, "Clara".to_string())])?;
///
/// builder.add_ballot(&[1, 3])?;
/// builder.add_weighted_ballot(&[2], 3)?;
/// builder.add_ballot(&[3, 1])?;
/// assert!(builder.add_ballot(&[4]).is_err());
///
/// let result = builder.run()?;
/// assert_eq!(result.winners(), vec!["Bob".to_string(), "Clara".to_string()]);
///
/// # Ok::<(), StvErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: ElectionRules,
    pub(crate) _candidates: Vec<Candidate>,
    pub(crate) _ballots: Vec<Ballot>,
    _ids: HashSet<CandidateId>,
}

impl Builder {
    pub fn new(rules: &ElectionRules) -> Result<Builder, StvErrors> {
        if rules.seats < 1 {
            return Err(StvErrors::InvalidSeats(rules.seats));
        }
        Ok(Builder {
            _rules: rules.clone(),
            _candidates: Vec::new(),
            _ballots: Vec::new(),
            _ids: HashSet::new(),
        })
    }

    /// Registers the candidates. Any ballot added before is dropped.
    pub fn candidates(self, cands: &[(u32, String)]) -> Result<Builder, StvErrors> {
        let mut seen: HashSet<CandidateId> = HashSet::new();
        let mut candidates: Vec<Candidate> = Vec::new();
        for (id, name) in cands.iter() {
            if !seen.insert(CandidateId(*id)) {
                return Err(StvErrors::DuplicateCandidate(CandidateId(*id)));
            }
            candidates.push(Candidate::new(*id, name));
        }
        Ok(Builder {
            _rules: self._rules,
            _candidates: candidates,
            _ballots: Vec::new(),
            _ids: seen,
        })
    }

    /// Adds a ballot cast by a single voter.
    pub fn add_ballot(&mut self, choices: &[u32]) -> Result<(), StvErrors> {
        self.add_weighted_ballot(choices, 1)
    }

    /// Adds a ballot cast identically by `count` voters.
    ///
    /// choices: the candidate ids in order of preference. A ballot may be empty.
    pub fn add_weighted_ballot(&mut self, choices: &[u32], count: u64) -> Result<(), StvErrors> {
        let ballot = Ballot {
            choices: choices.iter().map(|c| CandidateId(*c)).collect(),
            count,
        };
        self.add_ballot_2(&ballot)
    }

    pub fn add_ballot_2(&mut self, ballot: &Ballot) -> Result<(), StvErrors> {
        for cid in ballot.choices.iter() {
            if !self._ids.contains(cid) {
                return Err(StvErrors::UnknownCandidate {
                    ballot: self._ballots.len(),
                    id: *cid,
                });
            }
        }
        self._ballots.push(ballot.clone());
        Ok(())
    }

    /// Runs the election on all the ballots added so far.
    pub fn run(&self) -> Result<ElectionResult, StvErrors> {
        crate::run_election(&self._ballots, &self._candidates, &self._rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> Builder {
        Builder::new(&ElectionRules::DEFAULT_RULES)
            .unwrap()
            .candidates(&[(1, "A".to_string()), (2, "B".to_string())])
            .unwrap()
    }

    #[test]
    fn rejects_zero_seats() {
        let res = Builder::new(&ElectionRules::with_seats(0));
        assert!(matches!(res, Err(StvErrors::InvalidSeats(0))));
    }

    #[test]
    fn rejects_duplicate_candidates() {
        let res = Builder::new(&ElectionRules::DEFAULT_RULES)
            .unwrap()
            .candidates(&[(1, "A".to_string()), (1, "B".to_string())]);
        assert!(matches!(
            res,
            Err(StvErrors::DuplicateCandidate(CandidateId(1)))
        ));
    }

    #[test]
    fn rejects_unknown_candidates() {
        let mut b = builder();
        b.add_ballot(&[1]).unwrap();
        assert_eq!(
            b.add_ballot(&[2, 9]),
            Err(StvErrors::UnknownCandidate {
                ballot: 1,
                id: CandidateId(9)
            })
        );
        assert_eq!(b._ballots.len(), 1);
    }

    #[test]
    fn registering_again_replaces_candidates() {
        let mut b = builder()
            .candidates(&[(1, "A".to_string()), (3, "C".to_string())])
            .unwrap();
        b.add_ballot(&[3, 1]).unwrap();
        assert_eq!(
            b.add_ballot(&[2]),
            Err(StvErrors::UnknownCandidate {
                ballot: 1,
                id: CandidateId(2)
            })
        );
    }

    #[test]
    fn empty_builder_is_an_empty_election() {
        let mut b = builder();
        b.add_ballot(&[]).unwrap();
        assert_eq!(b.run(), Err(StvErrors::EmptyElection));
    }
}
