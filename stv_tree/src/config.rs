// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};

/// The identifier of a candidate.
///
/// Identifiers are totally ordered. This order is the one used for breaking
/// ties and for sorting the reports.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct CandidateId(pub u32);

impl Display for CandidateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
}

impl Candidate {
    pub fn new(id: u32, name: &str) -> Candidate {
        Candidate {
            id: CandidateId(id),
            name: name.to_string(),
        }
    }
}

/// A ballot: the candidates in order of preference, and how many voters cast
/// exactly this ballot.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Ballot {
    pub choices: Vec<CandidateId>,
    pub count: u64,
}

impl Ballot {
    /// A single ballot with the given choices.
    pub fn new(choices: &[u32]) -> Ballot {
        Ballot {
            choices: choices.iter().map(|c| CandidateId(*c)).collect(),
            count: 1,
        }
    }
}

/// A (possibly fractional) amount of votes.
#[derive(PartialEq, Debug, Clone, Copy, PartialOrd, Default)]
pub struct VoteWeight(pub f64);

impl VoteWeight {
    pub const EMPTY: VoteWeight = VoteWeight(0.0);

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl From<u64> for VoteWeight {
    fn from(count: u64) -> VoteWeight {
        VoteWeight(count as f64)
    }
}

impl Display for VoteWeight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Sum for VoteWeight {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        VoteWeight(iter.map(|vw| vw.0).sum())
    }
}

impl AddAssign for VoteWeight {
    fn add_assign(&mut self, rhs: VoteWeight) {
        self.0 += rhs.0;
    }
}

impl Add for VoteWeight {
    type Output = VoteWeight;
    fn add(self: VoteWeight, rhs: VoteWeight) -> VoteWeight {
        VoteWeight(self.0 + rhs.0)
    }
}

impl Sub for VoteWeight {
    type Output = VoteWeight;
    fn sub(self: VoteWeight, rhs: VoteWeight) -> VoteWeight {
        VoteWeight(self.0 - rhs.0)
    }
}

impl Mul<f64> for VoteWeight {
    type Output = VoteWeight;
    fn mul(self: VoteWeight, scale: f64) -> VoteWeight {
        VoteWeight(self.0 * scale)
    }
}

// ******** Output data structures *********

/// Where the votes of a candidate went after an elimination or a surplus.
#[derive(PartialEq, Debug, Clone)]
pub struct TransferStats {
    pub id: CandidateId,
    pub name: String,
    /// The weight received by each candidate still running, in id order.
    pub transfers: Vec<(String, f64)>,
    /// The weight that could not be transferred to any running candidate.
    pub exhausted: f64,
}

/// What happened during one round.
#[derive(PartialEq, Debug, Clone)]
pub enum RoundOutcome {
    /// The initial state, before any round.
    Start,
    /// These candidates reached the quota, and their surplus was transferred.
    Surplus(Vec<TransferStats>),
    /// This candidate had the fewest votes and was removed.
    Eliminated(TransferStats),
    /// The candidates left could fill all the remaining seats.
    ElectedByDefault(Vec<Candidate>),
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum CandidateState {
    Running,
    Elected,
}

#[derive(PartialEq, Debug, Clone)]
pub struct CandidateStatus {
    pub id: CandidateId,
    pub name: String,
    pub count: f64,
    pub state: CandidateState,
}

/// The state of the election after one round.
#[derive(PartialEq, Debug, Clone)]
pub struct RoundReport {
    pub iteration: u32,
    pub message: String,
    pub outcome: RoundOutcome,
    /// The quota that applied in this round. Not defined for the initial report.
    pub quota: Option<f64>,
    /// The votes held by running and elected candidates at the start of the round.
    pub total: f64,
    /// Running and elected candidates, sorted by id.
    pub status: Vec<CandidateStatus>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct ElectionResult {
    pub seats: u32,
    /// The elected candidates, in the order of their election.
    pub elected: Vec<Candidate>,
    /// The eliminated candidates, in the order of their elimination.
    pub eliminated: Vec<Candidate>,
    pub rounds: Vec<RoundReport>,
}

impl ElectionResult {
    /// The names of the winners, in the order of their election.
    pub fn winners(&self) -> Vec<String> {
        self.elected.iter().map(|c| c.name.clone()).collect()
    }
}

/// Errors that prevent the algorithm from completing successfully.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum StvErrors {
    /// A ballot (zero-based index) references a candidate absent from the roster.
    UnknownCandidate { ballot: usize, id: CandidateId },
    /// Two candidates of the roster share the same id.
    DuplicateCandidate(CandidateId),
    /// No vote was cast: the quota is not defined.
    EmptyElection,
    InvalidSeats(u32),
}

impl Error for StvErrors {}

impl Display for StvErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StvErrors::UnknownCandidate { ballot, id } => {
                write!(f, "ballot {} references unknown candidate {}", ballot, id)
            }
            StvErrors::DuplicateCandidate(id) => {
                write!(f, "candidate id {} is registered more than once", id)
            }
            StvErrors::EmptyElection => write!(f, "no votes were cast in this election"),
            StvErrors::InvalidSeats(seats) => {
                write!(f, "the number of seats must be at least 1, got {}", seats)
            }
        }
    }
}

// ********* Configuration **********

/// What to do when the candidates still running can fill all the seats left
/// without reaching the quota.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum RemainingCandidatesMode {
    /// Elect all of them in a single round.
    ElectRemaining,
    /// Keep eliminating until the forest is empty. The last candidates may
    /// then end up eliminated even though seats are unfilled.
    EliminateRemaining,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ElectionRules {
    /// The number of winners. It controls the quota.
    pub seats: u32,
    pub remaining_candidates: RemainingCandidatesMode,
}

impl ElectionRules {
    pub const DEFAULT_RULES: ElectionRules = ElectionRules {
        seats: 1,
        remaining_candidates: RemainingCandidatesMode::ElectRemaining,
    };

    pub fn with_seats(seats: u32) -> ElectionRules {
        ElectionRules {
            seats,
            ..ElectionRules::DEFAULT_RULES
        }
    }
}
