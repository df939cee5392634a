use crate::config::{CandidateState, CandidateStatus, RoundOutcome, RoundReport, VoteWeight};
use crate::node::Children;

/// Captures the state of the election after a round.
///
/// The status lists the candidates still running and the elected ones, in id
/// order. The forest and the finalists are only read.
pub fn snapshot(
    forest: &Children,
    finalists: &Children,
    iteration: u32,
    outcome: RoundOutcome,
    quota: Option<VoteWeight>,
    total: VoteWeight,
) -> RoundReport {
    let mut status: Vec<CandidateStatus> = forest
        .values()
        .map(|n| (n, CandidateState::Running))
        .chain(finalists.values().map(|n| (n, CandidateState::Elected)))
        .map(|(n, state)| CandidateStatus {
            id: n.id(),
            name: n.candidate().name.clone(),
            count: n.count().value(),
            state,
        })
        .collect();
    status.sort_by_key(|s| s.id);

    RoundReport {
        iteration,
        message: message(&outcome),
        outcome,
        quota: quota.map(|q| q.value()),
        total: total.value(),
        status,
    }
}

fn message(outcome: &RoundOutcome) -> String {
    match outcome {
        RoundOutcome::Start => "No rounds yet".to_string(),
        RoundOutcome::Surplus(stats) => {
            let names: Vec<&str> = stats.iter().map(|s| s.name.as_str()).collect();
            format!("Surplus: {}", names.join(", "))
        }
        RoundOutcome::Eliminated(stats) => format!("Eliminating: {}", stats.name),
        RoundOutcome::ElectedByDefault(candidates) => {
            let names: Vec<&str> = candidates.iter().map(|c| c.name.as_str()).collect();
            format!("Elected by default: {}", names.join(", "))
        }
    }
}
