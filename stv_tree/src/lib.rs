/*!
Single Transferable Vote tabulation.

Ballots are not processed one by one. All the ballots that share the same
first preferences are grouped into a tree of [`node::CandidateNode`]s, one
tree per first preference. Eliminating a candidate or transferring a surplus
then amounts to merging scaled subtrees into the trees of the candidates still
running.

```
use stv_tree::*;

let candidates = vec![
    Candidate::new(1, "Alice"),
    Candidate::new(2, "Bob"),
    Candidate::new(3, "Charlie"),
];
let ballots = vec![
    Ballot::new(&[1, 2]),
    Ballot::new(&[1]),
    Ballot::new(&[2, 1]),
    Ballot::new(&[3, 2]),
];
let result = run_election(&ballots, &candidates, &ElectionRules::DEFAULT_RULES)?;
assert_eq!(result.winners(), vec!["Alice".to_string()]);
# Ok::<(), StvErrors>(())
```
*/

mod config;
pub mod builder;
pub mod manual;
pub mod node;
pub mod report;
pub mod round;
pub mod tree;

use log::{debug, info};

pub use crate::config::*;

/// Runs an election with the given rules for the given ballots.
///
/// Arguments:
/// * `ballots` the ballots to process, highest preference first
/// * `candidates` the registered candidates. Every candidate referenced by a
///   ballot must be registered.
/// * `rules` the rules that govern this election
pub fn run_election(
    ballots: &[Ballot],
    candidates: &[Candidate],
    rules: &ElectionRules,
) -> Result<ElectionResult, StvErrors> {
    info!(
        "Processing {:?} ballots, candidates: {:?}, rules: {:?}",
        ballots.len(),
        candidates,
        rules
    );
    if rules.seats < 1 {
        return Err(StvErrors::InvalidSeats(rules.seats));
    }

    let roster = tree::roster(candidates)?;
    let forest = tree::build_forest(ballots, &roster)?;
    debug!(
        "run_election: first preferences: {:?}",
        forest
            .values()
            .map(|n| (n.candidate().name.clone(), n.count().value()))
            .collect::<Vec<_>>()
    );

    let result = round::tabulate(forest, rules)?;
    info!(
        "Elected: {:?} after {} rounds",
        result.winners(),
        result.rounds.len() - 1
    );
    Ok(result)
}
