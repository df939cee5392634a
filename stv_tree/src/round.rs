use log::{debug, info};

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::*;
use crate::node::{CandidateNode, Children};
use crate::report;
use crate::tree::Forest;

/// The Droop quota: `floor(total / (seats + 1)) + 1`.
pub fn droop_quota(total: VoteWeight, seats: u32) -> Result<VoteWeight, StvErrors> {
    if seats < 1 {
        return Err(StvErrors::InvalidSeats(seats));
    }
    if total.value() <= 0.0 {
        return Err(StvErrors::EmptyElection);
    }
    Ok(VoteWeight(
        (total.value() / (seats as f64 + 1.0)).floor() + 1.0,
    ))
}

fn total_weight(forest: &Forest, finalists: &Children) -> VoteWeight {
    forest
        .values()
        .chain(finalists.values())
        .map(|n| n.count())
        .sum()
}

/// Runs all the rounds until every candidate is either elected or eliminated.
pub fn tabulate(forest: Forest, rules: &ElectionRules) -> Result<ElectionResult, StvErrors> {
    let mut forest = forest;
    let mut finalists: Children = BTreeMap::new();
    let mut elected: Vec<Candidate> = Vec::new();
    let mut eliminated: Vec<Candidate> = Vec::new();

    let initial_total = total_weight(&forest, &finalists);
    // Fails early on an empty election or an invalid number of seats.
    droop_quota(initial_total, rules.seats)?;
    let num_candidates = forest.len();

    let mut rounds: Vec<RoundReport> = vec![report::snapshot(
        &forest,
        &finalists,
        0,
        RoundOutcome::Start,
        None,
        initial_total,
    )];

    let mut iteration: u32 = 1;
    while !forest.is_empty() {
        let total = total_weight(&forest, &finalists);
        let quota = droop_quota(total, rules.seats)?;
        info!(
            "Round {} (total: {}, quota: {}, running: {}, elected: {})",
            iteration,
            total,
            quota,
            forest.len(),
            finalists.len()
        );

        let surplus_ids: Vec<CandidateId> = forest
            .values()
            .filter(|n| n.count() >= quota)
            .map(|n| n.id())
            .collect();
        let unfilled_seats = (rules.seats as usize).saturating_sub(finalists.len());

        let outcome = if !surplus_ids.is_empty() {
            debug!("tabulate: surplus candidates: {:?}", surplus_ids);
            let stats = elect_surpluses(&surplus_ids, quota, &mut forest, &mut finalists);
            elected.extend(stats.iter().map(|s| Candidate {
                id: s.id,
                name: s.name.clone(),
            }));
            RoundOutcome::Surplus(stats)
        } else if rules.remaining_candidates == RemainingCandidatesMode::ElectRemaining
            && forest.len() <= unfilled_seats
        {
            debug!(
                "tabulate: {} candidates left for {} seats, electing all of them",
                forest.len(),
                unfilled_seats
            );
            let candidates = elect_remaining(&mut forest, &mut finalists);
            elected.extend(candidates.iter().cloned());
            RoundOutcome::ElectedByDefault(candidates)
        } else {
            let cid = lowest_candidate(&forest);
            debug_assert!(cid.is_some(), "the forest is not empty");
            let node = match cid.and_then(|cid| forest.remove(&cid)) {
                Some(n) => n,
                None => unreachable!("no candidate to eliminate in a non-empty forest"),
            };
            let stats = eliminate(node, &mut forest);
            debug!("tabulate: eliminated: {:?}", stats);
            eliminated.push(Candidate {
                id: stats.id,
                name: stats.name.clone(),
            });
            RoundOutcome::Eliminated(stats)
        };

        let rr = report::snapshot(
            &forest,
            &finalists,
            iteration,
            outcome,
            Some(quota),
            total,
        );
        info!("Round {}: {}", iteration, rr.message);
        rounds.push(rr);
        iteration += 1;
    }

    // Invariant: every round removes at least one candidate from the forest.
    debug_assert!(rounds.len() <= num_candidates + 1);

    Ok(ElectionResult {
        seats: rules.seats,
        elected,
        eliminated,
        rounds,
    })
}

/// The running candidate with the fewest votes.
///
/// Ties are broken in favour of the lowest candidate id: candidates are
/// visited in increasing id order and only a strictly lower count replaces
/// the current pick.
fn lowest_candidate(forest: &Forest) -> Option<CandidateId> {
    let mut lowest: Option<&CandidateNode> = None;
    for node in forest.values() {
        match lowest {
            Some(l) if node.count() >= l.count() => {}
            _ => lowest = Some(node),
        }
    }
    lowest.map(|n| n.id())
}

/// Promotes all the candidates that reached the quota, then transfers their
/// surplus.
///
/// All the candidates are promoted before any transfer: an elected candidate
/// never receives the surplus of another one.
fn elect_surpluses(
    ids: &[CandidateId],
    quota: VoteWeight,
    forest: &mut Forest,
    finalists: &mut Children,
) -> Vec<TransferStats> {
    let mut overflows: Vec<(Arc<Candidate>, VoteWeight, Children)> = Vec::new();
    for cid in ids.iter() {
        let node = match forest.remove(cid) {
            Some(n) => n,
            None => continue,
        };
        let count = node.count();
        let surplus = count - quota;
        let surplus_fraction = surplus.value() / count.value();
        debug!(
            "elect_surpluses: {} has {} votes, surplus fraction {}",
            node.candidate().name,
            count,
            surplus_fraction
        );

        let mut kept = node.multiply(1.0 - surplus_fraction);
        kept.set_count(quota);
        let overflow: Children = node
            .children()
            .iter()
            .map(|(child_id, child)| (*child_id, child.multiply(surplus_fraction)))
            .collect();

        overflows.push((Arc::clone(node.candidate()), surplus, overflow));
        finalists.insert(*cid, kept);
    }

    overflows
        .into_iter()
        .map(|(candidate, surplus, overflow)| {
            let received = distribute(overflow, forest);
            transfer_stats(&candidate, surplus, &received, forest)
        })
        .collect()
}

fn elect_remaining(forest: &mut Forest, finalists: &mut Children) -> Vec<Candidate> {
    let remaining = std::mem::take(forest);
    remaining
        .into_iter()
        .map(|(cid, node)| {
            let c = node.candidate().as_ref().clone();
            finalists.insert(cid, node);
            c
        })
        .collect()
}

fn eliminate(node: CandidateNode, forest: &mut Forest) -> TransferStats {
    let candidate = Arc::clone(node.candidate());
    let count = node.count();
    let received = distribute(node.into_children(), forest);
    transfer_stats(&candidate, count, &received, forest)
}

/// Merges transferred nodes into the trees of the running candidates.
///
/// A node whose candidate is not running (eliminated, elected, or never a
/// first preference) is dropped, and its children are transferred in turn.
/// The weight of the ballots that stop at a dropped node is exhausted.
///
/// Returns the weight received by each running candidate.
pub(crate) fn distribute(
    transfers: Children,
    forest: &mut Forest,
) -> BTreeMap<CandidateId, VoteWeight> {
    let mut received: BTreeMap<CandidateId, VoteWeight> = BTreeMap::new();
    // Popped in increasing id order.
    let mut pending: Vec<CandidateNode> = transfers.into_values().rev().collect();
    while let Some(node) = pending.pop() {
        let cid = node.id();
        match forest.remove(&cid) {
            Some(root) => {
                *received.entry(cid).or_insert(VoteWeight::EMPTY) += node.count();
                forest.insert(cid, root + node);
            }
            None => {
                pending.extend(node.into_children().into_values().rev());
            }
        }
    }
    received
}

fn transfer_stats(
    from: &Candidate,
    transferred: VoteWeight,
    received: &BTreeMap<CandidateId, VoteWeight>,
    forest: &Forest,
) -> TransferStats {
    let received_total: VoteWeight = received.values().cloned().sum();
    let transfers: Vec<(String, f64)> = received
        .iter()
        .filter(|(_, vw)| vw.value() > 0.0)
        .filter_map(|(cid, vw)| {
            forest
                .get(cid)
                .map(|n| (n.candidate().name.clone(), vw.value()))
        })
        .collect();
    // Transfers never create weight.
    debug_assert!(
        received_total.value() <= transferred.value() + 1e-9 * transferred.value().max(1.0),
        "{} received {} out of {}",
        from.name,
        received_total,
        transferred
    );
    TransferStats {
        id: from.id,
        name: from.name.clone(),
        transfers,
        // Rounding can leave a tiny negative remainder.
        exhausted: (transferred - received_total).value().max(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{build_forest, roster};

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn weighted(choices: &[u32], count: u64) -> Ballot {
        Ballot {
            choices: choices.iter().map(|c| CandidateId(*c)).collect(),
            count,
        }
    }

    fn abc() -> Vec<Candidate> {
        vec![
            Candidate::new(1, "A"),
            Candidate::new(2, "B"),
            Candidate::new(3, "C"),
        ]
    }

    fn run(ballots: &[Ballot], candidates: &[Candidate], rules: &ElectionRules) -> ElectionResult {
        let forest = build_forest(ballots, &roster(candidates).unwrap()).unwrap();
        tabulate(forest, rules).unwrap()
    }

    fn counts(rr: &RoundReport) -> Vec<(String, f64)> {
        rr.status.iter().map(|s| (s.name.clone(), s.count)).collect()
    }

    fn names(cs: &[Candidate]) -> Vec<&str> {
        cs.iter().map(|c| c.name.as_str()).collect()
    }

    fn node(id: u32, name: &str, count: f64) -> CandidateNode {
        CandidateNode::new(Arc::new(Candidate::new(id, name)), VoteWeight(count))
    }

    #[test]
    fn droop_quota_values() {
        assert_eq!(droop_quota(VoteWeight(100.0), 3), Ok(VoteWeight(26.0)));
        assert_eq!(droop_quota(VoteWeight(4.0), 1), Ok(VoteWeight(3.0)));
        assert_eq!(droop_quota(VoteWeight(8.75), 2), Ok(VoteWeight(3.0)));
        assert_eq!(
            droop_quota(VoteWeight::EMPTY, 1),
            Err(StvErrors::EmptyElection)
        );
        assert_eq!(
            droop_quota(VoteWeight(10.0), 0),
            Err(StvErrors::InvalidSeats(0))
        );
    }

    #[test]
    fn lowest_id_wins_ties() {
        let mut forest: Forest = BTreeMap::new();
        forest.insert(CandidateId(5), node(5, "E", 1.0));
        forest.insert(CandidateId(3), node(3, "C", 1.0));
        forest.insert(CandidateId(1), node(1, "A", 2.0));
        assert_eq!(lowest_candidate(&forest), Some(CandidateId(3)));
        assert_eq!(lowest_candidate(&BTreeMap::new()), None);
    }

    #[test]
    fn distribute_flattens_missing_candidates() {
        let mut forest: Forest = BTreeMap::new();
        forest.insert(CandidateId(2), node(2, "B", 3.0));

        // C is not running: its own weight is exhausted and its child goes to B.
        let mut c = node(3, "C", 2.0);
        c.add_child(Arc::new(Candidate::new(2, "B")), VoteWeight(1.5));
        let mut transfers: Children = BTreeMap::new();
        transfers.insert(CandidateId(3), c);
        transfers.insert(CandidateId(2), node(2, "B", 1.0));

        let received = distribute(transfers, &mut forest);
        assert_eq!(received.len(), 1);
        assert_eq!(received[&CandidateId(2)], VoteWeight(2.5));
        assert_eq!(forest[&CandidateId(2)].count(), VoteWeight(5.5));
        assert_eq!(forest.len(), 1);
    }

    #[test]
    fn sole_survivor_is_resolved() {
        init();
        // B and C are tied with one vote: B goes first. A then holds 2 votes out
        // of 3, which is the quota.
        let ballots = vec![
            Ballot::new(&[1]),
            Ballot::new(&[1]),
            Ballot::new(&[2]),
            Ballot::new(&[3]),
        ];
        let res = run(&ballots, &abc(), &ElectionRules::DEFAULT_RULES);

        assert_eq!(res.rounds.len(), 4);
        assert_eq!(res.rounds[0].message, "No rounds yet");
        assert_eq!(res.rounds[0].quota, None);

        let r1 = &res.rounds[1];
        assert_eq!(r1.quota, Some(3.0));
        assert_eq!(r1.message, "Eliminating: B");
        match &r1.outcome {
            RoundOutcome::Eliminated(stats) => {
                assert!(stats.transfers.is_empty());
                assert_eq!(stats.exhausted, 1.0);
            }
            x => panic!("unexpected outcome {:?}", x),
        }
        assert_eq!(
            counts(r1),
            vec![("A".to_string(), 2.0), ("C".to_string(), 1.0)]
        );

        let r2 = &res.rounds[2];
        assert_eq!(r2.total, 3.0);
        assert_eq!(r2.quota, Some(2.0));
        assert_eq!(r2.message, "Surplus: A");
        assert_eq!(r2.status[0].state, CandidateState::Elected);

        assert_eq!(res.rounds[3].message, "Eliminating: C");
        assert_eq!(names(&res.elected), vec!["A"]);
        assert_eq!(names(&res.eliminated), vec!["B", "C"]);
        assert_eq!(res.winners(), vec!["A".to_string()]);
    }

    #[test]
    fn surplus_is_transferred_proportionally() {
        init();
        let ballots = vec![
            weighted(&[1, 2], 6),
            weighted(&[1, 3], 2),
            weighted(&[3], 3),
            weighted(&[2], 1),
        ];
        let res = run(&ballots, &abc(), &ElectionRules::with_seats(2));

        let r1 = &res.rounds[1];
        assert_eq!(r1.quota, Some(5.0));
        assert_eq!(
            counts(r1),
            vec![
                ("A".to_string(), 5.0),
                ("B".to_string(), 3.25),
                ("C".to_string(), 3.75)
            ]
        );
        match &r1.outcome {
            RoundOutcome::Surplus(stats) => {
                assert_eq!(stats.len(), 1);
                assert_eq!(
                    stats[0].transfers,
                    vec![("B".to_string(), 2.25), ("C".to_string(), 0.75)]
                );
                assert_eq!(stats[0].exhausted, 0.0);
            }
            x => panic!("unexpected outcome {:?}", x),
        }

        assert_eq!(res.rounds[2].message, "Eliminating: B");
        let r3 = &res.rounds[3];
        assert_eq!(r3.quota, Some(3.0));
        assert_eq!(r3.message, "Surplus: C");
        assert_eq!(names(&res.elected), vec!["A", "C"]);
        assert_eq!(names(&res.eliminated), vec!["B"]);
        assert_eq!(res.rounds.len(), 4);
    }

    #[test]
    fn elected_candidates_do_not_receive_surplus() {
        init();
        let ballots = vec![
            weighted(&[1, 2, 3], 8),
            weighted(&[2], 6),
            weighted(&[3], 2),
        ];
        let res = run(&ballots, &abc(), &ElectionRules::with_seats(2));

        let r1 = &res.rounds[1];
        assert_eq!(r1.quota, Some(6.0));
        assert_eq!(r1.message, "Surplus: A, B");
        assert_eq!(
            counts(r1),
            vec![
                ("A".to_string(), 6.0),
                ("B".to_string(), 6.0),
                ("C".to_string(), 4.0)
            ]
        );
        match &r1.outcome {
            RoundOutcome::Surplus(stats) => {
                assert_eq!(stats[0].transfers, vec![("C".to_string(), 2.0)]);
                assert!(stats[1].transfers.is_empty());
            }
            x => panic!("unexpected outcome {:?}", x),
        }
        assert_eq!(res.rounds[2].message, "Eliminating: C");
        assert_eq!(names(&res.elected), vec!["A", "B"]);
    }

    #[test]
    fn remaining_candidate_fills_the_last_seat() {
        init();
        let ballots = vec![weighted(&[1], 5), weighted(&[2], 1), weighted(&[3], 1)];
        let res = run(&ballots, &abc(), &ElectionRules::with_seats(2));

        let messages: Vec<&str> = res.rounds.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "No rounds yet",
                "Surplus: A",
                "Eliminating: B",
                "Elected by default: C"
            ]
        );
        assert_eq!(res.rounds[3].quota, Some(2.0));
        assert_eq!(names(&res.elected), vec!["A", "C"]);
        assert_eq!(names(&res.eliminated), vec!["B"]);
    }

    #[test]
    fn remaining_candidate_can_be_eliminated() {
        let ballots = vec![weighted(&[1], 5), weighted(&[2], 1), weighted(&[3], 1)];
        let rules = ElectionRules {
            seats: 2,
            remaining_candidates: RemainingCandidatesMode::EliminateRemaining,
        };
        let res = run(&ballots, &abc(), &rules);
        assert_eq!(res.rounds[3].message, "Eliminating: C");
        assert_eq!(names(&res.elected), vec!["A"]);
        assert_eq!(names(&res.eliminated), vec!["B", "C"]);
    }

    #[test]
    fn rounds_conserve_weight() {
        init();
        let candidates = vec![
            Candidate::new(21, "Boots"),
            Candidate::new(42, "Hannah"),
            Candidate::new(3, "Mara"),
            Candidate::new(39, "Sean"),
            Candidate::new(402, "Big Chill"),
            Candidate::new(10, "William Brigham Albert Jones III"),
        ];
        let ids: Vec<u32> = candidates.iter().map(|c| c.id.0).collect();
        // Rotations of the candidate list, cut at various lengths.
        let ballots: Vec<Ballot> = (0..120)
            .map(|i| {
                let start = (i * 7) % ids.len();
                let len = 1 + (i * 5) % ids.len();
                let choices: Vec<u32> = (0..len)
                    .map(|k| ids[(start + k * (1 + i % 2)) % ids.len()])
                    .collect();
                Ballot::new(&choices)
            })
            .collect();

        for seats in 1..=4 {
            let res = run(&ballots, &candidates, &ElectionRules::with_seats(seats));
            assert!(res.rounds.len() - 1 <= candidates.len());
            assert_eq!(
                res.elected.len() + res.eliminated.len(),
                candidates.len()
            );
            assert!(res.rounds.last().unwrap().status.iter().all(|s| s.state == CandidateState::Elected));
            assert!(approx(res.rounds[0].total, 120.0));

            for r in res.rounds.iter().skip(1) {
                let after: f64 = r.status.iter().map(|s| s.count).sum();
                let exhausted: f64 = match &r.outcome {
                    RoundOutcome::Surplus(stats) => stats.iter().map(|s| s.exhausted).sum(),
                    RoundOutcome::Eliminated(stats) => stats.exhausted,
                    _ => 0.0,
                };
                assert!(exhausted >= 0.0);
                assert!(
                    approx(after + exhausted, r.total),
                    "round {}: {} + {} != {}",
                    r.iteration,
                    after,
                    exhausted,
                    r.total
                );
            }
        }
    }

    #[test]
    fn empty_forest_is_an_empty_election() {
        let res = tabulate(BTreeMap::new(), &ElectionRules::DEFAULT_RULES);
        assert_eq!(res, Err(StvErrors::EmptyElection));
    }
}
