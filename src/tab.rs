use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use stv_tree::*;

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;

pub mod config_reader;
pub mod io_common;
pub mod io_csv;

use crate::tab::config_reader::*;
use crate::tab::io_common::CandidateLookup;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TabError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the JSON content of {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error writing the summary"))]
    WritingJson { source: serde_json::Error },
    #[snafu(display("Error writing the summary to {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Expected an index (a number starting at 1)"))]
    ParsingJsonNumber {},
    #[snafu(display("Could not find the directory of {path}"))]
    MissingParentDir { path: String },
    #[snafu(display("No ballots: set 'ballots' or 'cvrFileSources' in the configuration"))]
    MissingBallots {},
    #[snafu(display("Provider not implemented: {provider}"))]
    UnknownProvider { provider: String },

    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error parsing CSV line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("CSV line {lineno} is too short"))]
    CsvLineTooShort { lineno: usize },
    #[snafu(display("CSV line {lineno}: expected a count, got {value:?}"))]
    CsvCount { lineno: usize, value: String },
    #[snafu(display("Ballot {ballot_id}: {value:?} is not the name or the id of a candidate"))]
    UnknownChoice { ballot_id: String, value: String },

    #[snafu(display("Tabulation failed: {source}"))]
    Tabulation { source: StvErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type TabResult<T> = Result<T, TabError>;

/// A ballot, as parsed by the readers.
/// This is before resolving the candidates.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedBallot {
    pub id: String,
    pub count: Option<u64>,
    pub choices: Vec<String>,
}

fn result_stats_to_json(rs: &ElectionResult) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for round_stat in rs.rounds.iter() {
        let mut tally: JSMap<String, JSValue> = JSMap::new();
        for status in round_stat.status.iter() {
            tally.insert(status.name.clone(), json!(status.count.to_string()));
        }

        let mut tally_results: Vec<JSValue> = Vec::new();
        match &round_stat.outcome {
            RoundOutcome::Start => {}
            RoundOutcome::Surplus(stats) => {
                for s in stats.iter() {
                    tally_results.push(json!({
                        "elected": s.name,
                        "transfers": transfers_to_json(s)
                    }));
                }
            }
            RoundOutcome::Eliminated(s) => {
                tally_results.push(json!({
                    "eliminated": s.name,
                    "transfers": transfers_to_json(s)
                }));
            }
            RoundOutcome::ElectedByDefault(candidates) => {
                for c in candidates.iter() {
                    tally_results.push(json!({
                        "elected": c.name,
                        "transfers": {}
                    }));
                }
            }
        }

        let mut js = json!({
            "round": round_stat.iteration,
            "message": round_stat.message,
            "tally": tally,
            "tallyResults": tally_results
        });
        if let Some(quota) = round_stat.quota {
            js["threshold"] = json!(quota.to_string());
        }
        l.push(js);
    }
    l
}

fn transfers_to_json(stats: &TransferStats) -> JSMap<String, JSValue> {
    let mut transfers: JSMap<String, JSValue> = JSMap::new();
    for (name, count) in stats.transfers.iter() {
        transfers.insert(name.clone(), json!(count.to_string()));
    }
    if stats.exhausted > 0.0 {
        transfers.insert(
            "exhausted".to_string(),
            json!(stats.exhausted.to_string()),
        );
    }
    transfers
}

fn build_summary_js(config: &TabConfig, rules: &ElectionRules, rv: &ElectionResult) -> JSValue {
    let c = OutputConfig {
        contest: config.output_settings.contest_name.clone(),
        date: config.output_settings.contest_date.clone(),
        jurisdiction: config.output_settings.contest_jurisdiction.clone(),
        office: config.output_settings.contest_office.clone(),
        seats: rules.seats,
    };
    let elected: Vec<String> = rv.elected.iter().map(|c| c.name.clone()).collect();
    let eliminated: Vec<String> = rv.eliminated.iter().map(|c| c.name.clone()).collect();
    json!({
        "config": c,
        "outcome": {"elected": elected, "eliminated": eliminated},
        "results": result_stats_to_json(rv) })
}

fn validate_rules(tab_rules: &TabRules, seats_override: Option<u32>) -> TabResult<ElectionRules> {
    let seats = seats_override
        .or(tab_rules.number_of_winners)
        .unwrap_or(ElectionRules::DEFAULT_RULES.seats);
    if seats < 1 {
        whatever!("The number of winners must be at least 1, got {}", seats)
    }
    let remaining_candidates = match tab_rules.elect_remaining_candidates {
        Some(false) => RemainingCandidatesMode::EliminateRemaining,
        _ => RemainingCandidatesMode::ElectRemaining,
    };
    Ok(ElectionRules {
        seats,
        remaining_candidates,
    })
}

fn read_ranking_data(root_path: &Path, cfs: &FileSource) -> TabResult<Vec<ParsedBallot>> {
    let p: PathBuf = root_path.join(&cfs.file_path);
    let p2 = p.as_path().display().to_string();
    info!("Attempting to read rank file {:?}", p2);
    match cfs.provider.as_str() {
        "csv" => io_csv::read_csv_ranking(&p2, cfs),
        x => UnknownProviderSnafu { provider: x }.fail(),
    }
}

fn validate_ballots(
    parsed_ballots: &[ParsedBallot],
    candidates: &[TabCandidate],
) -> TabResult<Vec<Ballot>> {
    let lookup = CandidateLookup::new(candidates);
    let mut res: Vec<Ballot> = Vec::new();
    for pb in parsed_ballots.iter() {
        let mut choices: Vec<CandidateId> = Vec::new();
        for s in pb.choices.iter() {
            // Blank cells are skipped.
            if s.trim().is_empty() {
                continue;
            }
            let cid = lookup.resolve(s).context(UnknownChoiceSnafu {
                ballot_id: pb.id.clone(),
                value: s.clone(),
            })?;
            choices.push(CandidateId(cid));
        }
        debug!("Choices for ballot {:?}: {:?}", pb.id, choices);

        // Default of 1 if not specified
        let count = pb.count.unwrap_or(1);
        if count > 0 && !choices.is_empty() {
            res.push(Ballot { choices, count });
        }
    }
    Ok(res)
}

fn read_ballots(
    config_path: &str,
    config: &TabConfig,
    input: &Option<String>,
) -> TabResult<Vec<Ballot>> {
    // An explicit input file replaces everything in the configuration.
    if let Some(input_path) = input {
        let cfs = FileSource::csv(input_path);
        let parsed = io_csv::read_csv_ranking(input_path, &cfs)?;
        return validate_ballots(&parsed, &config.candidates);
    }
    ensure!(
        config.ballots.is_some() || !config.cvr_file_sources.is_empty(),
        MissingBallotsSnafu {}
    );

    let mut data: Vec<Ballot> = Vec::new();
    if let Some(inline) = &config.ballots {
        data.extend(inline.iter().map(|choices| Ballot {
            choices: choices.iter().map(|c| CandidateId(*c)).collect(),
            count: 1,
        }));
    }

    if !config.cvr_file_sources.is_empty() {
        let root_p = Path::new(config_path)
            .parent()
            .context(MissingParentDirSnafu { path: config_path })?;
        for cfs in config.cvr_file_sources.iter() {
            let parsed = read_ranking_data(root_p, cfs)?;
            data.extend(validate_ballots(&parsed, &config.candidates)?);
        }
    }

    Ok(data)
}

fn write_summary(out: &Option<String>, pretty_js_stats: &str) -> TabResult<()> {
    match out.as_deref() {
        None | Some("stdout") => {
            println!("{}", pretty_js_stats);
        }
        Some(path) => {
            info!("Writing summary to {:?}", path);
            fs::write(path, pretty_js_stats).context(WritingFileSnafu { path })?;
        }
    }
    Ok(())
}

/// Tabulates an election as described by the arguments.
///
/// Returns the summary of the election.
pub fn run_election(args: &Args) -> TabResult<JSValue> {
    let config = read_config(&args.config)?;
    info!("config: {:?}", config);

    // Validate the rules:
    let rules = validate_rules(&config.rules, args.seats)?;

    let ballots = read_ballots(&args.config, &config, &args.input)?;
    info!("Read {} ballots", ballots.len());

    let candidates: Vec<Candidate> = config
        .candidates
        .iter()
        .map(|c| Candidate::new(c.id, &c.name))
        .collect();

    let result = stv_tree::run_election(&ballots, &candidates, &rules).context(TabulationSnafu {})?;

    // Assemble the final json
    let result_js = build_summary_js(&config, &rules, &result);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(WritingJsonSnafu {})?;
    write_summary(&args.out, &pretty_js_stats)?;

    // The reference summary, if provided for comparison
    if let Some(summary_p) = &args.reference {
        let summary_ref = read_summary(summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(WritingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference string");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            whatever!("Difference detected between calculated summary and reference summary")
        }
    }

    Ok(result_js)
}
