use std::collections::HashMap;
use std::path::Path;

use crate::tab::config_reader::TabCandidate;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Resolves the content of a cell to a candidate id.
///
/// A cell may contain the name of a candidate or its id.
pub struct CandidateLookup {
    by_name: HashMap<String, u32>,
}

impl CandidateLookup {
    pub fn new(candidates: &[TabCandidate]) -> CandidateLookup {
        CandidateLookup {
            by_name: candidates.iter().map(|c| (c.name.clone(), c.id)).collect(),
        }
    }

    pub fn resolve(&self, cell: &str) -> Option<u32> {
        let s = cell.trim();
        self.by_name
            .get(s)
            .cloned()
            .or_else(|| s.parse::<u32>().ok())
    }
}
