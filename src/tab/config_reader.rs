use crate::tab::*;

use serde::{Deserialize, Serialize};

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "contestName")]
    pub contest_name: String,
    #[serde(rename = "contestDate")]
    pub contest_date: Option<String>,
    #[serde(rename = "contestJurisdiction")]
    pub contest_jurisdiction: Option<String>,
    #[serde(rename = "contestOffice")]
    pub contest_office: Option<String>,
}

/// The description of the contest, as written in the summary.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub contest: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub office: Option<String>,
    pub seats: u32,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "firstVoteColumnIndex")]
    _first_vote_column_index: Option<JSValue>,
    #[serde(rename = "firstVoteRowIndex")]
    _first_vote_row_index: Option<JSValue>,
    #[serde(rename = "countColumnIndex")]
    _count_column_index: Option<JSValue>,
}

// All the indices start at 1 in the configuration, as in spreadsheets.
impl FileSource {
    /// A CSV file with one ballot per row and one rank per column, without
    /// header or count column.
    pub fn csv(path: &str) -> FileSource {
        FileSource {
            provider: "csv".to_string(),
            file_path: path.to_string(),
            _first_vote_column_index: None,
            _first_vote_row_index: None,
            _count_column_index: None,
        }
    }

    /// The first column with a choice (0-based). Defaults to the first column.
    pub fn first_vote_column_index(&self) -> TabResult<usize> {
        match &self._first_vote_column_index {
            None => Ok(0),
            x => Ok(read_js_int(x)? - 1),
        }
    }

    /// The first row with a ballot (1-based). Defaults to the first row.
    pub fn first_vote_row_index(&self) -> TabResult<usize> {
        match &self._first_vote_row_index {
            None => Ok(1),
            x => read_js_int(x),
        }
    }

    /// The column with the count of each ballot (0-based), if any.
    pub fn count_column_index(&self) -> TabResult<Option<usize>> {
        match &self._count_column_index {
            None => Ok(None),
            x => Ok(Some(read_js_int(x)? - 1)),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TabCandidate {
    pub id: u32,
    pub name: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct TabRules {
    #[serde(rename = "numberOfWinners")]
    pub number_of_winners: Option<u32>,
    #[serde(rename = "electRemainingCandidates")]
    pub elect_remaining_candidates: Option<bool>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TabConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    pub candidates: Vec<TabCandidate>,
    #[serde(default)]
    pub rules: TabRules,
    pub ballots: Option<Vec<Vec<u32>>>,
    #[serde(rename = "cvrFileSources", default)]
    pub cvr_file_sources: Vec<FileSource>,
}

pub fn read_config(path: &str) -> TabResult<TabConfig> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let config: TabConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    Ok(config)
}

pub fn read_summary(path: &str) -> TabResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    debug!("read content: {:?}", contents);
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    Ok(js)
}

fn read_js_int(x: &Option<JSValue>) -> TabResult<usize> {
    let res = match x {
        Some(JSValue::Number(n)) => n
            .as_u64()
            .map(|x| x as usize)
            .context(ParsingJsonNumberSnafu {}),
        Some(JSValue::String(s)) => s.parse::<usize>().ok().context(ParsingJsonNumberSnafu {}),
        _ => None.context(ParsingJsonNumberSnafu {}),
    }?;
    // Indices start at 1.
    ensure!(res >= 1, ParsingJsonNumberSnafu {});
    Ok(res)
}
