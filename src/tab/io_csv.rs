// Primitives for reading CSV files.

use std::fs::File;

use crate::tab::{io_common::simplify_file_name, *};

pub fn read_csv_ranking(path: &str, cfs: &FileSource) -> TabResult<Vec<ParsedBallot>> {
    let default_id = make_default_id(path);

    let choices_start_col = cfs.first_vote_column_index()?;
    let count_idx_o = cfs.count_column_index()?;

    let mut res: Vec<ParsedBallot> = Vec::new();
    let (records, row_offset) = get_records(path, cfs)?;

    for (idx, line_r) in records.enumerate() {
        let lineno = idx + row_offset;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        debug!("read_csv_ranking: lineno: {:?} row: {:?}", lineno, line);

        let count: Option<u64> = if let Some(count_idx) = count_idx_o {
            let cell = line
                .get(count_idx)
                .context(CsvLineTooShortSnafu { lineno })?
                .trim();
            let c = cell
                .parse::<u64>()
                .ok()
                .context(CsvCountSnafu { lineno, value: cell })?;
            Some(c)
        } else {
            None
        };

        ensure!(
            line.len() > choices_start_col,
            CsvLineTooShortSnafu { lineno }
        );
        let choices: Vec<String> = line
            .iter()
            .skip(choices_start_col)
            .map(|s| s.to_string())
            .collect();

        res.push(ParsedBallot {
            id: default_id(lineno),
            count,
            choices,
        });
    }
    Ok(res)
}

fn get_records(path: &str, cfs: &FileSource) -> TabResult<(csv::StringRecordsIntoIter<File>, usize)> {
    let first_row = cfs.first_vote_row_index()?;
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let mut records = rdr.into_records();
    // The index starts at 1 to respect most conventions in the excel world
    for _ in 1..first_row {
        _ = records.next();
    }
    Ok((records, first_row))
}

fn make_default_id(path: &str) -> impl Fn(usize) -> String {
    let simplified_file_name = simplify_file_name(path);
    move |lineno| format!("{}-{:08}", simplified_file_name, lineno)
}
