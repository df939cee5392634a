use clap::Parser;

/// This is a Single Transferable Vote tabulation program.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The file containing the election description in JSON format: candidates, rules
    /// and ballots or ballot files. For more information about the file format, read the
    /// documentation of the `stv_tree::manual` module.
    #[clap(short, long, value_parser)]
    pub config: String,

    /// (file path) A reference file containing the outcome of an election in JSON format. If provided, stvtab will
    /// check that the tabulated output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the election will be written in JSON format to the given
    /// location. By default, the summary is printed on the standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) If specified, a CSV file with the ballots: one ballot per row, one rank per
    /// column, no header. Setting this option overrides the ballots and the sources that may be specified
    /// in the configuration.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (number or empty) If specified, overrides the number of seats of the configuration.
    #[clap(long, value_parser)]
    pub seats: Option<u32>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
