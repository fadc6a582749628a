use std::path::PathBuf;

/// Everything that can stop a run.
/// Parse faults, configuration faults and the empty input set are kept apart
/// so the binary can report them with different exit codes.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{}: missing header line", path.display())]
    MissingHeader { path: PathBuf },

    #[error("{}:{line}: '{token}' is not a valid number", path.display())]
    InvalidNumber {
        path: PathBuf,
        line: usize,
        token: String,
    },

    #[error("{}:{line}: expected {expected} values, found {found}", path.display())]
    ColumnCount {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("series '{series}' has no column '{column}'")]
    MissingColumn { series: String, column: String },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("series '{series}': voltage {value} V at sample {index} does not fit a 16 bit millivolt value")]
    BadVoltage {
        series: String,
        index: usize,
        value: f64,
    },

    #[error("No data to plot!")]
    NoData,

    #[error("could not render the chart: {0}")]
    Render(String),
}

impl Error {
    /// process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::NoData => crate::EXIT_NO_DATA,
            Error::InvalidConfiguration(_) => crate::EXIT_BAD_CONFIG,
            _ => crate::EXIT_FAILURE,
        }
    }

    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Error::MissingHeader { .. } | Error::InvalidNumber { .. } | Error::ColumnCount { .. }
        )
    }
}
