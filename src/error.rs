use plotters::drawing::DrawingAreaErrorKind;

/// Reasons a speed log cannot become a dataset.
/// None of them produce a partial dataset.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("log file not found: {path}")]
    NotFound { path: String },

    #[error("could not read log file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("log file is empty: {path}")]
    Empty { path: String },

    #[error("missing required column `{column}`")]
    MissingColumn { column: &'static str },

    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: unparsable timestamp `{value}`")]
    Timestamp { line: u64, value: String },

    #[error("line {line}: non-numeric {column} value `{value}`")]
    Number {
        line: u64,
        column: &'static str,
        value: String,
    },

    #[error("line {line}: {column} must be a non-negative finite number, found {value}")]
    Throughput {
        line: u64,
        column: &'static str,
        value: f64,
    },
}

/// Failures while drawing or writing the report, fatal for the run.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("could not create output directory {path}: {source}")]
    OutputDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("plotting error: {0}")]
    Plot(String),

    #[error("could not write to console: {0}")]
    Console(#[from] std::io::Error),
}

impl<E> From<DrawingAreaErrorKind<E>> for RenderError
where
    E: std::error::Error + Send + Sync,
{
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Plot(e.to_string())
    }
}
