use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("parse error at line {line}: {message}")]
    Parse { line: u64, message: String },
    #[error("bad timestamp at row {row}: {value:?}")]
    Format { row: usize, value: String },
    #[error("invalid grouping config: {0}")]
    Config(String),
    #[error("schema mismatch at row {row}: {message}")]
    Schema { row: usize, message: String },
}

impl Error {
    pub(crate) fn parse(line: u64, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }
}

impl From<csv::Error> for Error {
    fn from(value: csv::Error) -> Self {
        let line = value.position().map(|pos| pos.line()).unwrap_or(0);
        let message = value.to_string();
        match value.into_kind() {
            csv::ErrorKind::Io(err) => Error::Io(err),
            _ => Error::parse(line, message),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
