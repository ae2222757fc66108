use thiserror::Error;

#[derive(Error, Debug)]
pub enum KasboekError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{file}: missing required column '{column}'")]
    MissingColumn { file: String, column: String },

    #[error("unparseable date '{0}'")]
    BadDate(String),

    #[error("bad amount '{0}'")]
    BadAmount(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, KasboekError>;
