use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Record not found: {0}")]
    RecordNotFound(i64),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
