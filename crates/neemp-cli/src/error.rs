use neemp::core::io::chg::ChargeFileError;
use neemp::core::io::parameters::ParameterFileError;
use neemp::core::io::training::TrainingSetFileError;
use neemp::engine::error::EngineError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    NeempCore(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Training set error: {0}")]
    TrainingSet(#[from] TrainingSetFileError),

    #[error("Parameter file error: {0}")]
    Parameters(#[from] ParameterFileError),

    #[error("Charge file error: {0}")]
    Charges(#[from] ChargeFileError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
