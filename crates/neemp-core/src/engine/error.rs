use super::config::ConfigError;
use crate::core::io::parameters::ParameterFileError;
use crate::core::models::training_set::TrainingSetError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid training set: {0}")]
    TrainingSet(#[from] TrainingSetError),

    #[error("Parameter set does not fit the training set: {0}")]
    Parameters(#[from] ParameterFileError),

    #[error(
        "Cannot bracket the kappa optimum for Brent's method: the full scan has {points} point(s), at least 3 are required"
    )]
    BrentBracket { points: usize },

    #[error("Subset selects no molecules")]
    EmptySubset,

    #[error("Subset has not been evaluated yet")]
    SubsetNotEvaluated,

    #[error("Failed to build worker pool: {0}")]
    WorkerPool(String),

    #[error("Internal logic error: {0}")]
    Internal(String),
}
