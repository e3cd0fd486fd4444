use std::num::ParseIntError;

use thiserror::Error;

use crate::landmass::Stage;

#[derive(Debug, Error)]
pub enum CoordinateParseError {
    #[error("malformed coordinate `{0}`, expected `(x, y)`")]
    Malformed(String),
    #[error("invalid coordinate component: {0}")]
    Component(#[from] ParseIntError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Нарушение порядка стадий анализа материка.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("stage {stage:?} requires {requires:?} to run first")]
    MissingStage { stage: Stage, requires: Stage },
    #[error("stage {stage:?} cannot run after {by:?}")]
    Invalidated { stage: Stage, by: Stage },
}
