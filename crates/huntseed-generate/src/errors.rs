use thiserror::Error;

use crate::model::GenerationReport;
use crate::stage::Stage;

/// Errors emitted by the generation engine.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Layout(#[from] huntseed_core::Error),
    #[error("invalid options: {0}")]
    InvalidOptions(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("{} #{index} failed: {source}", stage.entity())]
    Stage {
        stage: Stage,
        index: u64,
        #[source]
        source: Box<GenerationError>,
    },
    #[error("{} produced {actual} rows, layout expects {expected}", stage.name())]
    RowCount {
        stage: Stage,
        expected: u64,
        actual: u64,
    },
    #[error("generation failed")]
    Failed(Box<GenerationReport>),
}

impl GenerationError {
    pub(crate) fn at(stage: Stage, index: u64, source: GenerationError) -> Self {
        Self::Stage {
            stage,
            index,
            source: Box::new(source),
        }
    }
}
