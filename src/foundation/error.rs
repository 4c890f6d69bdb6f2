use crate::foundation::core::Axis;

/// Crate-wide result type.
pub type RaceResult<T> = Result<T, RaceError>;

/// Errors surfaced by the race engine, renderers and sinks.
#[derive(thiserror::Error, Debug)]
pub enum RaceError {
    /// Invalid configuration or malformed input values.
    #[error("validation error: {0}")]
    Validation(String),

    /// Series key sequences disagree in length or order.
    #[error("data shape error: {0}")]
    DataShape(String),

    /// No series (or no timeline keys) were supplied.
    #[error("empty dataset: {0}")]
    EmptyDataset(String),

    /// A transition was started on an axis that is already in flight.
    ///
    /// This indicates a scheduling bug in the step loop and terminates the run.
    #[error("transition conflict: '{label}' is already transitioning on the {axis} axis")]
    TransitionConflict {
        /// Label of the bar that rejected the transition.
        label: String,
        /// Axis that was already in flight.
        axis: Axis,
    },

    /// Renderer failure (SVG parse, pixmap allocation).
    #[error("render error: {0}")]
    Render(String),

    /// Frame sink failure (encoder process, image writer).
    #[error("encode error: {0}")]
    Encode(String),

    /// Configuration or data (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, usually IO with context attached.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RaceError {
    /// Build a [`RaceError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`RaceError::DataShape`].
    pub fn data_shape(msg: impl Into<String>) -> Self {
        Self::DataShape(msg.into())
    }

    /// Build a [`RaceError::EmptyDataset`].
    pub fn empty_dataset(msg: impl Into<String>) -> Self {
        Self::EmptyDataset(msg.into())
    }

    /// Build a [`RaceError::TransitionConflict`].
    pub fn transition_conflict(label: impl Into<String>, axis: Axis) -> Self {
        Self::TransitionConflict {
            label: label.into(),
            axis,
        }
    }

    /// Build a [`RaceError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`RaceError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`RaceError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
