use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown simulation type: {requested}")]
    UnknownScenario { requested: String },
    #[error("unknown report type: {requested}")]
    UnknownReport { requested: String },
    #[error("unknown report period: {requested}")]
    UnknownPeriod { requested: String },
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// Message safe to hand back to a caller-facing surface. Persistence
    /// details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::Domain(error) => error.to_string(),
            Self::Persistence(_) => {
                "The inventory store is temporarily unavailable. Please retry shortly.".to_owned()
            }
            Self::Configuration(_) => "An unexpected internal error occurred.".to_owned(),
        }
    }
}
