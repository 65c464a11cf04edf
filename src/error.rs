use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SwitchError {
    #[error("invalid switch driver: {0}")]
    InvalidDriver(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("invalid value: {0}")]
    InvalidValue(String),
    #[error("not turnable")]
    NotTurnable,
    #[error("unexpected status code: {0}")]
    UnexpectedStatusCode(u16),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("json error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("GPIO error: {0}")]
    Gpio(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("worker error: {0}")]
    Worker(String),
}

impl SwitchError {
    /// True for the rejection of a transition into the state the switch is already in.
    pub fn is_precondition(&self) -> bool {
        matches!(self, SwitchError::NotTurnable)
    }
}

impl ResponseError for SwitchError {
    fn status_code(&self) -> StatusCode {
        match self {
            SwitchError::NotTurnable => StatusCode::CONFLICT,
            SwitchError::InvalidValue(_) => StatusCode::BAD_REQUEST,
            SwitchError::UnexpectedStatusCode(_)
            | SwitchError::Transport(_)
            | SwitchError::Decode(_) => StatusCode::BAD_GATEWAY,
            SwitchError::InvalidDriver(_)
            | SwitchError::InvalidConfig(_)
            | SwitchError::Gpio(_)
            | SwitchError::Storage(_)
            | SwitchError::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
