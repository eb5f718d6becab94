use thiserror::Error;

#[derive(Debug, Error)]
pub enum PanelApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Request to the panel failed: {0}")]
    RequestError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("The panel rejected the request: {0}")]
    Rejected(String),
    #[error("The panel response is missing the '{0}' field")]
    MissingField(&'static str),
}
