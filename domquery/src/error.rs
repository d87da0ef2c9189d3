use thiserror::Error;

pub type Result<T> = std::result::Result<T, QueryError>;

#[derive(Debug, Error)]
pub enum QueryError {
    /// The server answered with a 3xx. Redirects are never followed.
    #[error("Detected redirect from {url} ({status}), skipping")]
    RedirectDetected {
        url: String,
        status: u16,
        location: Option<String>,
    },

    /// DNS, connection, timeout or body read failure from the HTTP client.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The markup parser refused the document.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl QueryError {
    pub fn is_redirect(&self) -> bool {
        matches!(self, QueryError::RedirectDetected { .. })
    }
}
