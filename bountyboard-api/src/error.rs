use anyhow::{anyhow, Context};

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// The requested page or object does not exist (any more)
    #[error("Not found")]
    NotFound,

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    NotFound,
    Request,
    MalformedResponse,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound => ErrorKind::NotFound,
            Error::Request(_) => ErrorKind::Request,
            Error::MalformedResponse(_) => ErrorKind::MalformedResponse,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound)
    }

    /// Malformed responses propagate like request errors, they only differ in
    /// how they get logged
    pub fn is_request_error(&self) -> bool {
        matches!(self, Error::Request(_) | Error::MalformedResponse(_))
    }

    /// Build the error matching a non-success HTTP answer
    pub fn from_status(status: http::StatusCode, body: &[u8]) -> Error {
        use http::StatusCode;
        match status {
            StatusCode::NOT_FOUND => Error::NotFound,
            _ => match Error::parse_detail(body) {
                Ok(detail) => Error::Request(format!("{status}: {detail}")),
                Err(_) => Error::Request(status.to_string()),
            },
        }
    }

    /// Extract the human-readable `detail` field the remote API puts in its
    /// error bodies
    pub fn parse_detail(body: &[u8]) -> anyhow::Result<String> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        data.get("detail")
            .or_else(|| data.get("error"))
            .and_then(|d| d.as_str())
            .map(String::from)
            .ok_or_else(|| anyhow!("error contents has no detail string"))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::MalformedResponse(e.to_string())
    }
}
