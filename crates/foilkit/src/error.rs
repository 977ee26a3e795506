/// Why a single airfoil was skipped
///
/// None of these abort a batch; they are collected and reported per item.
#[derive(thiserror::Error, Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum Error {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Solver failed: {0}")]
    Solver(String),

    #[error("No data found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}
