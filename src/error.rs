use thiserror::Error;

/// Error types that can occur while running the benchmark.
#[derive(Debug, Error)]
pub enum BenchError {
    /// HTTP request/response errors
    #[error("HTTP error: {0}")]
    HttpError(String),
    /// Server response parsing or format error
    #[error("Response format error: {message}. Raw response: {raw_response}")]
    ResponseFormatError {
        message: String,
        raw_response: String,
    },
    /// Dataset manifest or image loading errors
    #[error("Dataset error: {0}")]
    DatasetError(String),
    /// Image encode/decode errors
    #[error("Image error: {0}")]
    ImageError(String),
    /// JSON serialization/deserialization errors
    #[error("JSON parse error: {0}")]
    JsonError(String),
    /// Filesystem errors
    #[error("I/O error: {0}")]
    IoError(String),
}

/// Converts reqwest HTTP errors into BenchErrors
impl From<reqwest::Error> for BenchError {
    fn from(err: reqwest::Error) -> Self {
        BenchError::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for BenchError {
    fn from(err: serde_json::Error) -> Self {
        BenchError::JsonError(format!(
            "{} at line {} column {}",
            err,
            err.line(),
            err.column()
        ))
    }
}

impl From<std::io::Error> for BenchError {
    fn from(err: std::io::Error) -> Self {
        BenchError::IoError(err.to_string())
    }
}

impl From<image::ImageError> for BenchError {
    fn from(err: image::ImageError) -> Self {
        BenchError::ImageError(err.to_string())
    }
}
