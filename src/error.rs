/// Error type shared by every remote operation in this crate.
///
/// The variants mirror how failures are shown to the user: input problems
/// are caught before any request is issued, transport problems keep the
/// underlying source so connectivity issues stay distinguishable from
/// server-side rejections, and the two terminal polling outcomes are
/// separate because they carry different user-facing wording.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The configured base address could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// No captured image was provided (empty path).
    #[error("no image selected")]
    MissingImage,

    /// The captured image exists as a handle but could not be read.
    #[error("could not read image '{path}': {source}")]
    UnreadableImage {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The request never completed: DNS, connect, TLS, timeout.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response. `message` is the server's `error` field when the
    /// body carried one, otherwise a generic status-coded message.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// A 2xx response whose body did not match the expected shape.
    #[error("unexpected response payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// The analysis job reached an explicit failure marker.
    #[error("analysis failed")]
    AnalysisFailed,

    /// The polling budget ran out before the job reached a terminal state.
    #[error("analysis is still processing; timed out waiting for a result")]
    Timeout,
}

impl ApiError {
    /// True for failures detected before any network request was issued.
    pub fn is_input(&self) -> bool {
        matches!(self, ApiError::MissingImage | ApiError::UnreadableImage { .. })
    }
}
