use thiserror::Error;

/// Failure inside a single provider adapter.
///
/// These never leave the adapter: `StationProvider::query` downgrades them to
/// an empty result carrying a diagnostic.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} returned HTTP {status}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("malformed JSON from {url}: {source}")]
    Json {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("API key not configured")]
    MissingApiKey,
}

/// The target of a run could not be resolved. Fatal for that run.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Invalid coordinates '{input}'. Use LAT,LON (e.g. 45.9,6.9)")]
    MalformedCoordinates { input: String },

    #[error("Coordinates out of range: {latitude}, {longitude}")]
    OutOfRange { latitude: f64, longitude: f64 },

    #[error("Site not found: {name}")]
    SiteNotFound { name: String },

    #[error("Site lookup failed: {message}")]
    LookupFailed { name: String, message: String },
}

impl InputError {
    /// Remediation shown to the user under the error message.
    pub fn hint(&self) -> String {
        match self {
            InputError::MalformedCoordinates { .. } | InputError::OutOfRange { .. } => {
                "Hint: latitude must be within -90..90 and longitude within -180..180, \
                 e.g. `stations check \"45.9,6.9\" \"Annecy\"`."
                    .to_string()
            }
            InputError::SiteNotFound { name } | InputError::LookupFailed { name, .. } => format!(
                "Hint: provide coordinates directly: `stations check \"LAT,LON\" \"{name}\"`."
            ),
        }
    }
}

/// Cut a response body down to something fit for a log line.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
