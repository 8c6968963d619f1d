use serde_json::Value;

/// Substrings CEIDG puts in a 400 body when it rejects the NIP itself.
pub const INVALID_NIP_MARKERS: [&str; 2] = ["NIEPOPRAWNY_NUMER_NIP", "Niepoprawny identyfikator"];

/// What an upstream CEIDG response means for a lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifiedOutcome {
    /// 404 / 204 or an empty success body: no such record.
    Empty,
    /// 400 carrying one of [`INVALID_NIP_MARKERS`]: the registry does not
    /// recognize the identifier. Treated as "no record", not as a failure.
    InvalidIdentifier,
    /// Any other error status, or a success body that is not JSON.
    UpstreamError { status: u16, body: String },
    /// The request never produced a complete response.
    TransportFailure(String),
    /// Success with a parsed JSON body.
    Ok(Value),
}

/// Classifies an upstream status/body pair.
///
/// Never fails on a non-JSON body; for error statuses the raw text becomes
/// the error detail.
pub fn classify(status: u16, body: &[u8]) -> ClassifiedOutcome {
    match status {
        204 | 404 => ClassifiedOutcome::Empty,
        400 => {
            let text = String::from_utf8_lossy(body);
            if INVALID_NIP_MARKERS.iter().any(|marker| text.contains(marker)) {
                ClassifiedOutcome::InvalidIdentifier
            } else {
                ClassifiedOutcome::UpstreamError {
                    status,
                    body: text.into_owned(),
                }
            }
        }
        200..=299 => {
            if body.iter().all(u8::is_ascii_whitespace) {
                return ClassifiedOutcome::Empty;
            }
            match serde_json::from_slice(body) {
                Ok(parsed) => ClassifiedOutcome::Ok(parsed),
                Err(e) => {
                    tracing::warn!("CEIDG returned {} with a non-JSON body: {}", status, e);
                    ClassifiedOutcome::UpstreamError {
                        status,
                        body: String::from_utf8_lossy(body).into_owned(),
                    }
                }
            }
        }
        _ => ClassifiedOutcome::UpstreamError {
            status,
            body: String::from_utf8_lossy(body).into_owned(),
        },
    }
}

/// Classifies a `reqwest` error raised before a full response was read.
pub fn transport_failure(err: &reqwest::Error) -> ClassifiedOutcome {
    let kind = if err.is_timeout() {
        "timeout"
    } else if err.is_connect() {
        "connection failed"
    } else if err.is_body() || err.is_decode() {
        "response body unreadable"
    } else {
        "request failed"
    };

    ClassifiedOutcome::TransportFailure(format!("{}: {}", kind, err))
}
