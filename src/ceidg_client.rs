use crate::classifier::{self, ClassifiedOutcome};
use crate::errors::AppError;
use crate::mapping;
use crate::nip::Nip;
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Per-request timeout for both the search and the detail call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const CORRESPONDENCE_ADDRESS: &str = "adresKorespondencyjny";

/// Contact fields that only the detail payload reliably carries.
const DETAIL_FIELDS: [&str; 6] = [
    "telefon",
    "email",
    "www",
    "adresDoreczenElektronicznych",
    "innaFormaKonaktu",
    CORRESPONDENCE_ADDRESS,
];

/// Result of looking a NIP up in CEIDG.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult {
    /// The registry has no company under this NIP.
    NotFound,
    /// The registry rejected the NIP as malformed.
    InvalidFormat,
    /// Company payload, merged with its detail record when that was available.
    Found(Value),
    /// Non-transient upstream error.
    Error { status: u16, body: String },
    /// Network or timeout failure.
    TransportFailure(String),
}

/// Client for the CEIDG company registry API.
///
/// Searching by NIP goes through the collection endpoint, which omits most
/// contact data; the per-company `link` it returns is followed to fill it in.
#[derive(Clone)]
pub struct CeidgClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl CeidgClient {
    /// Creates a new `CeidgClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The CEIDG company search endpoint.
    /// * `api_key` - The CEIDG API token for bearer authentication.
    pub fn new(base_url: &str, api_key: String) -> Result<Self, AppError> {
        Self::with_timeout(base_url, api_key, REQUEST_TIMEOUT)
    }

    /// Same as [`CeidgClient::new`] with a custom per-request timeout.
    pub fn with_timeout(
        base_url: &str,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::ConfigError(format!("Invalid CEIDG API URL: {}", e)))?;

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    /// Looks a company up by NIP.
    ///
    /// Never returns an error: every outcome, including transport failures,
    /// is a [`FetchResult`] variant.
    pub async fn fetch(&self, nip: &Nip) -> FetchResult {
        let mut url = self.base_url.clone();
        url.query_pairs_mut().append_pair("nip", nip.as_str());

        tracing::info!("Fetching company {} from CEIDG", nip);

        match self.get(url).await {
            ClassifiedOutcome::Empty => {
                tracing::info!("CEIDG has no company for NIP {}", nip);
                FetchResult::NotFound
            }
            ClassifiedOutcome::InvalidIdentifier => {
                tracing::info!("CEIDG rejected NIP {} as invalid", nip);
                FetchResult::InvalidFormat
            }
            ClassifiedOutcome::UpstreamError { status, body } => {
                tracing::error!("CEIDG returned {} for NIP {}: {}", status, nip, body);
                FetchResult::Error { status, body }
            }
            ClassifiedOutcome::TransportFailure(reason) => {
                tracing::error!("CEIDG request for NIP {} failed: {}", nip, reason);
                FetchResult::TransportFailure(reason)
            }
            ClassifiedOutcome::Ok(body) => {
                let Some(company) = first_record(body, "firmy") else {
                    tracing::info!("CEIDG returned an empty result for NIP {}", nip);
                    return FetchResult::NotFound;
                };

                let link = company
                    .get("link")
                    .and_then(Value::as_str)
                    .filter(|link| !link.is_empty())
                    .map(str::to_string);

                match link {
                    Some(link) => match self.fetch_detail(&link).await {
                        Some(detail) => {
                            tracing::debug!("Merged CEIDG detail record for NIP {}", nip);
                            FetchResult::Found(merge_detail(company, &detail))
                        }
                        None => FetchResult::Found(company),
                    },
                    None => FetchResult::Found(company),
                }
            }
        }
    }

    /// Follows a company detail link.
    ///
    /// Best effort: any failure is logged and yields `None`, so the caller
    /// keeps the search payload as is.
    async fn fetch_detail(&self, link: &str) -> Option<Value> {
        // Links are absolute in practice; relative ones resolve against the API URL
        let url = match self.base_url.join(link) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Ignoring malformed CEIDG detail link '{}': {}", link, e);
                return None;
            }
        };

        tracing::debug!("Fetching CEIDG detail record: {}", url);

        match self.get(url).await {
            ClassifiedOutcome::Ok(body) => {
                let detail = first_record(body, "firma");
                if detail.is_none() {
                    tracing::warn!("CEIDG detail response for '{}' has no company record", link);
                }
                detail
            }
            outcome => {
                tracing::warn!(
                    "Failed to fetch CEIDG detail record '{}': {:?}",
                    link,
                    outcome
                );
                None
            }
        }
    }

    async fn get(&self, url: Url) -> ClassifiedOutcome {
        let response = match self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .bearer_auth(&self.api_key)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return classifier::transport_failure(&e),
        };

        let status = response.status().as_u16();
        match response.bytes().await {
            Ok(body) => classifier::classify(status, &body),
            Err(e) => classifier::transport_failure(&e),
        }
    }
}

/// First company object of a CEIDG response.
///
/// The search endpoint wraps results in `firmy`, the detail endpoint in
/// `firma`; a bare array or a single object under the key is accepted too.
fn first_record(body: Value, key: &str) -> Option<Value> {
    let records = match body {
        Value::Array(records) => records,
        Value::Object(mut map) => match map.remove(key)? {
            Value::Array(records) => records,
            record @ Value::Object(_) => vec![record],
            _ => return None,
        },
        _ => return None,
    };

    records.into_iter().next().filter(Value::is_object)
}

/// Overlays the detail record's contact fields onto the search record.
///
/// A detail field replaces the search value only when it carries a value
/// (not missing, `null`, empty string or empty object). The correspondence
/// address must also map to a non-empty [`crate::models::Address`].
pub fn merge_detail(mut company: Value, detail: &Value) -> Value {
    if let Some(fields) = company.as_object_mut() {
        for key in DETAIL_FIELDS {
            if let Some(value) = detail.get(key).filter(|value| overlays(key, value)) {
                fields.insert(key.to_string(), value.clone());
            }
        }
    }
    company
}

fn overlays(key: &str, value: &Value) -> bool {
    if key == CORRESPONDENCE_ADDRESS {
        mapping::address_from_payload(Some(value)).is_some()
    } else {
        has_value(value)
    }
}

fn has_value(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}
