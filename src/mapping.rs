//! Mapping of loosely-typed CEIDG payloads into domain records.
//!
//! The registry returns JSON with Polish keys, optional fields that may be
//! missing or `null`, and the NIP nested under the owner object. Everything
//! here is pure: no I/O, no logging side effects beyond `tracing::debug!`.

use crate::models::{Address, CompanyRecord};
use chrono::NaiveDate;
use serde_json::{json, Map, Value};
use std::fmt;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Why a company payload could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    /// The payload is not a JSON object.
    NotAnObject,
    /// Neither `dataRozpoczecia` nor `dataPowstania` holds a valid date.
    MissingActivityStart,
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingError::NotAnObject => write!(f, "company payload is not a JSON object"),
            MappingError::MissingActivityStart => {
                write!(f, "company payload has no parseable activity start date")
            }
        }
    }
}

impl std::error::Error for MappingError {}

/// Text value of a payload field, if present and non-empty.
///
/// Numbers are rendered as text because the registry is not consistent
/// about quoting its numeric codes.
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parses a `YYYY-MM-DD` date, ignoring any trailing time component.
fn date(value: Option<&Value>) -> Option<NaiveDate> {
    let raw = value?.as_str()?;
    let day = raw.get(..10).unwrap_or(raw);

    match NaiveDate::parse_from_str(day, DATE_FORMAT) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::debug!("Ignoring unparseable CEIDG date '{}': {}", raw, e);
            None
        }
    }
}

/// Builds an [`Address`] from a CEIDG address object.
///
/// Returns `None` when the payload is missing, is not an object, or has no
/// non-empty recognized field.
pub fn address_from_payload(payload: Option<&Value>) -> Option<Address> {
    let fields: &Map<String, Value> = payload?.as_object()?;
    let field = |key: &str| text(fields.get(key));

    let address = Address {
        street: field("ulica"),
        building: field("budynek"),
        unit: field("lokal"),
        city: field("miasto"),
        province: field("wojewodztwo"),
        county: field("powiat"),
        municipality: field("gmina"),
        country: field("kraj"),
        postal_code: field("kod"),
        po_box: field("skrytkaPocztowa"),
        non_standard_location: field("opisNietypowegoMiejsca"),
        addressee: field("adresat"),
        territorial_unit_code: field("terc"),
        settlement_code: field("simc"),
        street_code: field("ulic"),
    };

    if address.is_empty() {
        None
    } else {
        Some(address)
    }
}

/// Builds a [`CompanyRecord`] from a (possibly detail-merged) CEIDG company payload.
///
/// The registry currently publishes a single start date (`dataRozpoczecia`);
/// it feeds both the activity start and the creation date. A separate
/// `dataPowstania` field is honoured for the creation date when present.
pub fn company_from_payload(payload: &Value) -> Result<CompanyRecord, MappingError> {
    let fields = payload.as_object().ok_or(MappingError::NotAnObject)?;
    let field = |key: &str| text(fields.get(key));
    let date_field = |key: &str| date(fields.get(key));

    // NIP lives on the owner object, not at the top level
    let nip = text(fields.get("wlasciciel").and_then(|owner| owner.get("nip"))).unwrap_or_default();

    let started = date_field("dataRozpoczecia");
    let created = date_field("dataPowstania");
    let activity_start_date = started
        .or(created)
        .ok_or(MappingError::MissingActivityStart)?;
    let created_date = created.unwrap_or(activity_start_date);

    let additional_addresses = fields
        .get("adresyDzialalnosciDodatkowe")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| address_from_payload(Some(entry)))
                .collect()
        })
        .unwrap_or_default();

    Ok(CompanyRecord {
        nip,
        name: field("nazwa").unwrap_or_default(),
        activity_start_date,
        created_date,
        status: field("status"),
        suspension_date: date_field("dataZawieszenia"),
        resumption_date: date_field("dataWznowienia"),
        termination_date: date_field("dataZakonczenia"),
        business_address: address_from_payload(fields.get("adresDzialalnosci")),
        correspondence_address: address_from_payload(fields.get("adresKorespondencyjny")),
        additional_addresses,
        phone: field("telefon"),
        email: field("email"),
        website: field("www"),
        e_delivery_address: field("adresDoreczenElektronicznych"),
        other_contact: field("innaFormaKonaktu"),
    })
}

/// Renders a record back into the registry's payload shape.
///
/// Inverse of [`company_from_payload`] for every populated field.
pub fn company_to_payload(record: &CompanyRecord) -> Value {
    let day = |d: NaiveDate| d.format(DATE_FORMAT).to_string();

    json!({
        "wlasciciel": { "nip": record.nip },
        "nazwa": record.name,
        "dataRozpoczecia": day(record.activity_start_date),
        "dataPowstania": day(record.created_date),
        "status": record.status,
        "dataZawieszenia": record.suspension_date.map(day),
        "dataWznowienia": record.resumption_date.map(day),
        "dataZakonczenia": record.termination_date.map(day),
        "adresDzialalnosci": record.business_address,
        "adresKorespondencyjny": record.correspondence_address,
        "adresyDzialalnosciDodatkowe": record.additional_addresses,
        "telefon": record.phone,
        "email": record.email,
        "www": record.website,
        "adresDoreczenElektronicznych": record.e_delivery_address,
        "innaFormaKonaktu": record.other_contact,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_payload() -> Value {
        json!({
            "id": "a1b2c3",
            "nazwa": "Jan Kowalski Usługi Informatyczne",
            "wlasciciel": { "imie": "Jan", "nazwisko": "Kowalski", "nip": "6292346813", "regon": "241234567" },
            "dataRozpoczecia": "2015-03-01",
            "status": "AKTYWNY",
            "adresDzialalnosci": {
                "ulica": "Marszałkowska",
                "budynek": "1",
                "lokal": "2",
                "miasto": "Warszawa",
                "kod": "00-001",
                "wojewodztwo": "MAZOWIECKIE",
                "terc": "1465011",
                "simc": "0918123"
            },
            "adresyDzialalnosciDodatkowe": [
                { "miasto": "Kraków", "kod": "30-001" },
                {},
                null,
                "garbage",
                { "budynek": "5", "miasto": "Wrocław" }
            ],
            "telefon": "123456789",
            "link": "https://dane.biznes.gov.pl/api/ceidg/v3/firma/a1b2c3"
        })
    }

    #[test]
    fn test_absent_address_payloads() {
        assert_eq!(address_from_payload(None), None);
        assert_eq!(address_from_payload(Some(&json!({}))), None);
        assert_eq!(address_from_payload(Some(&Value::Null)), None);
        assert_eq!(address_from_payload(Some(&json!({ "ulica": "", "miasto": null }))), None);
        assert_eq!(address_from_payload(Some(&json!({ "unknown": "x" }))), None);
    }

    #[test]
    fn test_address_fields_copied_verbatim() {
        let address = address_from_payload(Some(&json!({
            "ulica": "  Piękna ",
            "kod": "00-477",
            "simc": 918123
        })))
        .unwrap();

        assert_eq!(address.street.as_deref(), Some("  Piękna "));
        assert_eq!(address.postal_code.as_deref(), Some("00-477"));
        assert_eq!(address.settlement_code.as_deref(), Some("918123"));
        assert_eq!(address.city, None);
    }

    #[test]
    fn test_company_mapping() {
        let record = company_from_payload(&sample_payload()).unwrap();

        assert_eq!(record.nip, "6292346813");
        assert_eq!(record.name, "Jan Kowalski Usługi Informatyczne");
        assert_eq!(record.status.as_deref(), Some("AKTYWNY"));
        assert_eq!(record.phone.as_deref(), Some("123456789"));
        assert_eq!(record.email, None);
        assert_eq!(record.correspondence_address, None);

        let business = record.business_address.unwrap();
        assert_eq!(
            business.format_single_line(),
            "ul. Marszałkowska 1/2, 00-001 Warszawa"
        );
    }

    #[test]
    fn test_single_start_date_fills_both_dates() {
        let record = company_from_payload(&sample_payload()).unwrap();
        let expected = NaiveDate::from_ymd_opt(2015, 3, 1).unwrap();

        assert_eq!(record.activity_start_date, expected);
        assert_eq!(record.created_date, expected);
        assert_eq!(record.suspension_date, None);
        assert_eq!(record.termination_date, None);
    }

    #[test]
    fn test_separate_creation_date_is_honoured() {
        let mut payload = sample_payload();
        payload["dataPowstania"] = json!("2014-12-31");

        let record = company_from_payload(&payload).unwrap();
        assert_eq!(
            record.activity_start_date,
            NaiveDate::from_ymd_opt(2015, 3, 1).unwrap()
        );
        assert_eq!(
            record.created_date,
            NaiveDate::from_ymd_opt(2014, 12, 31).unwrap()
        );
    }

    #[test]
    fn test_lifecycle_dates_with_time_component() {
        let mut payload = sample_payload();
        payload["dataZawieszenia"] = json!("2020-04-01T00:00:00");
        payload["dataWznowienia"] = json!("2021-01-15");
        payload["dataZakonczenia"] = json!("not a date");

        let record = company_from_payload(&payload).unwrap();
        assert_eq!(record.suspension_date, NaiveDate::from_ymd_opt(2020, 4, 1));
        assert_eq!(record.resumption_date, NaiveDate::from_ymd_opt(2021, 1, 15));
        assert_eq!(record.termination_date, None);
    }

    #[test]
    fn test_malformed_additional_addresses_are_dropped() {
        let record = company_from_payload(&sample_payload()).unwrap();

        assert_eq!(record.additional_addresses.len(), 2);
        assert_eq!(record.additional_addresses[0].format_single_line(), "30-001 Kraków");
        assert_eq!(record.additional_addresses[1].format_single_line(), "5, Wrocław");
    }

    #[test]
    fn test_missing_optional_fields_do_not_fail() {
        let record = company_from_payload(&json!({ "dataRozpoczecia": "2001-01-01" })).unwrap();

        assert_eq!(record.nip, "");
        assert_eq!(record.name, "");
        assert!(record.additional_addresses.is_empty());
        assert_eq!(record.business_address, None);
    }

    #[test]
    fn test_missing_start_date_is_an_error() {
        assert_eq!(
            company_from_payload(&json!({ "nazwa": "X" })),
            Err(MappingError::MissingActivityStart)
        );
        assert_eq!(
            company_from_payload(&json!(["not", "an", "object"])),
            Err(MappingError::NotAnObject)
        );
    }

    #[test]
    fn test_round_trip_through_payload() {
        let mut original = company_from_payload(&sample_payload()).unwrap();
        original.created_date = NaiveDate::from_ymd_opt(2015, 2, 20).unwrap();
        original.termination_date = NaiveDate::from_ymd_opt(2023, 6, 30);
        original.email = Some("biuro@example.pl".to_string());
        original.correspondence_address = Some(Address {
            po_box: Some("12".to_string()),
            addressee: Some("Jan Kowalski".to_string()),
            ..Default::default()
        });

        let rebuilt = company_from_payload(&company_to_payload(&original)).unwrap();
        assert_eq!(rebuilt, original);
    }
}
