use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

// ============ Address ============

/// Polish address as published by the CEIDG registry.
///
/// Field names on the wire follow the registry's Polish keys, both for the
/// upstream payload and for our own JSON responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct Address {
    /// Street name (`ulica`).
    #[serde(rename = "ulica")]
    pub street: Option<String>,
    /// Building number (`budynek`).
    #[serde(rename = "budynek")]
    pub building: Option<String>,
    /// Unit / apartment number (`lokal`).
    #[serde(rename = "lokal")]
    pub unit: Option<String>,
    /// City or village (`miasto`).
    #[serde(rename = "miasto")]
    pub city: Option<String>,
    /// Province (`wojewodztwo`).
    #[serde(rename = "wojewodztwo")]
    pub province: Option<String>,
    /// County (`powiat`).
    #[serde(rename = "powiat")]
    pub county: Option<String>,
    /// Municipality (`gmina`).
    #[serde(rename = "gmina")]
    pub municipality: Option<String>,
    /// Country (`kraj`).
    #[serde(rename = "kraj")]
    pub country: Option<String>,
    /// Postal code, e.g. "00-001" (`kod`).
    #[serde(rename = "kod")]
    pub postal_code: Option<String>,
    /// Post-office box (`skrytkaPocztowa`).
    #[serde(rename = "skrytkaPocztowa")]
    pub po_box: Option<String>,
    /// Free-text description of a non-standard location (`opisNietypowegoMiejsca`).
    #[serde(rename = "opisNietypowegoMiejsca")]
    pub non_standard_location: Option<String>,
    /// Addressee / recipient name (`adresat`).
    #[serde(rename = "adresat")]
    pub addressee: Option<String>,
    /// TERYT territorial unit code (`terc`).
    #[serde(rename = "terc")]
    pub territorial_unit_code: Option<String>,
    /// TERYT settlement code (`simc`).
    #[serde(rename = "simc")]
    pub settlement_code: Option<String>,
    /// TERYT street code (`ulic`).
    #[serde(rename = "ulic")]
    pub street_code: Option<String>,
}

impl Address {
    /// True when no field carries a value.
    pub fn is_empty(&self) -> bool {
        [
            &self.street,
            &self.building,
            &self.unit,
            &self.city,
            &self.province,
            &self.county,
            &self.municipality,
            &self.country,
            &self.postal_code,
            &self.po_box,
            &self.non_standard_location,
            &self.addressee,
            &self.territorial_unit_code,
            &self.settlement_code,
            &self.street_code,
        ]
        .iter()
        .all(|field| present(field).is_none())
    }

    /// Formats the address as one human-readable line.
    ///
    /// Produces e.g. `"ul. Marszałkowska 1/2, 00-001 Warszawa"`. Missing parts
    /// are skipped without leaving stray separators; an address without any
    /// usable part yields an empty string.
    pub fn format_single_line(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        let building = present(&self.building).map(|building| match present(&self.unit) {
            Some(unit) => format!("{}/{}", building, unit),
            None => building.to_string(),
        });

        match (present(&self.street), building) {
            (Some(street), Some(building)) => parts.push(format!("ul. {} {}", street, building)),
            (Some(street), None) => parts.push(format!("ul. {}", street)),
            (None, Some(building)) => parts.push(building),
            (None, None) => {}
        }

        match (present(&self.postal_code), present(&self.city)) {
            (Some(code), Some(city)) => parts.push(format!("{} {}", code, city)),
            (None, Some(city)) => parts.push(city.to_string()),
            _ => {}
        }

        if let Some(note) = present(&self.non_standard_location) {
            parts.push(note.to_string());
        }

        parts.join(", ")
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}

// ============ Company ============

/// Unified CEIDG company record returned by the lookup endpoint.
///
/// Built from the registry's search payload, enriched with the contact
/// fields of the per-company detail payload. Optional fields serialize as
/// `null` rather than being omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CompanyRecord {
    /// Canonical 10-digit NIP.
    pub nip: String,
    /// Registered business name (`nazwa`).
    #[serde(rename = "nazwa")]
    pub name: String,
    /// Date the business activity started.
    #[serde(rename = "dataRozpoczeciaDzialalnosci")]
    pub activity_start_date: NaiveDate,
    /// Date the registry entry was created.
    #[serde(rename = "dataPowstania")]
    pub created_date: NaiveDate,
    /// Registry lifecycle status, e.g. "AKTYWNY".
    pub status: Option<String>,
    #[serde(rename = "dataZawieszeniaDzialalnosci")]
    pub suspension_date: Option<NaiveDate>,
    #[serde(rename = "dataWznowieniaDzialalnosci")]
    pub resumption_date: Option<NaiveDate>,
    #[serde(rename = "dataZakonczeniaDzialalnosci")]
    pub termination_date: Option<NaiveDate>,
    /// Primary business address.
    #[serde(rename = "adresDzialalnosci")]
    pub business_address: Option<Address>,
    /// Correspondence / mailing address.
    #[serde(rename = "adresKorespondencyjny")]
    pub correspondence_address: Option<Address>,
    /// Additional business addresses, in registry order.
    #[serde(rename = "adresyDzialalnosciDodatkowe")]
    pub additional_addresses: Vec<Address>,
    #[serde(rename = "telefon")]
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "www")]
    pub website: Option<String>,
    /// Electronic delivery address (e-Doręczenia).
    #[serde(rename = "adresDoreczenElektronicznych")]
    pub e_delivery_address: Option<String>,
    /// Any other contact form. The key keeps the registry's own spelling.
    #[serde(rename = "innaFormaKonaktu")]
    pub other_contact: Option<String>,
}
