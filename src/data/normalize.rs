//! Adapters from the two heterogeneous permit sources to the common
//! [`Permit`] shape.
//!
//! The modern filing system and the legacy permit system disagree on field
//! names, coordinate encoding (strings vs numbers), and what "the date"
//! means. Each source gets one explicit adapter so every mapping decision is
//! named and testable instead of living in ad hoc record merging.

use crate::{
    core::geo::LatLng,
    data::{Permit, PermitCategory},
};
use serde::Deserialize;

/// A coordinate field that may arrive as a JSON number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LooseCoord {
    Number(f64),
    Text(String),
}

impl LooseCoord {
    fn parse(&self) -> Option<f64> {
        match self {
            LooseCoord::Number(value) => Some(*value),
            LooseCoord::Text(text) => text.trim().parse().ok(),
        }
    }
}

/// Raw record from the modern filing system.
#[derive(Debug, Clone, Deserialize)]
pub struct FilingRecord {
    pub job_filing_number: String,
    pub latitude: Option<LooseCoord>,
    pub longitude: Option<LooseCoord>,
    pub work_type: Option<String>,
    /// Date the filing was approved. This, not the filing date, is the
    /// canonical issued-date for this source.
    pub approved_date: Option<String>,
    pub house_no: Option<String>,
    pub street_name: Option<String>,
}

/// Raw record from the legacy permit system.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyPermitRecord {
    pub job_number: String,
    pub gis_latitude: Option<LooseCoord>,
    pub gis_longitude: Option<LooseCoord>,
    pub permit_type: Option<String>,
    pub issuance_date: Option<String>,
    pub address: Option<String>,
}

fn parse_position(lat: Option<&LooseCoord>, lng: Option<&LooseCoord>) -> Option<LatLng> {
    let position = LatLng::new(lat?.parse()?, lng?.parse()?);
    if position.is_valid() {
        Some(position)
    } else {
        None
    }
}

/// Normalizes a modern filing. Returns `None` when coordinates are missing
/// or unparsable; such records are excluded silently rather than surfaced as
/// errors.
pub fn normalize_filing(record: &FilingRecord) -> Option<Permit> {
    let Some(position) = parse_position(record.latitude.as_ref(), record.longitude.as_ref())
    else {
        log::debug!(
            "excluding filing {} with missing or unparsable coordinates",
            record.job_filing_number
        );
        return None;
    };

    let address = match (&record.house_no, &record.street_name) {
        (Some(house), Some(street)) => Some(format!("{} {}", house.trim(), street.trim())),
        (None, Some(street)) => Some(street.trim().to_string()),
        _ => None,
    };

    Some(Permit {
        id: record.job_filing_number.clone(),
        position,
        category: PermitCategory::from_code(record.work_type.as_deref().unwrap_or("")),
        issued_date: record.approved_date.clone(),
        address,
    })
}

/// Normalizes a legacy permit. Same exclusion rule as
/// [`normalize_filing`]; the legacy issuance date maps directly onto the
/// canonical issued-date.
pub fn normalize_legacy_permit(record: &LegacyPermitRecord) -> Option<Permit> {
    let Some(position) =
        parse_position(record.gis_latitude.as_ref(), record.gis_longitude.as_ref())
    else {
        log::debug!(
            "excluding legacy permit {} with missing or unparsable coordinates",
            record.job_number
        );
        return None;
    };

    Some(Permit {
        id: record.job_number.clone(),
        position,
        category: PermitCategory::from_code(record.permit_type.as_deref().unwrap_or("")),
        issued_date: record.issuance_date.clone(),
        address: record.address.clone(),
    })
}

/// Normalizes a batch from both sources into one entity list.
pub fn normalize_batch(
    filings: &[FilingRecord],
    legacy: &[LegacyPermitRecord],
) -> Vec<Permit> {
    let mut permits: Vec<Permit> = filings.iter().filter_map(normalize_filing).collect();
    permits.extend(legacy.iter().filter_map(normalize_legacy_permit));

    let excluded = filings.len() + legacy.len() - permits.len();
    if excluded > 0 {
        log::debug!("excluded {} records without usable coordinates", excluded);
    }
    permits
}
