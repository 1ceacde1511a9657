//! Row types mirroring the SQLite tables.
//!
//! Each row converts from its entity for writing, and back into the entity
//! for reading. Conversions back into the model can fail on corrupt data and
//! report [`ErrorKind::InvalidData`].

mod amenageur;
mod enseigne;
mod localisation;
mod operateur;
mod operational_unit;
mod pdc;
mod station;
mod statique;

pub(crate) use self::amenageur::AmenageurRow;
pub(crate) use self::enseigne::EnseigneRow;
pub(crate) use self::localisation::LocalisationRow;
pub(crate) use self::operateur::OperateurRow;
pub(crate) use self::operational_unit::OperationalUnitRow;
pub(crate) use self::pdc::PointDeChargeRow;
pub(crate) use self::station::StationRow;
pub(crate) use self::statique::StatiqueRow;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use irve_model::entity::Audit;
use time::{Date, UtcDateTime};
use uuid::Uuid;

/// Key columns are `NOT NULL DEFAULT ''`: absent values are stored blank.
pub(crate) fn blank(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

pub(crate) fn unblank(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

pub(crate) fn uuid(value: &str, field: &'static str) -> Result<Uuid> {
    Uuid::parse_str(value).or_raise(|| ErrorKind::InvalidData(field))
}

pub(crate) fn optional_uuid(value: Option<&str>, field: &'static str) -> Result<Option<Uuid>> {
    value.map(|value| uuid(value, field)).transpose()
}

pub(crate) fn timestamp(value: i64, field: &'static str) -> Result<UtcDateTime> {
    UtcDateTime::from_unix_timestamp(value).or_raise(|| ErrorKind::InvalidData(field))
}

pub(crate) fn audit(
    created_at: i64,
    updated_at: i64,
    created_by: Option<&str>,
    updated_by: Option<&str>,
) -> Result<Audit> {
    Ok(Audit {
        created_at: timestamp(created_at, "created_at")?,
        updated_at: timestamp(updated_at, "updated_at")?,
        created_by: optional_uuid(created_by, "created_by")?,
        updated_by: optional_uuid(updated_by, "updated_by")?,
    })
}

/// Authors are opaque identifiers, stored hyphenated like every other id.
pub(crate) fn author(author: Option<Uuid>) -> Option<String> {
    author.map(|id| id.hyphenated().to_string())
}

/// Dates are stored as the unix timestamp of their UTC midnight.
pub(crate) fn midnight(date: Date) -> i64 {
    date.midnight().as_utc().unix_timestamp()
}

pub(crate) fn date(value: i64, field: &'static str) -> Result<Date> {
    Ok(timestamp(value, field)?.date())
}

pub(crate) fn parse<T>(value: &str, field: &'static str) -> Result<T>
where
    T: std::str::FromStr<Err = irve_model::error::Error>,
{
    value.parse::<T>().or_raise(|| ErrorKind::InvalidData(field))
}
