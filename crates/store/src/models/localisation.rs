use exn::ResultExt;
use irve_model::entity::Localisation;
use irve_model::models::Coordinate;

use super::{audit, author, uuid};
use crate::error::{Error, ErrorKind, Result};

#[derive(sqlx::FromRow)]
pub(crate) struct LocalisationRow {
    pub(crate) id: String,
    pub(crate) adresse_station: String,
    pub(crate) code_insee_commune: Option<String>,
    pub(crate) coordonnees_xy: String,
    pub(crate) created_at: i64,
    pub(crate) updated_at: i64,
    pub(crate) created_by: Option<String>,
    pub(crate) updated_by: Option<String>,
}
impl From<&Localisation> for LocalisationRow {
    fn from(localisation: &Localisation) -> Self {
        Self {
            id: localisation.id.hyphenated().to_string(),
            adresse_station: localisation.adresse_station.clone(),
            code_insee_commune: localisation.code_insee_commune.clone(),
            coordonnees_xy: localisation.coordonnees_xy.to_wkt(),
            created_at: localisation.audit.created_at.unix_timestamp(),
            updated_at: localisation.audit.updated_at.unix_timestamp(),
            created_by: author(localisation.audit.created_by),
            updated_by: author(localisation.audit.updated_by),
        }
    }
}
impl TryFrom<LocalisationRow> for Localisation {
    type Error = Error;
    fn try_from(row: LocalisationRow) -> Result<Self> {
        Ok(Self {
            id: uuid(&row.id, "localisation.id")?,
            adresse_station: row.adresse_station,
            code_insee_commune: row.code_insee_commune,
            coordonnees_xy: Coordinate::from_wkt(&row.coordonnees_xy)
                .or_raise(|| ErrorKind::InvalidData("coordonnees_xy"))?,
            audit: audit(row.created_at, row.updated_at, row.created_by.as_deref(), row.updated_by.as_deref())?,
        })
    }
}
