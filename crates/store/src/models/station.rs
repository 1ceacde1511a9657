use exn::ResultExt;
use irve_model::entity::Station;

use super::{audit, author, date, midnight, optional_uuid, parse, uuid};
use crate::error::{Error, ErrorKind, Result};

#[derive(sqlx::FromRow)]
pub(crate) struct StationRow {
    pub(crate) id: String,
    pub(crate) id_station_itinerance: String,
    pub(crate) id_station_local: Option<String>,
    pub(crate) nom_station: String,
    pub(crate) implantation_station: String,
    pub(crate) nbre_pdc: i64,
    pub(crate) condition_acces: String,
    pub(crate) horaires: String,
    pub(crate) station_deux_roues: bool,
    pub(crate) raccordement: Option<String>,
    pub(crate) num_pdl: Option<String>,
    pub(crate) date_maj: i64,
    pub(crate) date_mise_en_service: Option<i64>,
    pub(crate) amenageur_id: Option<String>,
    pub(crate) operateur_id: Option<String>,
    pub(crate) enseigne_id: Option<String>,
    pub(crate) localisation_id: Option<String>,
    pub(crate) operational_unit_id: Option<String>,
    pub(crate) created_at: i64,
    pub(crate) updated_at: i64,
    pub(crate) created_by: Option<String>,
    pub(crate) updated_by: Option<String>,
}
impl From<&Station> for StationRow {
    fn from(station: &Station) -> Self {
        let id = |id: Option<uuid::Uuid>| id.map(|id| id.hyphenated().to_string());
        Self {
            id: station.id.hyphenated().to_string(),
            id_station_itinerance: station.id_station_itinerance.clone(),
            id_station_local: station.id_station_local.clone(),
            nom_station: station.nom_station.clone(),
            implantation_station: station.implantation_station.as_str().to_string(),
            nbre_pdc: i64::from(station.nbre_pdc),
            condition_acces: station.condition_acces.as_str().to_string(),
            horaires: station.horaires.clone(),
            station_deux_roues: station.station_deux_roues,
            raccordement: station.raccordement.map(|r| r.as_str().to_string()),
            num_pdl: station.num_pdl.clone(),
            date_maj: midnight(station.date_maj),
            date_mise_en_service: station.date_mise_en_service.map(midnight),
            amenageur_id: id(station.amenageur_id),
            operateur_id: id(station.operateur_id),
            enseigne_id: id(station.enseigne_id),
            localisation_id: id(station.localisation_id),
            operational_unit_id: id(station.operational_unit_id),
            created_at: station.audit.created_at.unix_timestamp(),
            updated_at: station.audit.updated_at.unix_timestamp(),
            created_by: author(station.audit.created_by),
            updated_by: author(station.audit.updated_by),
        }
    }
}
impl TryFrom<StationRow> for Station {
    type Error = Error;
    fn try_from(row: StationRow) -> Result<Self> {
        Ok(Self {
            id: uuid(&row.id, "station.id")?,
            id_station_itinerance: row.id_station_itinerance,
            id_station_local: row.id_station_local,
            nom_station: row.nom_station,
            implantation_station: parse(&row.implantation_station, "implantation_station")?,
            nbre_pdc: u32::try_from(row.nbre_pdc).or_raise(|| ErrorKind::InvalidData("nbre_pdc"))?,
            condition_acces: parse(&row.condition_acces, "condition_acces")?,
            horaires: row.horaires,
            station_deux_roues: row.station_deux_roues,
            raccordement: row.raccordement.as_deref().map(|r| parse(r, "raccordement")).transpose()?,
            num_pdl: row.num_pdl,
            date_maj: date(row.date_maj, "date_maj")?,
            date_mise_en_service: row.date_mise_en_service.map(|d| date(d, "date_mise_en_service")).transpose()?,
            amenageur_id: optional_uuid(row.amenageur_id.as_deref(), "station.amenageur_id")?,
            operateur_id: optional_uuid(row.operateur_id.as_deref(), "station.operateur_id")?,
            enseigne_id: optional_uuid(row.enseigne_id.as_deref(), "station.enseigne_id")?,
            localisation_id: optional_uuid(row.localisation_id.as_deref(), "station.localisation_id")?,
            operational_unit_id: optional_uuid(row.operational_unit_id.as_deref(), "station.operational_unit_id")?,
            audit: audit(row.created_at, row.updated_at, row.created_by.as_deref(), row.updated_by.as_deref())?,
        })
    }
}
