use irve_model::entity::PointDeCharge;

use super::{audit, author, optional_uuid, parse, uuid};
use crate::error::{Error, Result};

#[derive(sqlx::FromRow)]
pub(crate) struct PointDeChargeRow {
    pub(crate) id: String,
    pub(crate) id_pdc_itinerance: String,
    pub(crate) id_pdc_local: Option<String>,
    pub(crate) puissance_nominale: f64,
    pub(crate) prise_type_ef: bool,
    pub(crate) prise_type_2: bool,
    pub(crate) prise_type_combo_ccs: bool,
    pub(crate) prise_type_chademo: bool,
    pub(crate) prise_type_autre: bool,
    pub(crate) gratuit: Option<bool>,
    pub(crate) paiement_acte: bool,
    pub(crate) paiement_cb: Option<bool>,
    pub(crate) paiement_autre: Option<bool>,
    pub(crate) tarification: Option<String>,
    pub(crate) reservation: bool,
    pub(crate) accessibilite_pmr: String,
    pub(crate) restriction_gabarit: String,
    pub(crate) observations: Option<String>,
    pub(crate) cable_t2_attache: Option<bool>,
    /// `NOT NULL` in the schema; optional here so that an unattached charge
    /// point still converts and the insert is refused by the database.
    pub(crate) station_id: Option<String>,
    pub(crate) created_at: i64,
    pub(crate) updated_at: i64,
    pub(crate) created_by: Option<String>,
    pub(crate) updated_by: Option<String>,
}
impl From<&PointDeCharge> for PointDeChargeRow {
    fn from(pdc: &PointDeCharge) -> Self {
        Self {
            id: pdc.id.hyphenated().to_string(),
            id_pdc_itinerance: pdc.id_pdc_itinerance.clone(),
            id_pdc_local: pdc.id_pdc_local.clone(),
            puissance_nominale: pdc.puissance_nominale,
            prise_type_ef: pdc.prise_type_ef,
            prise_type_2: pdc.prise_type_2,
            prise_type_combo_ccs: pdc.prise_type_combo_ccs,
            prise_type_chademo: pdc.prise_type_chademo,
            prise_type_autre: pdc.prise_type_autre,
            gratuit: pdc.gratuit,
            paiement_acte: pdc.paiement_acte,
            paiement_cb: pdc.paiement_cb,
            paiement_autre: pdc.paiement_autre,
            tarification: pdc.tarification.clone(),
            reservation: pdc.reservation,
            accessibilite_pmr: pdc.accessibilite_pmr.as_str().to_string(),
            restriction_gabarit: pdc.restriction_gabarit.clone(),
            observations: pdc.observations.clone(),
            cable_t2_attache: pdc.cable_t2_attache,
            station_id: pdc.station_id.map(|id| id.hyphenated().to_string()),
            created_at: pdc.audit.created_at.unix_timestamp(),
            updated_at: pdc.audit.updated_at.unix_timestamp(),
            created_by: author(pdc.audit.created_by),
            updated_by: author(pdc.audit.updated_by),
        }
    }
}
impl TryFrom<PointDeChargeRow> for PointDeCharge {
    type Error = Error;
    fn try_from(row: PointDeChargeRow) -> Result<Self> {
        Ok(Self {
            id: uuid(&row.id, "pointdecharge.id")?,
            id_pdc_itinerance: row.id_pdc_itinerance,
            id_pdc_local: row.id_pdc_local,
            puissance_nominale: row.puissance_nominale,
            prise_type_ef: row.prise_type_ef,
            prise_type_2: row.prise_type_2,
            prise_type_combo_ccs: row.prise_type_combo_ccs,
            prise_type_chademo: row.prise_type_chademo,
            prise_type_autre: row.prise_type_autre,
            gratuit: row.gratuit,
            paiement_acte: row.paiement_acte,
            paiement_cb: row.paiement_cb,
            paiement_autre: row.paiement_autre,
            tarification: row.tarification,
            reservation: row.reservation,
            accessibilite_pmr: parse(&row.accessibilite_pmr, "accessibilite_pmr")?,
            restriction_gabarit: row.restriction_gabarit,
            observations: row.observations,
            cable_t2_attache: row.cable_t2_attache,
            station_id: optional_uuid(row.station_id.as_deref(), "pointdecharge.station_id")?,
            audit: audit(row.created_at, row.updated_at, row.created_by.as_deref(), row.updated_by.as_deref())?,
        })
    }
}
