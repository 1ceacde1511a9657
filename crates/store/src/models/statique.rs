use exn::ResultExt;
use irve_model::Statique;
use irve_model::models::{Coordinate, PhoneNumber};

use super::{date, parse, unblank};
use crate::error::{Error, ErrorKind, Result};

/// One row of `queries/select_statique.sql`: a charge point joined with its
/// station and the station's parents.
#[derive(sqlx::FromRow)]
pub(crate) struct StatiqueRow {
    pub(crate) nom_amenageur: String,
    pub(crate) siren_amenageur: String,
    pub(crate) contact_amenageur: String,
    pub(crate) nom_operateur: String,
    pub(crate) contact_operateur: String,
    pub(crate) telephone_operateur: String,
    pub(crate) nom_enseigne: String,
    pub(crate) id_station_itinerance: String,
    pub(crate) id_station_local: Option<String>,
    pub(crate) nom_station: String,
    pub(crate) implantation_station: String,
    pub(crate) adresse_station: String,
    pub(crate) code_insee_commune: Option<String>,
    pub(crate) coordonnees_xy: String,
    pub(crate) nbre_pdc: i64,
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
    pub(crate) condition_acces: String,
    pub(crate) reservation: bool,
    pub(crate) horaires: String,
    pub(crate) accessibilite_pmr: String,
    pub(crate) restriction_gabarit: String,
    pub(crate) station_deux_roues: bool,
    pub(crate) raccordement: Option<String>,
    pub(crate) num_pdl: Option<String>,
    pub(crate) date_mise_en_service: Option<i64>,
    pub(crate) observations: Option<String>,
    pub(crate) date_maj: i64,
    pub(crate) cable_t2_attache: Option<bool>,
}
impl TryFrom<StatiqueRow> for Statique {
    type Error = Error;
    fn try_from(row: StatiqueRow) -> Result<Self> {
        Ok(Self {
            nom_amenageur: unblank(row.nom_amenageur),
            siren_amenageur: unblank(row.siren_amenageur),
            contact_amenageur: unblank(row.contact_amenageur),
            nom_operateur: unblank(row.nom_operateur),
            contact_operateur: row.contact_operateur,
            telephone_operateur: unblank(row.telephone_operateur)
                .map(PhoneNumber::try_from)
                .transpose()
                .or_raise(|| ErrorKind::InvalidData("telephone_operateur"))?,
            nom_enseigne: row.nom_enseigne,
            id_station_itinerance: row.id_station_itinerance,
            id_station_local: row.id_station_local,
            nom_station: row.nom_station,
            implantation_station: parse(&row.implantation_station, "implantation_station")?,
            adresse_station: row.adresse_station,
            code_insee_commune: row.code_insee_commune,
            coordonnees_xy: Coordinate::from_wkt(&row.coordonnees_xy)
                .or_raise(|| ErrorKind::InvalidData("coordonnees_xy"))?,
            nbre_pdc: u32::try_from(row.nbre_pdc).or_raise(|| ErrorKind::InvalidData("nbre_pdc"))?,
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
            condition_acces: parse(&row.condition_acces, "condition_acces")?,
            reservation: row.reservation,
            horaires: row.horaires,
            accessibilite_pmr: parse(&row.accessibilite_pmr, "accessibilite_pmr")?,
            restriction_gabarit: row.restriction_gabarit,
            station_deux_roues: row.station_deux_roues,
            raccordement: row.raccordement.as_deref().map(|r| parse(r, "raccordement")).transpose()?,
            num_pdl: row.num_pdl,
            date_mise_en_service: row.date_mise_en_service.map(|d| date(d, "date_mise_en_service")).transpose()?,
            observations: row.observations,
            date_maj: date(row.date_maj, "date_maj")?,
            cable_t2_attache: row.cable_t2_attache,
        })
    }
}
