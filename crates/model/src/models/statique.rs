use serde::{Deserialize, Serialize};
use time::{Date, UtcDateTime};
use tracing::instrument;

use super::phone::optional_phone;
use super::{
    AccessibilitePmr, ConditionAcces, Coordinate, ImplantationStation, PhoneNumber, Raccordement, blank_as_none, iso_date,
};
use crate::consts::{
    CODE_INSEE_REGEX, EMAIL_REGEX, HORAIRES_REGEX, ID_ITINERANCE_REGEX, NUM_PDL_MAX_LENGTH, SIREN_REGEX,
};
use crate::entity::operational_unit_code;
use crate::error::{ErrorKind, Result};

/// One charge point together with its station, operators and location, as a
/// single flat record.
///
/// This is the shape records are submitted and read back in. The store splits
/// it into normalized entities and [`crate::flatten`] puts it back together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statique {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub nom_amenageur: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub siren_amenageur: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub contact_amenageur: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub nom_operateur: Option<String>,
    pub contact_operateur: String,
    #[serde(default, deserialize_with = "optional_phone")]
    pub telephone_operateur: Option<PhoneNumber>,
    pub nom_enseigne: String,
    pub id_station_itinerance: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub id_station_local: Option<String>,
    pub nom_station: String,
    pub implantation_station: ImplantationStation,
    pub adresse_station: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub code_insee_commune: Option<String>,
    #[serde(rename = "coordonneesXY")]
    pub coordonnees_xy: Coordinate,
    pub nbre_pdc: u32,
    pub id_pdc_itinerance: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub id_pdc_local: Option<String>,
    pub puissance_nominale: f64,
    pub prise_type_ef: bool,
    pub prise_type_2: bool,
    pub prise_type_combo_ccs: bool,
    pub prise_type_chademo: bool,
    pub prise_type_autre: bool,
    #[serde(default)]
    pub gratuit: Option<bool>,
    pub paiement_acte: bool,
    #[serde(default)]
    pub paiement_cb: Option<bool>,
    #[serde(default)]
    pub paiement_autre: Option<bool>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub tarification: Option<String>,
    pub condition_acces: ConditionAcces,
    pub reservation: bool,
    pub horaires: String,
    pub accessibilite_pmr: AccessibilitePmr,
    pub restriction_gabarit: String,
    pub station_deux_roues: bool,
    #[serde(default)]
    pub raccordement: Option<Raccordement>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub num_pdl: Option<String>,
    #[serde(default, with = "iso_date::option")]
    pub date_mise_en_service: Option<Date>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub observations: Option<String>,
    #[serde(with = "iso_date")]
    pub date_maj: Date,
    #[serde(default)]
    pub cable_t2_attache: Option<bool>,
}
impl Statique {
    /// Checks every field constraint that serde cannot express on its own.
    ///
    /// Returns the first offending field.
    #[instrument(skip(self), fields(id_pdc_itinerance = %self.id_pdc_itinerance))]
    pub fn validate(&self) -> Result<()> {
        if let Some(siren) = &self.siren_amenageur
            && !SIREN_REGEX.is_match(siren)
        {
            exn::bail!(ErrorKind::invalid("siren_amenageur", siren));
        }
        if let Some(contact) = &self.contact_amenageur
            && !EMAIL_REGEX.is_match(contact)
        {
            exn::bail!(ErrorKind::invalid("contact_amenageur", contact));
        }
        if !EMAIL_REGEX.is_match(&self.contact_operateur) {
            exn::bail!(ErrorKind::invalid("contact_operateur", &self.contact_operateur));
        }
        required("nom_enseigne", &self.nom_enseigne)?;
        required("nom_station", &self.nom_station)?;
        required("adresse_station", &self.adresse_station)?;
        required("restriction_gabarit", &self.restriction_gabarit)?;
        if !ID_ITINERANCE_REGEX.is_match(&self.id_station_itinerance) {
            exn::bail!(ErrorKind::invalid("id_station_itinerance", &self.id_station_itinerance));
        }
        if !ID_ITINERANCE_REGEX.is_match(&self.id_pdc_itinerance) {
            exn::bail!(ErrorKind::invalid("id_pdc_itinerance", &self.id_pdc_itinerance));
        }
        // Both identifiers are issued by the same operational unit.
        if operational_unit_code(&self.id_pdc_itinerance) != operational_unit_code(&self.id_station_itinerance) {
            exn::bail!(ErrorKind::invalid(
                "id_pdc_itinerance",
                format!("{} is not issued under {}", self.id_pdc_itinerance, self.id_station_itinerance)
            ));
        }
        if self.nbre_pdc == 0 {
            exn::bail!(ErrorKind::invalid("nbre_pdc", self.nbre_pdc));
        }
        if !self.puissance_nominale.is_finite() || self.puissance_nominale <= 0.0 {
            exn::bail!(ErrorKind::invalid("puissance_nominale", self.puissance_nominale));
        }
        if !HORAIRES_REGEX.is_match(&self.horaires) {
            exn::bail!(ErrorKind::invalid("horaires", &self.horaires));
        }
        if let Some(code) = &self.code_insee_commune
            && !CODE_INSEE_REGEX.is_match(code)
        {
            exn::bail!(ErrorKind::invalid("code_insee_commune", code));
        }
        if let Some(pdl) = &self.num_pdl
            && pdl.chars().count() > NUM_PDL_MAX_LENGTH
        {
            exn::bail!(ErrorKind::invalid("num_pdl", pdl));
        }
        let today = UtcDateTime::now().date();
        if self.date_maj > today {
            exn::bail!(ErrorKind::invalid("date_maj", self.date_maj));
        }
        if let Some(date) = self.date_mise_en_service
            && date > today
        {
            exn::bail!(ErrorKind::invalid("date_mise_en_service", date));
        }
        Ok(())
    }
}

fn required(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        exn::bail!(ErrorKind::invalid(field, "empty value"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use time::Duration;

    use super::*;
    use crate::testing::statique;

    #[test]
    fn test_fixture_is_valid() {
        statique(1).validate().unwrap();
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(statique(1)).unwrap();
        assert_eq!(json["coordonneesXY"], "[2.3553, 48.8763]");
        assert_eq!(json["date_maj"], "2024-01-15");
        assert_eq!(json["implantation_station"], "Voirie");
        assert_eq!(json["telephone_operateur"], "+33144276350");
        let parsed: Statique = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, statique(1));
    }

    #[test]
    fn test_blank_optional_text_is_absent() {
        let mut json = serde_json::to_value(statique(1)).unwrap();
        json["nom_amenageur"] = "  ".into();
        json["telephone_operateur"] = "".into();
        json["num_pdl"] = serde_json::Value::Null;
        json.as_object_mut().unwrap().remove("observations");
        let parsed: Statique = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.nom_amenageur, None);
        assert_eq!(parsed.telephone_operateur, None);
        assert_eq!(parsed.num_pdl, None);
        assert_eq!(parsed.observations, None);
    }

    #[test]
    fn test_national_phone_is_normalized_on_input() {
        let mut json = serde_json::to_value(statique(1)).unwrap();
        json["telephone_operateur"] = "01 44 27 63 50".into();
        let parsed: Statique = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.telephone_operateur.unwrap().as_str(), "+33144276350");
    }

    #[rstest]
    #[case::siren("siren_amenageur", |s: &mut Statique| s.siren_amenageur = Some("12345".into()))]
    #[case::contact("contact_operateur", |s: &mut Statique| s.contact_operateur = "nobody".into())]
    #[case::station_id("id_station_itinerance", |s: &mut Statique| s.id_station_itinerance = "fr123e1".into())]
    #[case::pdc_prefix("id_pdc_itinerance", |s: &mut Statique| s.id_pdc_itinerance = "FR999P000001".into())]
    #[case::nbre_pdc("nbre_pdc", |s: &mut Statique| s.nbre_pdc = 0)]
    #[case::puissance("puissance_nominale", |s: &mut Statique| s.puissance_nominale = 0.0)]
    #[case::horaires("horaires", |s: &mut Statique| s.horaires = "toujours".into())]
    #[case::insee("code_insee_commune", |s: &mut Statique| s.code_insee_commune = Some("20000".into()))]
    #[case::pdl("num_pdl", |s: &mut Statique| s.num_pdl = Some("9".repeat(65)))]
    #[case::enseigne("nom_enseigne", |s: &mut Statique| s.nom_enseigne = " ".into())]
    fn test_validation_rejects(#[case] field: &str, #[case] mutate: fn(&mut Statique)) {
        let mut record = statique(1);
        mutate(&mut record);
        let err = record.validate().unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidField { field: f, .. } if *f == field));
    }

    #[test]
    fn test_future_update_date_is_rejected() {
        let mut record = statique(1);
        record.date_maj = UtcDateTime::now().date() + Duration::days(2);
        let err = record.validate().unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidField { field: "date_maj", .. }));
    }

    #[rstest]
    #[case("Mo-Fr 08:00-19:00")]
    #[case("24/7")]
    #[case("Lu-Ve 8:00-20:00, Sa 9:00-12:00")]
    fn test_horaires_accepted(#[case] horaires: &str) {
        let mut record = statique(1);
        record.horaires = horaires.to_string();
        record.validate().unwrap();
    }
}
