//! Shared fixtures for unit tests, here and in dependent crates.

use time::macros::date;

use crate::models::{
    AccessibilitePmr, ConditionAcces, Coordinate, ImplantationStation, Raccordement, Statique,
};

/// A complete, valid record for the charge point `FR123P{n:06}`.
pub fn statique(n: u32) -> Statique {
    Statique {
        nom_amenageur: Some("Société Générale de Recharge".to_string()),
        siren_amenageur: Some("123456789".to_string()),
        contact_amenageur: Some("amenageur@example.com".to_string()),
        nom_operateur: Some("Opérateur de Recharge".to_string()),
        contact_operateur: "operateur@example.com".to_string(),
        telephone_operateur: Some("+33144276350".parse().unwrap()),
        nom_enseigne: "Recharge Express".to_string(),
        id_station_itinerance: "FR123E000001".to_string(),
        id_station_local: None,
        nom_station: "Station de la Gare".to_string(),
        implantation_station: ImplantationStation::Voirie,
        adresse_station: "1 place de la Gare 75010 Paris".to_string(),
        code_insee_commune: Some("75110".to_string()),
        coordonnees_xy: Coordinate::new(2.3553, 48.8763).unwrap(),
        nbre_pdc: 2,
        id_pdc_itinerance: format!("FR123P{n:06}"),
        id_pdc_local: None,
        puissance_nominale: 22.0,
        prise_type_ef: true,
        prise_type_2: true,
        prise_type_combo_ccs: false,
        prise_type_chademo: false,
        prise_type_autre: false,
        gratuit: Some(false),
        paiement_acte: true,
        paiement_cb: Some(true),
        paiement_autre: None,
        tarification: Some("0,35 €/kWh".to_string()),
        condition_acces: ConditionAcces::AccesLibre,
        reservation: false,
        horaires: "24/7".to_string(),
        accessibilite_pmr: AccessibilitePmr::NonReserve,
        restriction_gabarit: "Hauteur maximale 2,10 m".to_string(),
        station_deux_roues: false,
        raccordement: Some(Raccordement::Direct),
        num_pdl: Some("12345678901234".to_string()),
        date_mise_en_service: Some(date!(2023 - 06 - 01)),
        observations: None,
        date_maj: date!(2024 - 01 - 15),
        cable_t2_attache: Some(false),
    }
}
