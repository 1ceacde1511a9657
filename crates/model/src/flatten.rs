use crate::entity::{Amenageur, Enseigne, Localisation, Operateur, PointDeCharge, Station};
use crate::models::Statique;

/// Reassembles the flat record for a charge point from its entity graph.
///
/// The caller is responsible for handing over the station the charge point is
/// attached to and that station's parents.
pub fn flatten(
    pdc: &PointDeCharge,
    station: &Station,
    amenageur: &Amenageur,
    operateur: &Operateur,
    enseigne: &Enseigne,
    localisation: &Localisation,
) -> Statique {
    Statique {
        nom_amenageur: amenageur.nom_amenageur.clone(),
        siren_amenageur: amenageur.siren_amenageur.clone(),
        contact_amenageur: amenageur.contact_amenageur.clone(),
        nom_operateur: operateur.nom_operateur.clone(),
        contact_operateur: operateur.contact_operateur.clone(),
        telephone_operateur: operateur.telephone_operateur.clone(),
        nom_enseigne: enseigne.nom_enseigne.clone(),
        id_station_itinerance: station.id_station_itinerance.clone(),
        id_station_local: station.id_station_local.clone(),
        nom_station: station.nom_station.clone(),
        implantation_station: station.implantation_station,
        adresse_station: localisation.adresse_station.clone(),
        code_insee_commune: localisation.code_insee_commune.clone(),
        coordonnees_xy: localisation.coordonnees_xy,
        nbre_pdc: station.nbre_pdc,
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
        condition_acces: station.condition_acces,
        reservation: pdc.reservation,
        horaires: station.horaires.clone(),
        accessibilite_pmr: pdc.accessibilite_pmr,
        restriction_gabarit: pdc.restriction_gabarit.clone(),
        station_deux_roues: station.station_deux_roues,
        raccordement: station.raccordement,
        num_pdl: station.num_pdl.clone(),
        date_mise_en_service: station.date_mise_en_service,
        observations: pdc.observations.clone(),
        date_maj: station.date_maj,
        cable_t2_attache: pdc.cable_t2_attache,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::statique;

    #[test]
    fn test_projection_then_flatten_is_identity() {
        let record = statique(7);
        let flat = flatten(
            &PointDeCharge::from(&record),
            &Station::from(&record),
            &Amenageur::from(&record),
            &Operateur::from(&record),
            &Enseigne::from(&record),
            &Localisation::from(&record),
        );
        assert_eq!(flat, record);
    }
}
