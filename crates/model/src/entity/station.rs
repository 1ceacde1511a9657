//! A charging station, the group of charge points at one site.

use time::Date;
use uuid::Uuid;

use super::{Audit, operational_unit_code};
use crate::models::{ConditionAcces, ImplantationStation, Raccordement, Statique};

#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: Uuid,
    pub id_station_itinerance: String,
    pub id_station_local: Option<String>,
    pub nom_station: String,
    pub implantation_station: ImplantationStation,
    pub nbre_pdc: u32,
    pub condition_acces: ConditionAcces,
    pub horaires: String,
    pub station_deux_roues: bool,
    pub raccordement: Option<Raccordement>,
    pub num_pdl: Option<String>,
    pub date_maj: Date,
    pub date_mise_en_service: Option<Date>,
    pub amenageur_id: Option<Uuid>,
    pub operateur_id: Option<Uuid>,
    pub enseigne_id: Option<Uuid>,
    pub localisation_id: Option<Uuid>,
    pub operational_unit_id: Option<Uuid>,
    pub audit: Audit,
}
impl Station {
    /// The operational unit this station belongs to, derived from its identifier.
    pub fn operational_unit_code(&self) -> Option<&str> {
        operational_unit_code(&self.id_station_itinerance)
    }

    /// Points the station at its parents, returning whether any link changed.
    pub fn link(&mut self, amenageur: Uuid, operateur: Uuid, enseigne: Uuid, localisation: Uuid) -> bool {
        let links = (Some(amenageur), Some(operateur), Some(enseigne), Some(localisation));
        if (self.amenageur_id, self.operateur_id, self.enseigne_id, self.localisation_id) == links {
            return false;
        }
        (self.amenageur_id, self.operateur_id, self.enseigne_id, self.localisation_id) = links;
        self.audit.touch();
        true
    }

    /// Takes over the non-key fields of `other`, returning whether anything changed.
    ///
    /// Links are left alone; see [`Station::link`].
    pub fn absorb(&mut self, other: &Station) -> bool {
        let incoming = (
            &other.id_station_local,
            &other.nom_station,
            other.implantation_station,
            other.nbre_pdc,
            other.condition_acces,
            &other.horaires,
            other.station_deux_roues,
            other.raccordement,
            &other.num_pdl,
            other.date_maj,
            other.date_mise_en_service,
        );
        let current = (
            &self.id_station_local,
            &self.nom_station,
            self.implantation_station,
            self.nbre_pdc,
            self.condition_acces,
            &self.horaires,
            self.station_deux_roues,
            self.raccordement,
            &self.num_pdl,
            self.date_maj,
            self.date_mise_en_service,
        );
        if current == incoming {
            return false;
        }
        self.id_station_local = other.id_station_local.clone();
        self.nom_station = other.nom_station.clone();
        self.implantation_station = other.implantation_station;
        self.nbre_pdc = other.nbre_pdc;
        self.condition_acces = other.condition_acces;
        self.horaires = other.horaires.clone();
        self.station_deux_roues = other.station_deux_roues;
        self.raccordement = other.raccordement;
        self.num_pdl = other.num_pdl.clone();
        self.date_maj = other.date_maj;
        self.date_mise_en_service = other.date_mise_en_service;
        self.audit.touch();
        true
    }
}
impl From<&Statique> for Station {
    fn from(record: &Statique) -> Self {
        Self {
            id: Uuid::new_v4(),
            id_station_itinerance: record.id_station_itinerance.clone(),
            id_station_local: record.id_station_local.clone(),
            nom_station: record.nom_station.clone(),
            implantation_station: record.implantation_station,
            nbre_pdc: record.nbre_pdc,
            condition_acces: record.condition_acces,
            horaires: record.horaires.clone(),
            station_deux_roues: record.station_deux_roues,
            raccordement: record.raccordement,
            num_pdl: record.num_pdl.clone(),
            date_maj: record.date_maj,
            date_mise_en_service: record.date_mise_en_service,
            amenageur_id: None,
            operateur_id: None,
            enseigne_id: None,
            localisation_id: None,
            operational_unit_id: None,
            audit: Audit::now(),
        }
    }
}

pub fn key(station: &Station) -> &str {
    &station.id_station_itinerance
}

pub fn equals(a: &Station, b: &Station) -> bool {
    key(a) == key(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::statique;

    #[test]
    fn test_projection_leaves_links_unset() {
        let station = Station::from(&statique(1));
        assert_eq!(station.id_station_itinerance, "FR123E000001");
        assert_eq!(station.operational_unit_code(), Some("FR123"));
        assert_eq!(station.amenageur_id, None);
        assert_eq!(station.operational_unit_id, None);
    }

    #[test]
    fn test_link_reports_changes_once() {
        let mut station = Station::from(&statique(1));
        let ids = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        assert!(station.link(ids[0], ids[1], ids[2], ids[3]));
        assert!(!station.link(ids[0], ids[1], ids[2], ids[3]));
        assert_eq!(station.localisation_id, Some(ids[3]));
    }

    #[test]
    fn test_absorb_keeps_identity_and_links() {
        let mut stored = Station::from(&statique(1));
        let amenageur = Uuid::new_v4();
        stored.link(amenageur, Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut renamed = statique(1);
        renamed.nom_station = "Station du Nord".to_string();
        let id = stored.id;
        assert!(stored.absorb(&Station::from(&renamed)));
        assert!(!stored.absorb(&Station::from(&renamed)));
        assert_eq!(stored.id, id);
        assert_eq!(stored.nom_station, "Station du Nord");
        assert_eq!(stored.amenageur_id, Some(amenageur));
    }
}
