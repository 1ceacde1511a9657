//! A charge point, the unit a vehicle plugs into.

use uuid::Uuid;

use super::Audit;
use crate::models::{AccessibilitePmr, Statique};

#[derive(Debug, Clone, PartialEq)]
pub struct PointDeCharge {
    pub id: Uuid,
    pub id_pdc_itinerance: String,
    pub id_pdc_local: Option<String>,
    pub puissance_nominale: f64,
    pub prise_type_ef: bool,
    pub prise_type_2: bool,
    pub prise_type_combo_ccs: bool,
    pub prise_type_chademo: bool,
    pub prise_type_autre: bool,
    pub gratuit: Option<bool>,
    pub paiement_acte: bool,
    pub paiement_cb: Option<bool>,
    pub paiement_autre: Option<bool>,
    pub tarification: Option<String>,
    pub reservation: bool,
    pub accessibilite_pmr: AccessibilitePmr,
    pub restriction_gabarit: String,
    pub observations: Option<String>,
    pub cable_t2_attache: Option<bool>,
    pub station_id: Option<Uuid>,
    pub audit: Audit,
}
impl PointDeCharge {
    /// Attaches the charge point to its station, returning whether the link changed.
    pub fn attach(&mut self, station: Uuid) -> bool {
        if self.station_id == Some(station) {
            return false;
        }
        self.station_id = Some(station);
        self.audit.touch();
        true
    }

    /// Takes over the non-key fields of `other`, returning whether anything changed.
    pub fn absorb(&mut self, other: &PointDeCharge) -> bool {
        let mut candidate = other.clone();
        candidate.id = self.id;
        candidate.station_id = self.station_id;
        candidate.audit = self.audit;
        if *self == candidate {
            return false;
        }
        *self = candidate;
        self.audit.touch();
        true
    }
}
impl From<&Statique> for PointDeCharge {
    fn from(record: &Statique) -> Self {
        Self {
            id: Uuid::new_v4(),
            id_pdc_itinerance: record.id_pdc_itinerance.clone(),
            id_pdc_local: record.id_pdc_local.clone(),
            puissance_nominale: record.puissance_nominale,
            prise_type_ef: record.prise_type_ef,
            prise_type_2: record.prise_type_2,
            prise_type_combo_ccs: record.prise_type_combo_ccs,
            prise_type_chademo: record.prise_type_chademo,
            prise_type_autre: record.prise_type_autre,
            gratuit: record.gratuit,
            paiement_acte: record.paiement_acte,
            paiement_cb: record.paiement_cb,
            paiement_autre: record.paiement_autre,
            tarification: record.tarification.clone(),
            reservation: record.reservation,
            accessibilite_pmr: record.accessibilite_pmr,
            restriction_gabarit: record.restriction_gabarit.clone(),
            observations: record.observations.clone(),
            cable_t2_attache: record.cable_t2_attache,
            station_id: None,
            audit: Audit::now(),
        }
    }
}

pub fn key(pdc: &PointDeCharge) -> &str {
    &pdc.id_pdc_itinerance
}

pub fn equals(a: &PointDeCharge, b: &PointDeCharge) -> bool {
    key(a) == key(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::statique;

    #[test]
    fn test_attach() {
        let mut pdc = PointDeCharge::from(&statique(1));
        let station = Uuid::new_v4();
        assert!(pdc.attach(station));
        assert!(!pdc.attach(station));
        assert_eq!(pdc.station_id, Some(station));
    }

    #[test]
    fn test_absorb() {
        let mut stored = PointDeCharge::from(&statique(1));
        let station = Uuid::new_v4();
        stored.attach(station);
        assert!(!stored.absorb(&PointDeCharge::from(&statique(1))));

        let mut faster = statique(1);
        faster.puissance_nominale = 150.0;
        let id = stored.id;
        assert!(stored.absorb(&PointDeCharge::from(&faster)));
        assert_eq!(stored.id, id);
        assert_eq!(stored.station_id, Some(station));
        assert_eq!(stored.puissance_nominale, 150.0);
    }
}
