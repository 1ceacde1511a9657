//! Where a station stands.

use uuid::Uuid;

use super::Audit;
use crate::models::{Coordinate, Statique};

#[derive(Debug, Clone, PartialEq)]
pub struct Localisation {
    pub id: Uuid,
    pub adresse_station: String,
    pub code_insee_commune: Option<String>,
    pub coordonnees_xy: Coordinate,
    pub audit: Audit,
}
impl Localisation {
    /// Takes over the non-key fields of `other`, returning whether anything changed.
    pub fn absorb(&mut self, other: &Localisation) -> bool {
        if self.code_insee_commune == other.code_insee_commune && self.coordonnees_xy == other.coordonnees_xy {
            return false;
        }
        self.code_insee_commune = other.code_insee_commune.clone();
        self.coordonnees_xy = other.coordonnees_xy;
        self.audit.touch();
        true
    }
}
impl From<&Statique> for Localisation {
    fn from(record: &Statique) -> Self {
        Self {
            id: Uuid::new_v4(),
            adresse_station: record.adresse_station.clone(),
            code_insee_commune: record.code_insee_commune.clone(),
            coordonnees_xy: record.coordonnees_xy,
            audit: Audit::now(),
        }
    }
}

/// Two locations are the same place when their addresses match.
pub fn key(localisation: &Localisation) -> &str {
    &localisation.adresse_station
}

pub fn equals(a: &Localisation, b: &Localisation) -> bool {
    key(a) == key(b)
}
