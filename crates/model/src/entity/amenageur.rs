//! The operator owning the infrastructure.

use uuid::Uuid;

use super::Audit;
use crate::models::Statique;

#[derive(Debug, Clone, PartialEq)]
pub struct Amenageur {
    pub id: Uuid,
    pub nom_amenageur: Option<String>,
    pub siren_amenageur: Option<String>,
    pub contact_amenageur: Option<String>,
    pub audit: Audit,
}
impl From<&Statique> for Amenageur {
    fn from(record: &Statique) -> Self {
        Self {
            id: Uuid::new_v4(),
            nom_amenageur: record.nom_amenageur.clone(),
            siren_amenageur: record.siren_amenageur.clone(),
            contact_amenageur: record.contact_amenageur.clone(),
            audit: Audit::now(),
        }
    }
}

/// Every field is part of the key.
pub type Key<'a> = (Option<&'a str>, Option<&'a str>, Option<&'a str>);

pub fn key(amenageur: &Amenageur) -> Key<'_> {
    (
        amenageur.nom_amenageur.as_deref(),
        amenageur.siren_amenageur.as_deref(),
        amenageur.contact_amenageur.as_deref(),
    )
}

pub fn equals(a: &Amenageur, b: &Amenageur) -> bool {
    key(a) == key(b)
}
