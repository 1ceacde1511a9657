//! The brand name shown to drivers.

use uuid::Uuid;

use super::Audit;
use crate::models::Statique;

#[derive(Debug, Clone, PartialEq)]
pub struct Enseigne {
    pub id: Uuid,
    pub nom_enseigne: String,
    pub audit: Audit,
}
impl From<&Statique> for Enseigne {
    fn from(record: &Statique) -> Self {
        Self { id: Uuid::new_v4(), nom_enseigne: record.nom_enseigne.clone(), audit: Audit::now() }
    }
}

pub fn key(enseigne: &Enseigne) -> &str {
    &enseigne.nom_enseigne
}

pub fn equals(a: &Enseigne, b: &Enseigne) -> bool {
    key(a) == key(b)
}
