//! The operator running the infrastructure.

use uuid::Uuid;

use super::Audit;
use crate::models::{PhoneNumber, Statique};

#[derive(Debug, Clone, PartialEq)]
pub struct Operateur {
    pub id: Uuid,
    pub nom_operateur: Option<String>,
    pub contact_operateur: String,
    pub telephone_operateur: Option<PhoneNumber>,
    pub audit: Audit,
}
impl From<&Statique> for Operateur {
    fn from(record: &Statique) -> Self {
        Self {
            id: Uuid::new_v4(),
            nom_operateur: record.nom_operateur.clone(),
            contact_operateur: record.contact_operateur.clone(),
            telephone_operateur: record.telephone_operateur.clone(),
            audit: Audit::now(),
        }
    }
}

pub type Key<'a> = (Option<&'a str>, &'a str, Option<&'a str>);

pub fn key(operateur: &Operateur) -> Key<'_> {
    (
        operateur.nom_operateur.as_deref(),
        operateur.contact_operateur.as_str(),
        operateur.telephone_operateur.as_ref().map(PhoneNumber::as_str),
    )
}

pub fn equals(a: &Operateur, b: &Operateur) -> bool {
    key(a) == key(b)
}
