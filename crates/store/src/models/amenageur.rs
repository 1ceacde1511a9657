use irve_model::entity::Amenageur;

use super::{audit, author, blank, unblank, uuid};
use crate::error::{Error, Result};

#[derive(sqlx::FromRow)]
pub(crate) struct AmenageurRow {
    pub(crate) id: String,
    pub(crate) nom_amenageur: String,
    pub(crate) siren_amenageur: String,
    pub(crate) contact_amenageur: String,
    pub(crate) created_at: i64,
    pub(crate) updated_at: i64,
    pub(crate) created_by: Option<String>,
    pub(crate) updated_by: Option<String>,
}
impl From<&Amenageur> for AmenageurRow {
    fn from(amenageur: &Amenageur) -> Self {
        Self {
            id: amenageur.id.hyphenated().to_string(),
            nom_amenageur: blank(amenageur.nom_amenageur.as_deref()),
            siren_amenageur: blank(amenageur.siren_amenageur.as_deref()),
            contact_amenageur: blank(amenageur.contact_amenageur.as_deref()),
            created_at: amenageur.audit.created_at.unix_timestamp(),
            updated_at: amenageur.audit.updated_at.unix_timestamp(),
            created_by: author(amenageur.audit.created_by),
            updated_by: author(amenageur.audit.updated_by),
        }
    }
}
impl TryFrom<AmenageurRow> for Amenageur {
    type Error = Error;
    fn try_from(row: AmenageurRow) -> Result<Self> {
        Ok(Self {
            id: uuid(&row.id, "amenageur.id")?,
            nom_amenageur: unblank(row.nom_amenageur),
            siren_amenageur: unblank(row.siren_amenageur),
            contact_amenageur: unblank(row.contact_amenageur),
            audit: audit(row.created_at, row.updated_at, row.created_by.as_deref(), row.updated_by.as_deref())?,
        })
    }
}
