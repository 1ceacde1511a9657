use irve_model::entity::Enseigne;

use super::{audit, author, uuid};
use crate::error::{Error, Result};

#[derive(sqlx::FromRow)]
pub(crate) struct EnseigneRow {
    pub(crate) id: String,
    pub(crate) nom_enseigne: String,
    pub(crate) created_at: i64,
    pub(crate) updated_at: i64,
    pub(crate) created_by: Option<String>,
    pub(crate) updated_by: Option<String>,
}
impl From<&Enseigne> for EnseigneRow {
    fn from(enseigne: &Enseigne) -> Self {
        Self {
            id: enseigne.id.hyphenated().to_string(),
            nom_enseigne: enseigne.nom_enseigne.clone(),
            created_at: enseigne.audit.created_at.unix_timestamp(),
            updated_at: enseigne.audit.updated_at.unix_timestamp(),
            created_by: author(enseigne.audit.created_by),
            updated_by: author(enseigne.audit.updated_by),
        }
    }
}
impl TryFrom<EnseigneRow> for Enseigne {
    type Error = Error;
    fn try_from(row: EnseigneRow) -> Result<Self> {
        Ok(Self {
            id: uuid(&row.id, "enseigne.id")?,
            nom_enseigne: row.nom_enseigne,
            audit: audit(row.created_at, row.updated_at, row.created_by.as_deref(), row.updated_by.as_deref())?,
        })
    }
}
