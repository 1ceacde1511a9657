use exn::ResultExt;
use irve_model::entity::Operateur;
use irve_model::models::PhoneNumber;

use super::{audit, author, blank, unblank, uuid};
use crate::error::{Error, ErrorKind, Result};

#[derive(sqlx::FromRow)]
pub(crate) struct OperateurRow {
    pub(crate) id: String,
    pub(crate) nom_operateur: String,
    pub(crate) contact_operateur: String,
    pub(crate) telephone_operateur: String,
    pub(crate) created_at: i64,
    pub(crate) updated_at: i64,
    pub(crate) created_by: Option<String>,
    pub(crate) updated_by: Option<String>,
}
impl From<&Operateur> for OperateurRow {
    fn from(operateur: &Operateur) -> Self {
        Self {
            id: operateur.id.hyphenated().to_string(),
            nom_operateur: blank(operateur.nom_operateur.as_deref()),
            contact_operateur: operateur.contact_operateur.clone(),
            telephone_operateur: blank(operateur.telephone_operateur.as_ref().map(PhoneNumber::as_str)),
            created_at: operateur.audit.created_at.unix_timestamp(),
            updated_at: operateur.audit.updated_at.unix_timestamp(),
            created_by: author(operateur.audit.created_by),
            updated_by: author(operateur.audit.updated_by),
        }
    }
}
impl TryFrom<OperateurRow> for Operateur {
    type Error = Error;
    fn try_from(row: OperateurRow) -> Result<Self> {
        Ok(Self {
            id: uuid(&row.id, "operateur.id")?,
            nom_operateur: unblank(row.nom_operateur),
            contact_operateur: row.contact_operateur,
            telephone_operateur: unblank(row.telephone_operateur)
                .map(PhoneNumber::try_from)
                .transpose()
                .or_raise(|| ErrorKind::InvalidData("telephone_operateur"))?,
            audit: audit(row.created_at, row.updated_at, row.created_by.as_deref(), row.updated_by.as_deref())?,
        })
    }
}
