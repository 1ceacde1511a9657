use exn::ResultExt;
use irve_model::entity::{OperationalUnit, OperationalUnitKind};

use super::{audit, author, uuid};
use crate::error::{Error, ErrorKind, Result};

#[derive(sqlx::FromRow)]
pub(crate) struct OperationalUnitRow {
    pub(crate) id: String,
    pub(crate) code: String,
    pub(crate) name: String,
    #[sqlx(rename = "type")]
    pub(crate) kind: i64,
    pub(crate) created_at: i64,
    pub(crate) updated_at: i64,
    pub(crate) created_by: Option<String>,
    pub(crate) updated_by: Option<String>,
}
impl From<&OperationalUnit> for OperationalUnitRow {
    fn from(unit: &OperationalUnit) -> Self {
        Self {
            id: unit.id.hyphenated().to_string(),
            code: unit.code.clone(),
            name: unit.name.clone(),
            kind: unit.kind.as_i64(),
            created_at: unit.audit.created_at.unix_timestamp(),
            updated_at: unit.audit.updated_at.unix_timestamp(),
            created_by: author(unit.audit.created_by),
            updated_by: author(unit.audit.updated_by),
        }
    }
}
impl TryFrom<OperationalUnitRow> for OperationalUnit {
    type Error = Error;
    fn try_from(row: OperationalUnitRow) -> Result<Self> {
        Ok(Self {
            id: uuid(&row.id, "operationalunit.id")?,
            code: row.code,
            name: row.name,
            kind: OperationalUnitKind::try_from(row.kind).or_raise(|| ErrorKind::InvalidData("operationalunit.type"))?,
            audit: audit(row.created_at, row.updated_at, row.created_by.as_deref(), row.updated_by.as_deref())?,
        })
    }
}
