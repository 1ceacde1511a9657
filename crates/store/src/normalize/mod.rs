//! Normalizers: turning flat records into the entity graph.
//!
//! Three paths share the same entity semantics and differ in how they talk to
//! the database:
//! - [`normalize_one`]: one record, one lookup per entity kind, one transaction.
//! - [`normalize_many`]: a bounded list, deduplicated in memory before any lookup.
//! - [`BulkImporter`]: whole datasets, chunked set-based upserts.

mod batch;
mod bulk;
mod persist;
mod single;

use irve_model::Statique;
use irve_model::entity::operational_unit_code;
use sqlx::SqliteConnection;
use std::fmt::{Display, Formatter, Result as FmtResult};
use tracing::debug;
use uuid::Uuid;

use crate::error::{ErrorKind, Result, SqlxResultExt};
pub use self::batch::normalize_many;
pub use self::bulk::{BulkImporter, DEFAULT_CHUNK_SIZE, ImportSummary, Stage, StageSummary, bulk_import};
pub(crate) use self::persist::Persist;
pub use self::single::{normalize_one, update_one};

/// What a `get_or_create` lookup did with a candidate entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// A stored row matched and is reused unchanged.
    Existing,
    /// Nothing matched; the candidate is staged for insertion.
    Created,
    /// A stored row matched and has staged modifications.
    Updated,
}
impl EntryStatus {
    /// A reused row that picked up changes must be written back.
    pub(crate) fn modified(self) -> Self {
        match self {
            Self::Existing => Self::Updated,
            status => status,
        }
    }
}
impl Display for EntryStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Existing => "existing",
            Self::Created => "created",
            Self::Updated => "updated",
        })
    }
}

/// Looks `candidate` up by its uniqueness key.
///
/// A match is reused; with `update` set, the match also takes over the
/// candidate's non-key fields. No match stages the candidate itself. More
/// than one match means the store violates its own uniqueness rules and is
/// reported as [`ErrorKind::AmbiguousMatch`].
pub(crate) async fn get_or_create<T: Persist>(
    conn: &mut SqliteConnection,
    candidate: T,
    update: bool,
) -> Result<(EntryStatus, T)> {
    let mut found = T::find(conn, &candidate).await?;
    if found.len() > 1 {
        exn::bail!(ErrorKind::AmbiguousMatch { entity: T::ENTITY, key: candidate.describe() });
    }
    let (status, entity) = match found.pop() {
        None => (EntryStatus::Created, candidate),
        Some(mut existing) => {
            if update && existing.absorb(&candidate) {
                (EntryStatus::Updated, existing)
            } else {
                (EntryStatus::Existing, existing)
            }
        },
    };
    debug!(entity = T::ENTITY, key = %entity.describe(), %status, "resolved entity");
    Ok((status, entity))
}

/// Writes a resolved entity according to its status, attributing the write
/// to `author`.
pub(crate) async fn save<T: Persist>(
    conn: &mut SqliteConnection,
    status: EntryStatus,
    entity: &mut T,
    author: Option<Uuid>,
) -> Result<()> {
    match status {
        EntryStatus::Existing => Ok(()),
        EntryStatus::Created => {
            entity.audit_mut().created(author);
            entity.insert(conn).await
        },
        EntryStatus::Updated => {
            entity.audit_mut().updated(author);
            entity.update(conn).await
        },
    }
}

/// A charge point must be issued under the operational unit of its station.
///
/// Fails with [`ErrorKind::IntegrityError`] naming both identifiers.
pub(crate) fn check_prefix(record: &Statique) -> Result<()> {
    let station = operational_unit_code(&record.id_station_itinerance);
    if station != operational_unit_code(&record.id_pdc_itinerance) {
        exn::bail!(ErrorKind::IntegrityError(format!(
            "charge point {} is not issued under the operational unit of station {}",
            record.id_pdc_itinerance, record.id_station_itinerance
        )));
    }
    Ok(())
}

/// Finds the operational unit a station identifier was issued under.
pub(crate) async fn resolve_operational_unit(conn: &mut SqliteConnection, id_station_itinerance: &str) -> Result<Uuid> {
    let Some(code) = operational_unit_code(id_station_itinerance) else {
        exn::bail!(ErrorKind::ObjectDoesNotExist(format!("operational unit for station {id_station_itinerance}")));
    };
    let id: Option<String> = sqlx::query_scalar(include_str!("../../queries/select_operational_unit_id_by_code.sql"))
        .bind(code)
        .fetch_optional(&mut *conn)
        .await
        .or_classify()?;
    let Some(id) = id else {
        exn::bail!(ErrorKind::ObjectDoesNotExist(format!(
            "operational unit {code} for station {id_station_itinerance}"
        )));
    };
    crate::models::uuid(&id, "operationalunit.id")
}

#[cfg(test)]
mod tests {
    use irve_model::entity::{Amenageur, Enseigne, Operateur};
    use rstest::rstest;

    use super::*;
    use crate::Database;
    use crate::testing::{count, statique};

    #[rstest]
    #[case("FR123E000001", "FR123P000001", true)]
    #[case("FR123E000001", "FR999P000001", false)]
    #[case("FRS63E0001", "FRS63P0001", true)]
    #[case("FR1", "FR123P000001", false)]
    fn test_check_prefix(#[case] station: &str, #[case] pdc: &str, #[case] ok: bool) {
        let mut record = statique(1);
        record.id_station_itinerance = station.to_string();
        record.id_pdc_itinerance = pdc.to_string();
        let result = check_prefix(&record);
        assert_eq!(result.is_ok(), ok);
        if let Err(err) = result {
            assert!(matches!(&*err, ErrorKind::IntegrityError(_)));
        }
    }

    #[tokio::test]
    async fn test_fully_keyed_rows_are_never_updated() {
        let db = Database::connect_in_memory().await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();
        let record = statique(1);

        let mut enseigne = Enseigne::from(&record);
        save(&mut conn, EntryStatus::Created, &mut enseigne, None).await.unwrap();
        let err = save(&mut conn, EntryStatus::Updated, &mut enseigne, None).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::ProgrammingError(message) if message.contains("enseigne")));

        let mut amenageur = Amenageur::from(&record);
        assert!(!amenageur.absorb(&Amenageur::from(&record)));
        let err = save(&mut conn, EntryStatus::Updated, &mut amenageur, None).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::ProgrammingError(_)));
        let mut operateur = Operateur::from(&record);
        let err = save(&mut conn, EntryStatus::Updated, &mut operateur, None).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::ProgrammingError(_)));
        drop(conn);
        assert_eq!(count(db.pool(), "enseigne").await, 1);
    }

    #[tokio::test]
    async fn test_reuse_of_fully_keyed_rows_is_never_an_update() {
        let db = Database::connect_in_memory().await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();
        let mut enseigne = Enseigne::from(&statique(1));
        save(&mut conn, EntryStatus::Created, &mut enseigne, None).await.unwrap();
        let (status, reused) = get_or_create(&mut conn, Enseigne::from(&statique(2)), true).await.unwrap();
        assert_eq!(status, EntryStatus::Existing);
        assert_eq!(reused.id, enseigne.id);
    }
}
