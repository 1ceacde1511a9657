//! Repository facade over the normalizers and the read queries.
//!
//! Every write validates its records first, so the normalizers only ever see
//! records that satisfy the flat record constraints.

use async_stream::stream;
use exn::ResultExt;
use futures::Stream;
use irve_model::Statique;
use irve_model::entity::{OperationalUnit, OperationalUnitKind};
use sqlx::SqlitePool;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::Database;
use crate::error::{ErrorKind, Result, SqlxResultExt};
use crate::models::OperationalUnitRow;
use crate::normalize::{self, DEFAULT_CHUNK_SIZE, ImportSummary};

fn validate(record: &Statique) -> Result<()> {
    record.validate().or_raise(|| ErrorKind::InvalidRecord)
}

/// Read and write access to the normalized IRVE store.
///
/// Writes go through one of three normalization paths:
/// - [`create`](Self::create) and [`update`](Self::update) for single records,
/// - [`create_many`](Self::create_many) for bounded batches,
/// - [`import`](Self::import) for whole datasets.
///
/// Reads return flat records, joined back from the entity tables. Writes are
/// attributed to the repository's author, if it has one.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
    chunk_size: usize,
    author: Option<Uuid>,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone(), chunk_size: DEFAULT_CHUNK_SIZE, author: None }
    }
}
impl Repository {
    /// Create a new repository with the given connection pool and bulk
    /// import chunk size.
    pub fn new(pool: SqlitePool, chunk_size: usize) -> Self {
        Self { pool, chunk_size: chunk_size.max(1), author: None }
    }

    /// Attribute every write made through this repository to `author`.
    pub fn with_author(mut self, author: Option<Uuid>) -> Self {
        self.author = author;
        self
    }

    // =========================================================================
    // Write
    // =========================================================================

    /// Normalize and store one record, returning its stored flat view.
    ///
    /// Entities already stored under the same uniqueness key are reused
    /// without changing their other fields.
    pub async fn create(&self, record: &Statique) -> Result<Statique> {
        validate(record)?;
        let pdc = normalize::normalize_one(&self.pool, record, self.author).await?;
        crate::flatten::flatten(&self.pool, &pdc).await
    }

    /// Overwrite the stored charge point `id_pdc_itinerance` and the entities
    /// it references with the fields of `record`.
    ///
    /// Returns [`ErrorKind::IntegrityError`] if `id_pdc_itinerance` is not the
    /// record's own identifier, and [`ErrorKind::ObjectDoesNotExist`] if no such
    /// charge point is stored.
    pub async fn update(&self, id_pdc_itinerance: &str, record: &Statique) -> Result<Statique> {
        if id_pdc_itinerance != record.id_pdc_itinerance {
            exn::bail!(ErrorKind::IntegrityError(format!(
                "cannot update {id_pdc_itinerance} with the record of {}",
                record.id_pdc_itinerance
            )));
        }
        validate(record)?;
        let pdc = normalize::update_one(&self.pool, record, self.author).await?;
        crate::flatten::flatten(&self.pool, &pdc).await
    }

    /// Normalize and store a batch of records in one transaction.
    ///
    /// Charge points that are already stored are skipped. Returns the flat
    /// views of the records in submission order.
    pub async fn create_many(&self, records: &[Statique]) -> Result<Vec<Statique>> {
        records.iter().try_for_each(validate)?;
        normalize::normalize_many(&self.pool, records, self.author).await
    }

    /// Bulk upsert a whole dataset, overwriting the non-key fields of every
    /// entity it matches.
    pub async fn import(&self, records: Vec<Statique>) -> Result<ImportSummary> {
        records.iter().try_for_each(validate)?;
        normalize::bulk_import(&self.pool, records, self.chunk_size, self.author).await
    }

    // =========================================================================
    // Read
    // =========================================================================

    /// Get the flat view of a charge point.
    pub async fn get(&self, id_pdc_itinerance: &str) -> Result<Statique> {
        crate::flatten::get(&self.pool, id_pdc_itinerance).await
    }

    /// List flat records ordered by charge point identifier.
    ///
    /// An empty `operational_units` slice lists every record; otherwise only
    /// records of stations registered under one of the given codes.
    pub async fn list(&self, offset: u64, limit: u32, operational_units: &[String]) -> Result<Vec<Statique>> {
        crate::flatten::list(&self.pool, offset, limit, operational_units).await
    }

    /// Stream every flat record, fetching `page_size` records at a time.
    pub fn stream(&self, page_size: u32) -> impl Stream<Item = Result<Statique>> + '_ {
        let page_size = page_size.max(1);
        stream! {
            let mut offset = 0;
            loop {
                let page = match crate::flatten::list(&self.pool, offset, page_size, &[]).await {
                    Ok(page) => page,
                    Err(err) => {
                        yield Err(err);
                        break;
                    },
                };
                let last = page.len() < page_size as usize;
                offset += page.len() as u64;
                for record in page {
                    yield Ok(record);
                }
                if last {
                    break;
                }
            }
        }
    }

    /// Number of stored charge points.
    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(include_str!("../queries/count_pdc.sql"))
            .fetch_one(&self.pool)
            .await
            .or_classify()?;
        u64::try_from(count).or_raise(|| ErrorKind::InvalidData("count"))
    }

    // =========================================================================
    // Operational Units
    // =========================================================================

    /// List registered operational units, optionally filtered by a SQL `LIKE`
    /// pattern matched against their code or name.
    pub async fn operational_units(&self, pattern: Option<&str>) -> Result<Vec<OperationalUnit>> {
        let rows: Vec<OperationalUnitRow> = sqlx::query_as(include_str!("../queries/list_operational_units.sql"))
            .bind(pattern)
            .fetch_all(&self.pool)
            .await
            .or_classify()?;
        rows.into_iter().map(OperationalUnit::try_from).collect()
    }

    /// Register (or rename) a charging operational unit.
    ///
    /// Stored stations whose identifier starts with `code` and that have no
    /// operational unit yet are linked to it.
    #[instrument(skip(self))]
    pub async fn register_operational_unit(&self, code: &str, name: &str) -> Result<OperationalUnit> {
        let mut unit =
            OperationalUnit::new(code, name, OperationalUnitKind::Charging).or_raise(|| ErrorKind::InvalidRecord)?;
        unit.audit.created(self.author);
        let row = OperationalUnitRow::from(&unit);
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        let stored: OperationalUnitRow = sqlx::query_as(include_str!("../queries/upsert_operational_unit.sql"))
            .bind(row.id)
            .bind(row.code)
            .bind(row.name)
            .bind(row.kind)
            .bind(row.created_at)
            .bind(row.updated_at)
            .bind(row.created_by)
            .bind(row.updated_by.as_deref())
            .fetch_one(&mut *tx)
            .await
            .or_classify()?;
        let linked = sqlx::query(include_str!("../queries/link_stations_to_operational_unit.sql"))
            .bind(&stored.id)
            .bind(unit.audit.updated_at.unix_timestamp())
            .bind(row.updated_by)
            .bind(&stored.code)
            .execute(&mut *tx)
            .await
            .or_classify()?
            .rows_affected();
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        info!(code = %stored.code, linked, "registered operational unit");
        OperationalUnit::try_from(stored)
    }
}

#[cfg(test)]
mod tests {
    use futures::TryStreamExt;
    use rstest::rstest;

    use super::*;
    use crate::testing::{count, register_fr123, statique};

    async fn repository() -> (Database, Repository) {
        let db = Database::connect_in_memory().await.unwrap();
        register_fr123(db.pool()).await;
        let repo = Repository::new(db.pool().clone(), 2);
        (db, repo)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (_db, repo) = repository().await;
        let created = repo.create(&statique(1)).await.unwrap();
        assert_eq!(created, statique(1));
        assert_eq!(repo.get("FR123P000001").await.unwrap(), statique(1));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_record() {
        let (db, repo) = repository().await;
        let mut record = statique(1);
        record.siren_amenageur = Some("12345".to_string());
        let err = repo.create(&record).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidRecord));
        assert_eq!(count(db.pool(), "amenageur").await, 0);
    }

    #[rstest]
    #[case::mismatched_id("FR123P000002")]
    #[case::unknown("FR123P000001")]
    #[tokio::test]
    async fn test_update_failures(#[case] id: &str) {
        let (_db, repo) = repository().await;
        let err = repo.update(id, &statique(1)).await.unwrap_err();
        if id == "FR123P000001" {
            assert!(matches!(&*err, ErrorKind::ObjectDoesNotExist(_)));
        } else {
            assert!(matches!(&*err, ErrorKind::IntegrityError(_)));
        }
    }

    #[tokio::test]
    async fn test_update_overwrites_non_key_fields() {
        let (_db, repo) = repository().await;
        repo.create(&statique(1)).await.unwrap();
        let mut record = statique(1);
        record.puissance_nominale = 150.0;
        record.code_insee_commune = Some("75056".to_string());
        let updated = repo.update("FR123P000001", &record).await.unwrap();
        assert_eq!(updated, record);
    }

    #[tokio::test]
    async fn test_create_many_and_import() {
        let (db, repo) = repository().await;
        let created = repo.create_many(&[statique(1), statique(2)]).await.unwrap();
        assert_eq!(created, vec![statique(1), statique(2)]);

        let summary = repo.import((1..=5).map(statique).collect()).await.unwrap();
        assert_eq!(summary.records, 5);
        assert_eq!(repo.count().await.unwrap(), 5);
        assert_eq!(count(db.pool(), "station").await, 1);
    }

    #[tokio::test]
    async fn test_import_validates_every_record() {
        let (_db, repo) = repository().await;
        let mut broken = statique(2);
        broken.nbre_pdc = 0;
        let err = repo.import(vec![statique(1), broken]).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidRecord));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(5)]
    #[case(0)]
    #[tokio::test]
    async fn test_stream_visits_every_record(#[case] page_size: u32) {
        let (_db, repo) = repository().await;
        repo.import((1..=4).map(statique).collect()).await.unwrap();
        let records: Vec<Statique> = repo.stream(page_size).try_collect().await.unwrap();
        assert_eq!(records, (1..=4).map(statique).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_operational_units() {
        let (_db, repo) = repository().await;
        let units = repo.operational_units(Some("FR073")).await.unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].name, "ACELEC CHARGE");
        assert_eq!(repo.operational_units(None).await.unwrap().len(), 478);
    }

    #[tokio::test]
    async fn test_register_operational_unit_links_stations() {
        let (db, repo) = repository().await;
        repo.create(&statique(1)).await.unwrap();
        sqlx::query("UPDATE station SET operational_unit_id = NULL").execute(db.pool()).await.unwrap();

        let unit = repo.register_operational_unit("FR123", "Recharge Renommée").await.unwrap();
        assert_eq!(unit.code, "FR123");
        assert_eq!(unit.name, "Recharge Renommée");
        let linked: Option<String> = sqlx::query_scalar("SELECT operational_unit_id FROM station")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(linked, Some(unit.id.hyphenated().to_string()));
        assert_eq!(repo.list(0, 10, &["FR123".to_string()]).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_writes_carry_the_repository_author() {
        let (db, repo) = repository().await;
        let author = Uuid::new_v4();
        let repo = repo.with_author(Some(author));
        repo.create(&statique(1)).await.unwrap();
        repo.create_many(&[statique(2), statique(3)]).await.unwrap();
        repo.import((4..=5).map(statique).collect()).await.unwrap();
        let unit = repo.register_operational_unit("FR124", "Recharge Attribuée").await.unwrap();
        assert_eq!(unit.audit.created_by, Some(author));

        let unattributed: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM pointdecharge WHERE created_by IS NOT ? OR updated_by IS NOT ?",
        )
        .bind(author.to_string())
        .bind(author.to_string())
        .fetch_one(db.pool())
        .await
        .unwrap();
        assert_eq!(unattributed, 0);
        assert_eq!(count(db.pool(), "pointdecharge").await, 5);
    }

    #[tokio::test]
    async fn test_register_operational_unit_rejects_bad_code() {
        let (_db, repo) = repository().await;
        let err = repo.register_operational_unit("fr-12", "Nope").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidRecord));
    }
}
