//! Set-based bulk import.
//!
//! The importer keeps the submitted records as a working table plus, per
//! record, the identifiers resolved so far. Each [`Stage`] projects one
//! entity kind out of the working table, drops rows sharing a uniqueness key
//! (the first occurrence wins), and upserts what remains in chunks with
//! `INSERT .. ON CONFLICT .. DO UPDATE .. RETURNING`. The returned
//! identifiers become the foreign keys of later stages, so stages must run
//! in [`Stage::ORDER`] and each only once per importer.

use exn::{OptionExt, ResultExt};
use irve_model::Statique;
use irve_model::entity::{
    Amenageur, Enseigne, Localisation, Operateur, PointDeCharge, Station, operational_unit_code,
};
use sqlx::query_builder::Separated;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use std::collections::{BTreeSet, HashMap};
use std::fmt::{Display, Formatter, Result as FmtResult};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::check_prefix;
use crate::SQLITE_MAX_VARIABLES;
use crate::error::{ErrorKind, Result, SqlxResultExt};
use crate::models::{AmenageurRow, EnseigneRow, LocalisationRow, OperateurRow, PointDeChargeRow, StationRow};

pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// One entity kind written by the bulk importer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Amenageur,
    Operateur,
    Enseigne,
    Localisation,
    Station,
    PointDeCharge,
}
impl Stage {
    /// The only order in which every stage finds the identifiers it needs.
    pub const ORDER: [Stage; 6] = [
        Stage::Amenageur,
        Stage::Operateur,
        Stage::Enseigne,
        Stage::Localisation,
        Stage::Station,
        Stage::PointDeCharge,
    ];

    /// Stages whose identifiers this stage writes as foreign keys.
    pub fn requires(&self) -> &'static [Stage] {
        match self {
            Stage::Station => &[Stage::Amenageur, Stage::Operateur, Stage::Enseigne, Stage::Localisation],
            Stage::PointDeCharge => &[Stage::Station],
            _ => &[],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Amenageur => "amenageur",
            Stage::Operateur => "operateur",
            Stage::Enseigne => "enseigne",
            Stage::Localisation => "localisation",
            Stage::Station => "station",
            Stage::PointDeCharge => "pointdecharge",
        }
    }
}
impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSummary {
    pub stage: Stage,
    /// Unique rows upserted after deduplication.
    pub rows: usize,
    /// Upsert statements issued.
    pub statements: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub records: usize,
    pub stages: Vec<StageSummary>,
}
impl ImportSummary {
    pub fn stage(&self, stage: Stage) -> Option<&StageSummary> {
        self.stages.iter().find(|summary| summary.stage == stage)
    }
}

/// Identifiers resolved so far for one record of the working table.
#[derive(Debug, Clone, Copy, Default)]
struct Links {
    operational_unit: Option<Uuid>,
    amenageur: Option<Uuid>,
    operateur: Option<Uuid>,
    enseigne: Option<Uuid>,
    localisation: Option<Uuid>,
    station: Option<Uuid>,
}

/// Single-use bulk importer.
///
/// Every row it inserts or overwrites is attributed to `author`.
///
/// ```ignore
/// let mut importer = BulkImporter::new(records, 1000, None);
/// let summary = importer.import(db.pool()).await?;
/// ```
pub struct BulkImporter {
    records: Vec<Statique>,
    links: Vec<Links>,
    chunk_size: usize,
    author: Option<Uuid>,
    units_merged: bool,
    saved: Vec<StageSummary>,
}
impl BulkImporter {
    pub fn new(records: Vec<Statique>, chunk_size: usize, author: Option<Uuid>) -> Self {
        let links = vec![Links::default(); records.len()];
        Self { records, links, chunk_size: chunk_size.max(1), author, units_merged: false, saved: Vec::new() }
    }

    /// Runs every stage in order inside one transaction.
    ///
    /// Nothing is persisted unless every stage succeeds. An importer that
    /// already saved a stage refuses to run again.
    #[instrument(skip_all, fields(records = self.records.len(), chunk_size = self.chunk_size))]
    pub async fn import(&mut self, pool: &SqlitePool) -> Result<ImportSummary> {
        if let Some(summary) = self.saved.first() {
            exn::bail!(ErrorKind::ProgrammingError(format!(
                "this importer already saved {}; use a new importer for every import",
                summary.stage
            )));
        }
        self.records.iter().try_for_each(check_prefix)?;
        let mut tx = pool.begin().await.or_raise(|| ErrorKind::Database)?;
        self.merge_operational_units(&mut tx).await?;
        for stage in Stage::ORDER {
            self.save(&mut tx, stage).await?;
        }
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        let summary = ImportSummary { records: self.records.len(), stages: self.saved.clone() };
        info!(?summary, "bulk import committed");
        Ok(summary)
    }

    /// Resolves the operational unit of every record from its station prefix.
    ///
    /// Fails with [`ErrorKind::IntegrityError`] if a charge point is not
    /// issued under the prefix of its station, and with
    /// [`ErrorKind::ObjectDoesNotExist`] naming every unregistered prefix.
    pub async fn merge_operational_units(&mut self, conn: &mut SqliteConnection) -> Result<()> {
        if self.units_merged {
            warn!("operational units are already merged");
            return Ok(());
        }
        self.records.iter().try_for_each(check_prefix)?;
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT code, id FROM operationalunit").fetch_all(&mut *conn).await.or_classify()?;
        let units = rows.into_iter().collect::<HashMap<_, _>>();
        let mut missing = BTreeSet::new();
        for (record, links) in self.records.iter().zip(self.links.iter_mut()) {
            let code = operational_unit_code(&record.id_station_itinerance).unwrap_or(&record.id_station_itinerance);
            match units.get(code) {
                Some(id) => links.operational_unit = Some(crate::models::uuid(id, "operationalunit.id")?),
                None => {
                    missing.insert(code.to_string());
                },
            }
        }
        if !missing.is_empty() {
            exn::bail!(ErrorKind::ObjectDoesNotExist(format!(
                "operational units {}",
                missing.into_iter().collect::<Vec<_>>().join(", ")
            )));
        }
        self.units_merged = true;
        Ok(())
    }

    /// Upserts one entity kind and merges the resulting identifiers back
    /// into the working table.
    ///
    /// Fails with [`ErrorKind::ProgrammingError`] if the stage was already
    /// saved, or if a stage it depends on was not.
    #[instrument(skip(self, conn), fields(records = self.records.len()))]
    pub async fn save(&mut self, conn: &mut SqliteConnection, stage: Stage) -> Result<StageSummary> {
        self.check(stage)?;
        let (chunk_size, author) = (self.chunk_size, self.author);
        let (ids, summary) = match stage {
            Stage::Amenageur => {
                upsert(conn, stage, chunk_size, author, &self.records, &self.links, |record, _| {
                    AmenageurRow::from(&Amenageur::from(record))
                })
                .await?
            },
            Stage::Operateur => {
                upsert(conn, stage, chunk_size, author, &self.records, &self.links, |record, _| {
                    OperateurRow::from(&Operateur::from(record))
                })
                .await?
            },
            Stage::Enseigne => {
                upsert(conn, stage, chunk_size, author, &self.records, &self.links, |record, _| {
                    EnseigneRow::from(&Enseigne::from(record))
                })
                .await?
            },
            Stage::Localisation => {
                upsert(conn, stage, chunk_size, author, &self.records, &self.links, |record, _| {
                    LocalisationRow::from(&Localisation::from(record))
                })
                .await?
            },
            Stage::Station => {
                upsert(conn, stage, chunk_size, author, &self.records, &self.links, |record, links| {
                    let mut station = Station::from(record);
                    station.amenageur_id = links.amenageur;
                    station.operateur_id = links.operateur;
                    station.enseigne_id = links.enseigne;
                    station.localisation_id = links.localisation;
                    station.operational_unit_id = links.operational_unit;
                    StationRow::from(&station)
                })
                .await?
            },
            Stage::PointDeCharge => {
                upsert(conn, stage, chunk_size, author, &self.records, &self.links, |record, links| {
                    let mut pdc = PointDeCharge::from(record);
                    pdc.station_id = links.station;
                    PointDeChargeRow::from(&pdc)
                })
                .await?
            },
        };
        for (links, id) in self.links.iter_mut().zip(ids) {
            match stage {
                Stage::Amenageur => links.amenageur = Some(id),
                Stage::Operateur => links.operateur = Some(id),
                Stage::Enseigne => links.enseigne = Some(id),
                Stage::Localisation => links.localisation = Some(id),
                Stage::Station => links.station = Some(id),
                Stage::PointDeCharge => {},
            }
        }
        self.saved.push(summary);
        Ok(summary)
    }

    fn check(&self, stage: Stage) -> Result<()> {
        let saved = |stage: &Stage| self.saved.iter().any(|summary| summary.stage == *stage);
        if saved(&stage) {
            exn::bail!(ErrorKind::ProgrammingError(format!(
                "cannot save {stage} more than once with the same importer"
            )));
        }
        if let Some(missing) = stage.requires().iter().find(|required| !saved(required)) {
            exn::bail!(ErrorKind::ProgrammingError(format!("{stage} requires {missing} to be saved first")));
        }
        if stage == Stage::Station && !self.units_merged {
            exn::bail!(ErrorKind::ProgrammingError(format!(
                "{stage} requires operational units to be merged first"
            )));
        }
        Ok(())
    }
}

/// Runs a one-shot bulk import.
pub async fn bulk_import(
    pool: &SqlitePool,
    records: Vec<Statique>,
    chunk_size: usize,
    author: Option<Uuid>,
) -> Result<ImportSummary> {
    BulkImporter::new(records, chunk_size, author).import(pool).await
}

// =========================================================================
// Set-based upsert
// =========================================================================

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Text(Option<String>),
    Integer(Option<i64>),
    Real(f64),
    Bool(Option<bool>),
}
impl Value {
    fn as_key(&self) -> String {
        match self {
            Value::Text(value) => value.clone().unwrap_or_default(),
            Value::Integer(value) => value.map(|v| v.to_string()).unwrap_or_default(),
            Value::Real(value) => value.to_string(),
            Value::Bool(value) => value.map(|v| v.to_string()).unwrap_or_default(),
        }
    }

    fn bind<'args>(&self, builder: &mut Separated<'_, 'args, Sqlite, &'static str>) {
        match self {
            Value::Text(value) => builder.push_bind(value.clone()),
            Value::Integer(value) => builder.push_bind(*value),
            Value::Real(value) => builder.push_bind(*value),
            Value::Bool(value) => builder.push_bind(*value),
        };
    }
}

/// A row ready for upserting: identifier, column values, audit columns.
struct Stamped {
    id: String,
    values: Vec<Value>,
    created_at: i64,
    updated_at: i64,
    created_by: Option<String>,
    updated_by: Option<String>,
}

/// Audit columns appended to every upserted row.
const AUDIT_COLUMNS: [&str; 4] = ["created_at", "updated_at", "created_by", "updated_by"];

struct Table {
    name: &'static str,
    /// Every column except `id` and the audit columns. The key columns come
    /// first.
    columns: &'static [&'static str],
    key: &'static [&'static str],
}

trait Columns {
    const TABLE: Table;
    fn stamped(self) -> Stamped;
}

fn text(value: String) -> Value {
    Value::Text(Some(value))
}

impl Columns for AmenageurRow {
    const TABLE: Table = Table {
        name: "amenageur",
        columns: &["nom_amenageur", "siren_amenageur", "contact_amenageur"],
        key: &["nom_amenageur", "siren_amenageur", "contact_amenageur"],
    };
    fn stamped(self) -> Stamped {
        Stamped {
            id: self.id,
            values: vec![text(self.nom_amenageur), text(self.siren_amenageur), text(self.contact_amenageur)],
            created_at: self.created_at,
            updated_at: self.updated_at,
            created_by: self.created_by,
            updated_by: self.updated_by,
        }
    }
}
impl Columns for OperateurRow {
    const TABLE: Table = Table {
        name: "operateur",
        columns: &["nom_operateur", "contact_operateur", "telephone_operateur"],
        key: &["nom_operateur", "contact_operateur", "telephone_operateur"],
    };
    fn stamped(self) -> Stamped {
        Stamped {
            id: self.id,
            values: vec![text(self.nom_operateur), text(self.contact_operateur), text(self.telephone_operateur)],
            created_at: self.created_at,
            updated_at: self.updated_at,
            created_by: self.created_by,
            updated_by: self.updated_by,
        }
    }
}
impl Columns for EnseigneRow {
    const TABLE: Table = Table { name: "enseigne", columns: &["nom_enseigne"], key: &["nom_enseigne"] };
    fn stamped(self) -> Stamped {
        Stamped {
            id: self.id,
            values: vec![text(self.nom_enseigne)],
            created_at: self.created_at,
            updated_at: self.updated_at,
            created_by: self.created_by,
            updated_by: self.updated_by,
        }
    }
}
impl Columns for LocalisationRow {
    const TABLE: Table = Table {
        name: "localisation",
        columns: &["adresse_station", "code_insee_commune", "coordonnees_xy"],
        key: &["adresse_station"],
    };
    fn stamped(self) -> Stamped {
        Stamped {
            id: self.id,
            values: vec![text(self.adresse_station), Value::Text(self.code_insee_commune), text(self.coordonnees_xy)],
            created_at: self.created_at,
            updated_at: self.updated_at,
            created_by: self.created_by,
            updated_by: self.updated_by,
        }
    }
}
impl Columns for StationRow {
    const TABLE: Table = Table {
        name: "station",
        columns: &[
            "id_station_itinerance",
            "id_station_local",
            "nom_station",
            "implantation_station",
            "nbre_pdc",
            "condition_acces",
            "horaires",
            "station_deux_roues",
            "raccordement",
            "num_pdl",
            "date_maj",
            "date_mise_en_service",
            "amenageur_id",
            "operateur_id",
            "enseigne_id",
            "localisation_id",
            "operational_unit_id",
        ],
        key: &["id_station_itinerance"],
    };
    fn stamped(self) -> Stamped {
        Stamped {
            id: self.id,
            values: vec![
                text(self.id_station_itinerance),
                Value::Text(self.id_station_local),
                text(self.nom_station),
                text(self.implantation_station),
                Value::Integer(Some(self.nbre_pdc)),
                text(self.condition_acces),
                text(self.horaires),
                Value::Bool(Some(self.station_deux_roues)),
                Value::Text(self.raccordement),
                Value::Text(self.num_pdl),
                Value::Integer(Some(self.date_maj)),
                Value::Integer(self.date_mise_en_service),
                Value::Text(self.amenageur_id),
                Value::Text(self.operateur_id),
                Value::Text(self.enseigne_id),
                Value::Text(self.localisation_id),
                Value::Text(self.operational_unit_id),
            ],
            created_at: self.created_at,
            updated_at: self.updated_at,
            created_by: self.created_by,
            updated_by: self.updated_by,
        }
    }
}
impl Columns for PointDeChargeRow {
    const TABLE: Table = Table {
        name: "pointdecharge",
        columns: &[
            "id_pdc_itinerance",
            "id_pdc_local",
            "puissance_nominale",
            "prise_type_ef",
            "prise_type_2",
            "prise_type_combo_ccs",
            "prise_type_chademo",
            "prise_type_autre",
            "gratuit",
            "paiement_acte",
            "paiement_cb",
            "paiement_autre",
            "tarification",
            "reservation",
            "accessibilite_pmr",
            "restriction_gabarit",
            "observations",
            "cable_t2_attache",
            "station_id",
        ],
        key: &["id_pdc_itinerance"],
    };
    fn stamped(self) -> Stamped {
        Stamped {
            id: self.id,
            values: vec![
                text(self.id_pdc_itinerance),
                Value::Text(self.id_pdc_local),
                Value::Real(self.puissance_nominale),
                Value::Bool(Some(self.prise_type_ef)),
                Value::Bool(Some(self.prise_type_2)),
                Value::Bool(Some(self.prise_type_combo_ccs)),
                Value::Bool(Some(self.prise_type_chademo)),
                Value::Bool(Some(self.prise_type_autre)),
                Value::Bool(self.gratuit),
                Value::Bool(Some(self.paiement_acte)),
                Value::Bool(self.paiement_cb),
                Value::Bool(self.paiement_autre),
                Value::Text(self.tarification),
                Value::Bool(Some(self.reservation)),
                text(self.accessibilite_pmr),
                text(self.restriction_gabarit),
                Value::Text(self.observations),
                Value::Bool(self.cable_t2_attache),
                Value::Text(self.station_id),
            ],
            created_at: self.created_at,
            updated_at: self.updated_at,
            created_by: self.created_by,
            updated_by: self.updated_by,
        }
    }
}

/// Rows per statement, bounded by SQLite's limit on bound variables.
fn effective_chunk_size(chunk_size: usize, table: &Table) -> usize {
    let per_row = 1 + table.columns.len() + AUDIT_COLUMNS.len();
    chunk_size.clamp(1, (SQLITE_MAX_VARIABLES / per_row).max(1))
}

/// Projects, deduplicates and upserts one entity kind.
///
/// Returns the identifier of the stored row for every record, in record order.
/// Inserted rows are created by `author`; matched rows keep their creator and
/// are updated by `author`.
async fn upsert<R, F>(
    conn: &mut SqliteConnection,
    stage: Stage,
    chunk_size: usize,
    author: Option<Uuid>,
    records: &[Statique],
    links: &[Links],
    project: F,
) -> Result<(Vec<Uuid>, StageSummary)>
where
    R: Columns,
    F: Fn(&Statique, &Links) -> R,
{
    let table = R::TABLE;
    let key_len = table.key.len();
    let author = crate::models::author(author);
    let mut positions: HashMap<Vec<String>, usize> = HashMap::new();
    let mut unique: Vec<Stamped> = Vec::new();
    let mut record_keys = Vec::with_capacity(records.len());
    for (record, links) in records.iter().zip(links) {
        let mut row = project(record, links).stamped();
        row.created_by = author.clone();
        row.updated_by = author.clone();
        let key = row.values[..key_len].iter().map(Value::as_key).collect::<Vec<_>>();
        if !positions.contains_key(&key) {
            positions.insert(key.clone(), unique.len());
            unique.push(row);
        }
        record_keys.push(key);
    }

    let chunk_size = effective_chunk_size(chunk_size, &table);
    let mut stored: HashMap<Vec<String>, Uuid> = HashMap::with_capacity(unique.len());
    let mut statements = 0;
    for chunk in unique.chunks(chunk_size) {
        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "INSERT INTO {} (id, {}, {}) ",
            table.name,
            table.columns.join(", "),
            AUDIT_COLUMNS.join(", ")
        ));
        query.push_values(chunk, |mut builder, row| {
            builder.push_bind(row.id.clone());
            for value in &row.values {
                value.bind(&mut builder);
            }
            builder.push_bind(row.created_at);
            builder.push_bind(row.updated_at);
            builder.push_bind(row.created_by.clone());
            builder.push_bind(row.updated_by.clone());
        });
        query.push(format!(" ON CONFLICT ({}) DO UPDATE SET ", table.key.join(", ")));
        for column in &table.columns[key_len..] {
            query.push(format!("{column} = excluded.{column}, "));
        }
        query.push(format!("updated_at = max({}.created_at, excluded.updated_at), ", table.name));
        query.push("updated_by = excluded.updated_by");
        query.push(format!(" RETURNING id, {}", table.key.join(", ")));
        let rows = query.build().fetch_all(&mut *conn).await.or_classify()?;
        statements += 1;
        for row in rows {
            let id: String = row.try_get(0).or_raise(|| ErrorKind::InvalidData("returned id"))?;
            let key = (1..=key_len)
                .map(|index| row.try_get::<String, _>(index))
                .collect::<std::result::Result<Vec<_>, _>>()
                .or_raise(|| ErrorKind::InvalidData("returned key"))?;
            stored.insert(key, crate::models::uuid(&id, "returned id")?);
        }
    }
    debug!(%stage, rows = unique.len(), statements, "upserted stage");

    let ids = record_keys
        .iter()
        .map(|key| {
            stored.get(key).copied().ok_or_raise(|| {
                ErrorKind::IntegrityError(format!("{stage} upsert returned no row for key {}", key.join(", ")))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok((ids, StageSummary { stage, rows: unique.len(), statements }))
}
