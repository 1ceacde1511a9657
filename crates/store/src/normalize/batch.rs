//! Batch normalization with in-memory deduplication.
//!
//! Records are projected into one arena per entity kind. Equal candidates
//! collapse onto the same slot, and each record only keeps the indices of its
//! slots. Database lookups then run once per unique entity instead of once
//! per record.

use exn::ResultExt;
use irve_model::Statique;
use irve_model::entity::{Amenageur, Enseigne, Localisation, Operateur, PointDeCharge, Station};
use irve_model::entity::{amenageur, enseigne, localisation, operateur, pdc, station};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{EntryStatus, Persist, check_prefix, get_or_create, save};
use crate::SQLITE_MAX_VARIABLES;
use crate::error::{ErrorKind, Result, SqlxResultExt};

/// Normalizes a list of records in a single transaction.
///
/// Records whose charge point is already stored are skipped, so replaying a
/// batch is harmless. The returned records are the flattened views of the
/// charge points that were actually written, in submission order. Records
/// sharing a station all report the parents the station was finally linked
/// to, which are those of the last of them. Rows written here are attributed
/// to `author`.
///
/// Fails before touching the database with [`ErrorKind::DuplicateSubmission`]
/// if two records share a charge point identifier, and with
/// [`ErrorKind::IntegrityError`] if a charge point and its station have
/// different identifier prefixes.
#[instrument(skip_all, fields(records = records.len()))]
pub async fn normalize_many(pool: &SqlitePool, records: &[Statique], author: Option<Uuid>) -> Result<Vec<Statique>> {
    reject_duplicates(records)?;
    records.iter().try_for_each(check_prefix)?;
    let mut tx = pool.begin().await.or_raise(|| ErrorKind::Database)?;
    let existing = existing_pdc_keys(&mut tx, records).await?;
    let pending = records.iter().filter(|record| !existing.contains(&record.id_pdc_itinerance)).collect::<Vec<_>>();
    if pending.is_empty() {
        info!(skipped = records.len(), "every charge point is already stored");
        return Ok(Vec::new());
    }

    let mut graph = Graph::default();
    let mut links = pending.iter().map(|record| graph.intern(record)).collect::<Vec<_>>();
    graph.resolve(&mut tx).await?;
    graph.wire(&mut links);
    graph.save(&mut tx, author).await?;
    tx.commit().await.or_raise(|| ErrorKind::Database)?;

    info!(
        written = links.len(),
        skipped = records.len() - links.len(),
        stations = graph.stations.items.len(),
        amenageurs = graph.amenageurs.items.len(),
        "normalized batch"
    );
    Ok(links.iter().map(|links| graph.flatten(links)).collect())
}

/// Fails with [`ErrorKind::DuplicateSubmission`] listing every charge point
/// identifier that appears more than once.
fn reject_duplicates(records: &[Statique]) -> Result<()> {
    let mut seen = HashSet::with_capacity(records.len());
    let duplicates = records
        .iter()
        .map(|record| record.id_pdc_itinerance.as_str())
        .filter(|id| !seen.insert(*id))
        .collect::<BTreeSet<_>>();
    if !duplicates.is_empty() {
        exn::bail!(ErrorKind::DuplicateSubmission(duplicates.into_iter().map(str::to_string).collect()));
    }
    Ok(())
}

async fn existing_pdc_keys(conn: &mut SqliteConnection, records: &[Statique]) -> Result<HashSet<String>> {
    let mut existing = HashSet::new();
    for chunk in records.chunks(SQLITE_MAX_VARIABLES) {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT id_pdc_itinerance FROM pointdecharge WHERE id_pdc_itinerance IN (");
        let mut keys = query.separated(", ");
        for record in chunk {
            keys.push_bind(record.id_pdc_itinerance.as_str());
        }
        keys.push_unseparated(")");
        let found: Vec<String> = query.build_query_scalar().fetch_all(&mut *conn).await.or_classify()?;
        existing.extend(found);
    }
    Ok(existing)
}

/// Unique entities of one kind, addressed by index.
struct Arena<T> {
    items: Vec<T>,
    statuses: Vec<EntryStatus>,
    equals: fn(&T, &T) -> bool,
}
impl<T: Persist + Clone> Arena<T> {
    fn new(equals: fn(&T, &T) -> bool) -> Self {
        Self { items: Vec::new(), statuses: Vec::new(), equals }
    }

    /// Index of the slot equal to `candidate`, appending it if there is none.
    fn intern(&mut self, candidate: T) -> usize {
        if let Some(index) = self.items.iter().position(|item| (self.equals)(item, &candidate)) {
            return index;
        }
        self.items.push(candidate);
        self.statuses.push(EntryStatus::Created);
        self.items.len() - 1
    }

    /// Replaces every candidate with the stored row it matches, if any.
    async fn resolve(&mut self, conn: &mut SqliteConnection) -> Result<()> {
        for (item, status) in self.items.iter_mut().zip(self.statuses.iter_mut()) {
            let (resolved_status, resolved) = get_or_create(conn, item.clone(), false).await?;
            *item = resolved;
            *status = resolved_status;
        }
        Ok(())
    }

    async fn save(&mut self, conn: &mut SqliteConnection, author: Option<Uuid>) -> Result<()> {
        for (item, status) in self.items.iter_mut().zip(self.statuses.iter()) {
            save(conn, *status, item, author).await?;
        }
        Ok(())
    }
}

/// Where one record's entities live in the arenas.
#[derive(Debug, Clone, Copy)]
struct Links {
    pdc: usize,
    station: usize,
    amenageur: usize,
    operateur: usize,
    enseigne: usize,
    localisation: usize,
}

struct Graph {
    pdcs: Arena<PointDeCharge>,
    stations: Arena<Station>,
    amenageurs: Arena<Amenageur>,
    operateurs: Arena<Operateur>,
    enseignes: Arena<Enseigne>,
    localisations: Arena<Localisation>,
}
impl Default for Graph {
    fn default() -> Self {
        Self {
            pdcs: Arena::new(pdc::equals),
            stations: Arena::new(station::equals),
            amenageurs: Arena::new(amenageur::equals),
            operateurs: Arena::new(operateur::equals),
            enseignes: Arena::new(enseigne::equals),
            localisations: Arena::new(localisation::equals),
        }
    }
}
impl Graph {
    fn intern(&mut self, record: &Statique) -> Links {
        Links {
            pdc: self.pdcs.intern(PointDeCharge::from(record)),
            station: self.stations.intern(Station::from(record)),
            amenageur: self.amenageurs.intern(Amenageur::from(record)),
            operateur: self.operateurs.intern(Operateur::from(record)),
            enseigne: self.enseignes.intern(Enseigne::from(record)),
            localisation: self.localisations.intern(Localisation::from(record)),
        }
    }

    async fn resolve(&mut self, conn: &mut SqliteConnection) -> Result<()> {
        self.amenageurs.resolve(conn).await?;
        self.operateurs.resolve(conn).await?;
        self.enseignes.resolve(conn).await?;
        self.localisations.resolve(conn).await?;
        self.stations.resolve(conn).await?;
        self.pdcs.resolve(conn).await
    }

    /// Links every station to the parents of its records and every charge
    /// point to its station.
    ///
    /// A station shared by several records ends up with the parents of the
    /// last one, and every record's links are rewritten to match.
    fn wire(&mut self, links: &mut [Links]) {
        let mut last = HashMap::new();
        for link in links.iter() {
            let station = &mut self.stations.items[link.station];
            if station.link(
                self.amenageurs.items[link.amenageur].id,
                self.operateurs.items[link.operateur].id,
                self.enseignes.items[link.enseigne].id,
                self.localisations.items[link.localisation].id,
            ) {
                self.stations.statuses[link.station] = self.stations.statuses[link.station].modified();
            }
            let station_id = station.id;
            if self.pdcs.items[link.pdc].attach(station_id) {
                self.pdcs.statuses[link.pdc] = self.pdcs.statuses[link.pdc].modified();
            }
            last.insert(link.station, *link);
        }
        for link in links.iter_mut() {
            if let Some(parents) = last.get(&link.station) {
                link.amenageur = parents.amenageur;
                link.operateur = parents.operateur;
                link.enseigne = parents.enseigne;
                link.localisation = parents.localisation;
            }
        }
    }

    async fn save(&mut self, conn: &mut SqliteConnection, author: Option<Uuid>) -> Result<()> {
        self.amenageurs.save(conn, author).await?;
        self.operateurs.save(conn, author).await?;
        self.enseignes.save(conn, author).await?;
        self.localisations.save(conn, author).await?;
        self.stations.save(conn, author).await?;
        self.pdcs.save(conn, author).await
    }

    fn flatten(&self, links: &Links) -> Statique {
        irve_model::flatten(
            &self.pdcs.items[links.pdc],
            &self.stations.items[links.station],
            &self.amenageurs.items[links.amenageur],
            &self.operateurs.items[links.operateur],
            &self.enseignes.items[links.enseigne],
            &self.localisations.items[links.localisation],
        )
    }
}
