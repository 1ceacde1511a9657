//! Record-at-a-time normalization.

use exn::ResultExt;
use irve_model::Statique;
use irve_model::entity::{Amenageur, Enseigne, Localisation, Operateur, PointDeCharge, Station};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{Persist, check_prefix, get_or_create, save};
use crate::error::{ErrorKind, Result};

/// Normalizes one flat record and commits it in its own transaction.
///
/// Entities already stored under the same uniqueness key are reused as they
/// are; a reused station is re-linked to the parents of this record. Rows
/// written here are attributed to `author`. Fails without writing anything
/// if the charge point and station identifiers have different prefixes, or
/// if the station's operational unit is not registered.
#[instrument(skip_all, fields(id_pdc_itinerance = %record.id_pdc_itinerance))]
pub async fn normalize_one(pool: &SqlitePool, record: &Statique, author: Option<Uuid>) -> Result<PointDeCharge> {
    let mut tx = pool.begin().await.or_raise(|| ErrorKind::Database)?;
    let pdc = normalize_in(&mut tx, record, false, author).await?;
    tx.commit().await.or_raise(|| ErrorKind::Database)?;
    Ok(pdc)
}

/// Applies an explicit update of an already stored charge point.
///
/// Matched entities take over the non-key fields of the record. Fails with
/// [`ErrorKind::ObjectDoesNotExist`] if the charge point is unknown.
#[instrument(skip_all, fields(id_pdc_itinerance = %record.id_pdc_itinerance))]
pub async fn update_one(pool: &SqlitePool, record: &Statique, author: Option<Uuid>) -> Result<PointDeCharge> {
    let mut tx = pool.begin().await.or_raise(|| ErrorKind::Database)?;
    let candidate = PointDeCharge::from(record);
    if PointDeCharge::find(&mut tx, &candidate).await?.is_empty() {
        exn::bail!(ErrorKind::ObjectDoesNotExist(format!("pointdecharge {}", record.id_pdc_itinerance)));
    }
    let pdc = normalize_in(&mut tx, record, true, author).await?;
    tx.commit().await.or_raise(|| ErrorKind::Database)?;
    Ok(pdc)
}

/// One lookup per entity kind, then writes in dependency order.
pub(crate) async fn normalize_in(
    conn: &mut SqliteConnection,
    record: &Statique,
    update: bool,
    author: Option<Uuid>,
) -> Result<PointDeCharge> {
    check_prefix(record)?;
    let (pdc_status, mut pdc) = get_or_create(conn, PointDeCharge::from(record), update).await?;
    let (mut station_status, mut station) = get_or_create(conn, Station::from(record), update).await?;
    let (amenageur_status, mut amenageur) = get_or_create(conn, Amenageur::from(record), update).await?;
    let (operateur_status, mut operateur) = get_or_create(conn, Operateur::from(record), update).await?;
    let (enseigne_status, mut enseigne) = get_or_create(conn, Enseigne::from(record), update).await?;
    let (localisation_status, mut localisation) = get_or_create(conn, Localisation::from(record), update).await?;

    save(conn, amenageur_status, &mut amenageur, author).await?;
    save(conn, operateur_status, &mut operateur, author).await?;
    save(conn, enseigne_status, &mut enseigne, author).await?;
    save(conn, localisation_status, &mut localisation, author).await?;
    if station.link(amenageur.id, operateur.id, enseigne.id, localisation.id) {
        station_status = station_status.modified();
    }
    save(conn, station_status, &mut station, author).await?;
    let pdc_status = if pdc.attach(station.id) { pdc_status.modified() } else { pdc_status };
    save(conn, pdc_status, &mut pdc, author).await?;

    debug!(
        pointdecharge = %pdc_status,
        station = %station_status,
        amenageur = %amenageur_status,
        operateur = %operateur_status,
        enseigne = %enseigne_status,
        localisation = %localisation_status,
        "normalized record"
    );
    Ok(pdc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use crate::testing::{count, register_fr123, statique};

    #[tokio::test]
    async fn test_concrete_scenario() {
        let db = Database::connect_in_memory().await.unwrap();
        register_fr123(db.pool()).await;
        let mut record = statique(1);
        record.id_pdc_itinerance = "FR123E000001".to_string();
        record.id_station_itinerance = "FR123P000001".to_string();

        let first = normalize_one(db.pool(), &record, None).await.unwrap();
        assert_eq!(first.id_pdc_itinerance, "FR123E000001");
        let flat = crate::flatten::flatten(db.pool(), &first).await.unwrap();
        assert_eq!(flat.id_pdc_itinerance, record.id_pdc_itinerance);

        let second = normalize_one(db.pool(), &record, None).await.unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(count(db.pool(), "amenageur").await, 1);
    }

    #[tokio::test]
    async fn test_replay_creates_nothing_new() {
        let db = Database::connect_in_memory().await.unwrap();
        register_fr123(db.pool()).await;
        let record = statique(1);
        let first = normalize_one(db.pool(), &record, None).await.unwrap();
        let second = normalize_one(db.pool(), &record, None).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.station_id, second.station_id);
        for table in ["amenageur", "operateur", "enseigne", "localisation", "station", "pointdecharge"] {
            assert_eq!(count(db.pool(), table).await, 1, "{table}");
        }
    }

    #[tokio::test]
    async fn test_round_trip() {
        let db = Database::connect_in_memory().await.unwrap();
        register_fr123(db.pool()).await;
        let mut record = statique(1);
        record.nom_amenageur = None;
        record.telephone_operateur = None;
        record.raccordement = None;
        record.date_mise_en_service = None;
        let pdc = normalize_one(db.pool(), &record, None).await.unwrap();
        let flat = crate::flatten::flatten(db.pool(), &pdc).await.unwrap();
        assert_eq!(flat, record);
    }

    #[tokio::test]
    async fn test_unregistered_prefix_persists_nothing() {
        let db = Database::connect_in_memory().await.unwrap();
        let err = normalize_one(db.pool(), &statique(1), None).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::ObjectDoesNotExist(_)));
        for table in ["amenageur", "operateur", "enseigne", "localisation", "station", "pointdecharge"] {
            assert_eq!(count(db.pool(), table).await, 0, "{table}");
        }
    }

    #[tokio::test]
    async fn test_reuse_keeps_non_key_fields() {
        let db = Database::connect_in_memory().await.unwrap();
        register_fr123(db.pool()).await;
        let record = statique(1);
        let pdc = normalize_one(db.pool(), &record, None).await.unwrap();
        let mut changed = record.clone();
        changed.puissance_nominale = 150.0;
        changed.nom_station = "Autre nom".to_string();
        normalize_one(db.pool(), &changed, None).await.unwrap();
        let flat = crate::flatten::flatten(db.pool(), &pdc).await.unwrap();
        assert_eq!(flat.puissance_nominale, 22.0);
        assert_eq!(flat.nom_station, record.nom_station);
    }

    #[tokio::test]
    async fn test_station_is_relinked_to_submitted_parents() {
        let db = Database::connect_in_memory().await.unwrap();
        register_fr123(db.pool()).await;
        let pdc = normalize_one(db.pool(), &statique(1), None).await.unwrap();
        let mut rebranded = statique(1);
        rebranded.nom_enseigne = "Nouvelle Enseigne".to_string();
        normalize_one(db.pool(), &rebranded, None).await.unwrap();
        let flat = crate::flatten::flatten(db.pool(), &pdc).await.unwrap();
        assert_eq!(flat.nom_enseigne, "Nouvelle Enseigne");
        assert_eq!(count(db.pool(), "enseigne").await, 2);
    }

    #[tokio::test]
    async fn test_update_overwrites_non_key_fields() {
        let db = Database::connect_in_memory().await.unwrap();
        register_fr123(db.pool()).await;
        let created = normalize_one(db.pool(), &statique(1), None).await.unwrap();
        let mut changed = statique(1);
        changed.puissance_nominale = 150.0;
        changed.nbre_pdc = 4;
        changed.coordonnees_xy = irve_model::models::Coordinate::new(2.4, 48.9).unwrap();
        let updated = update_one(db.pool(), &changed, None).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert!(updated.audit.created_at <= updated.audit.updated_at);
        let flat = crate::flatten::flatten(db.pool(), &updated).await.unwrap();
        assert_eq!(flat, changed);
    }

    #[tokio::test]
    async fn test_update_of_unknown_pdc() {
        let db = Database::connect_in_memory().await.unwrap();
        register_fr123(db.pool()).await;
        let err = update_one(db.pool(), &statique(1), None).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::ObjectDoesNotExist(_)));
        assert_eq!(count(db.pool(), "pointdecharge").await, 0);
    }

    #[tokio::test]
    async fn test_ambiguous_match_is_fatal() {
        let db = Database::connect_in_memory().await.unwrap();
        register_fr123(db.pool()).await;
        // Only a corrupt store can hold two rows for one key.
        sqlx::query("PRAGMA foreign_keys = OFF").execute(db.pool()).await.unwrap();
        sqlx::query("CREATE TABLE enseigne_copy AS SELECT * FROM enseigne").execute(db.pool()).await.unwrap();
        sqlx::query("DROP TABLE enseigne").execute(db.pool()).await.unwrap();
        sqlx::query("ALTER TABLE enseigne_copy RENAME TO enseigne").execute(db.pool()).await.unwrap();
        for id in ["00000000-0000-4000-8000-000000000001", "00000000-0000-4000-8000-000000000002"] {
            sqlx::query("INSERT INTO enseigne (id, nom_enseigne, created_at, updated_at) VALUES (?, 'Recharge Express', 0, 0)")
                .bind(id)
                .execute(db.pool())
                .await
                .unwrap();
        }
        let err = normalize_one(db.pool(), &statique(1), None).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::AmbiguousMatch { entity: "enseigne", .. }));
        assert_eq!(count(db.pool(), "pointdecharge").await, 0);
    }

    #[tokio::test]
    async fn test_mismatched_prefix_persists_nothing() {
        let db = Database::connect_in_memory().await.unwrap();
        register_fr123(db.pool()).await;
        let mut record = statique(1);
        record.id_pdc_itinerance = "FR999P000001".to_string();
        let err = normalize_one(db.pool(), &record, None).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::IntegrityError(message) if message.contains("FR999P000001")));
        for table in ["amenageur", "operateur", "enseigne", "localisation", "station", "pointdecharge"] {
            assert_eq!(count(db.pool(), table).await, 0, "{table}");
        }

        normalize_one(db.pool(), &statique(1), None).await.unwrap();
        let mut moved = statique(1);
        moved.id_station_itinerance = "FR999E000001".to_string();
        let err = update_one(db.pool(), &moved, None).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::IntegrityError(_)));
        assert_eq!(count(db.pool(), "station").await, 1);
    }

    #[tokio::test]
    async fn test_absent_optional_key_fields_are_equal() {
        let db = Database::connect_in_memory().await.unwrap();
        register_fr123(db.pool()).await;
        for n in 1..=2 {
            let mut record = statique(n);
            record.nom_amenageur = None;
            record.siren_amenageur = None;
            record.telephone_operateur = None;
            normalize_one(db.pool(), &record, None).await.unwrap();
        }
        assert_eq!(count(db.pool(), "amenageur").await, 1);
        assert_eq!(count(db.pool(), "operateur").await, 1);
        assert_eq!(count(db.pool(), "pointdecharge").await, 2);
    }

    #[tokio::test]
    async fn test_phone_formats_share_one_operateur() {
        let db = Database::connect_in_memory().await.unwrap();
        register_fr123(db.pool()).await;
        let mut national = statique(1);
        national.telephone_operateur = Some("01 44 27 63 50".parse().unwrap());
        let mut international = statique(2);
        international.telephone_operateur = Some("+33 1 44 27 63 50".parse().unwrap());
        normalize_one(db.pool(), &national, None).await.unwrap();
        normalize_one(db.pool(), &international, None).await.unwrap();
        assert_eq!(count(db.pool(), "operateur").await, 1);
    }

    #[tokio::test]
    async fn test_writes_are_attributed_to_their_author() {
        let db = Database::connect_in_memory().await.unwrap();
        register_fr123(db.pool()).await;
        let creator = Uuid::new_v4();
        let editor = Uuid::new_v4();
        let created = normalize_one(db.pool(), &statique(1), Some(creator)).await.unwrap();
        assert_eq!((created.audit.created_by, created.audit.updated_by), (Some(creator), Some(creator)));
        let enseigne: (Option<String>, Option<String>) =
            sqlx::query_as("SELECT created_by, updated_by FROM enseigne").fetch_one(db.pool()).await.unwrap();
        assert_eq!(enseigne, (Some(creator.to_string()), Some(creator.to_string())));

        // Reusing rows unchanged leaves their attribution alone.
        normalize_one(db.pool(), &statique(1), Some(editor)).await.unwrap();
        let station: (Option<String>, Option<String>) =
            sqlx::query_as("SELECT created_by, updated_by FROM station").fetch_one(db.pool()).await.unwrap();
        assert_eq!(station, (Some(creator.to_string()), Some(creator.to_string())));

        let mut changed = statique(1);
        changed.puissance_nominale = 150.0;
        let updated = update_one(db.pool(), &changed, Some(editor)).await.unwrap();
        assert_eq!((updated.audit.created_by, updated.audit.updated_by), (Some(creator), Some(editor)));
        let pdc: (Option<String>, Option<String>) =
            sqlx::query_as("SELECT created_by, updated_by FROM pointdecharge").fetch_one(db.pool()).await.unwrap();
        assert_eq!(pdc, (Some(creator.to_string()), Some(editor.to_string())));
    }
}
