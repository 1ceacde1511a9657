//! Reading the entity graph back as flat records.

use exn::ResultExt;
use irve_model::Statique;
use irve_model::entity::PointDeCharge;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::error::{ErrorKind, Result, SqlxResultExt};
use crate::models::StatiqueRow;

const SELECT_STATIQUE: &str = include_str!("../queries/select_statique.sql");

/// The flat view of a stored charge point.
pub async fn flatten(pool: &SqlitePool, pdc: &PointDeCharge) -> Result<Statique> {
    get(pool, &pdc.id_pdc_itinerance).await
}

pub(crate) async fn get(pool: &SqlitePool, id_pdc_itinerance: &str) -> Result<Statique> {
    let mut query = QueryBuilder::<Sqlite>::new(SELECT_STATIQUE);
    query.push(" WHERE p.id_pdc_itinerance = ").push_bind(id_pdc_itinerance);
    let row: Option<StatiqueRow> = query.build_query_as().fetch_optional(pool).await.or_classify()?;
    let Some(row) = row else {
        exn::bail!(ErrorKind::ObjectDoesNotExist(format!("pointdecharge {id_pdc_itinerance}")));
    };
    row.try_into()
}

/// One page of flat records ordered by charge point identifier, optionally
/// restricted to stations of the given operational units.
pub(crate) async fn list(
    pool: &SqlitePool,
    offset: u64,
    limit: u32,
    operational_units: &[String],
) -> Result<Vec<Statique>> {
    let offset = i64::try_from(offset).or_raise(|| ErrorKind::InvalidData("offset"))?;
    let mut query = QueryBuilder::<Sqlite>::new(SELECT_STATIQUE);
    if !operational_units.is_empty() {
        query.push(" WHERE ou.code IN (");
        let mut codes = query.separated(", ");
        for code in operational_units {
            codes.push_bind(code.as_str());
        }
        codes.push_unseparated(")");
    }
    query.push(" ORDER BY p.id_pdc_itinerance LIMIT ").push_bind(i64::from(limit));
    query.push(" OFFSET ").push_bind(offset);
    let rows: Vec<StatiqueRow> = query.build_query_as().fetch_all(pool).await.or_classify()?;
    rows.into_iter().map(Statique::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use crate::normalize::normalize_one;
    use crate::testing::{register_fr123, statique};

    async fn seeded(records: impl IntoIterator<Item = Statique>) -> Database {
        let db = Database::connect_in_memory().await.unwrap();
        register_fr123(db.pool()).await;
        for record in records {
            normalize_one(db.pool(), &record, None).await.unwrap();
        }
        db
    }

    #[tokio::test]
    async fn test_get_missing() {
        let db = seeded([]).await;
        let err = get(db.pool(), "FR123P999999").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::ObjectDoesNotExist(_)));
    }

    #[tokio::test]
    async fn test_list_pages_in_identifier_order() {
        let db = seeded([statique(3), statique(1), statique(2)]).await;
        let page = list(db.pool(), 1, 2, &[]).await.unwrap();
        let ids = page.iter().map(|s| s.id_pdc_itinerance.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, ["FR123P000002", "FR123P000003"]);
        assert!(list(db.pool(), 3, 2, &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_filters_on_operational_unit() {
        let mut other = statique(1);
        other.id_station_itinerance = "FR073E000001".to_string();
        other.id_pdc_itinerance = "FR073P000001".to_string();
        other.adresse_station = "2 rue de Lyon 69001 Lyon".to_string();
        let db = seeded([statique(1), other]).await;

        let only = list(db.pool(), 0, 10, &["FR073".to_string()]).await.unwrap();
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].id_pdc_itinerance, "FR073P000001");
        let both = list(db.pool(), 0, 10, &["FR073".to_string(), "FR123".to_string()]).await.unwrap();
        assert_eq!(both.len(), 2);
        assert!(list(db.pool(), 0, 10, &["FR999".to_string()]).await.unwrap().is_empty());
    }
}
