//! Per-kind lookups and writes used by the record-at-a-time normalizers.

use irve_model::entity::{Amenageur, Audit, Enseigne, Localisation, Operateur, PointDeCharge, Station};
use irve_model::entity::{amenageur, enseigne, localisation, operateur, pdc, station};
use sqlx::SqliteConnection;

use super::resolve_operational_unit;
use crate::error::{ErrorKind, Result, SqlxResultExt};
use crate::models::{
    AmenageurRow, EnseigneRow, LocalisationRow, OperateurRow, PointDeChargeRow, StationRow, blank,
};

/// An entity kind the normalizers know how to look up and write.
pub(crate) trait Persist: Sized {
    /// Table name, used in logs and errors.
    const ENTITY: &'static str;

    /// Human-readable uniqueness key.
    fn describe(&self) -> String;

    fn audit_mut(&mut self) -> &mut Audit;

    /// Takes over the non-key fields of `candidate`, returning whether anything changed.
    ///
    /// Kinds whose every field is part of the key have nothing to take over.
    fn absorb(&mut self, _candidate: &Self) -> bool {
        false
    }

    /// Stored rows sharing the uniqueness key of `candidate` (at most two).
    async fn find(conn: &mut SqliteConnection, candidate: &Self) -> Result<Vec<Self>>;

    async fn insert(&mut self, conn: &mut SqliteConnection) -> Result<()>;

    /// Writes back the non-key fields of a stored row.
    ///
    /// Only reachable for kinds whose [`absorb`](Self::absorb) can report a
    /// change; the others are immutable once stored.
    async fn update(&mut self, _conn: &mut SqliteConnection) -> Result<()> {
        exn::bail!(ErrorKind::ProgrammingError(format!("{} rows are never updated", Self::ENTITY)))
    }
}

fn convert<R, T>(rows: Vec<R>) -> Result<Vec<T>>
where
    T: TryFrom<R, Error = crate::error::Error>,
{
    rows.into_iter().map(T::try_from).collect()
}

// =========================================================================
// Amenageur, Operateur, Enseigne: every field is part of the key, so rows
// are never updated
// =========================================================================

impl Persist for Amenageur {
    const ENTITY: &'static str = "amenageur";

    fn describe(&self) -> String {
        format!("{:?}", amenageur::key(self))
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }

    async fn find(conn: &mut SqliteConnection, candidate: &Self) -> Result<Vec<Self>> {
        let (nom, siren, contact) = amenageur::key(candidate);
        let rows: Vec<AmenageurRow> = sqlx::query_as(include_str!("../../queries/select_amenageur_by_key.sql"))
            .bind(blank(nom))
            .bind(blank(siren))
            .bind(blank(contact))
            .fetch_all(&mut *conn)
            .await
            .or_classify()?;
        convert(rows)
    }

    async fn insert(&mut self, conn: &mut SqliteConnection) -> Result<()> {
        let row = AmenageurRow::from(&*self);
        sqlx::query(include_str!("../../queries/insert_amenageur.sql"))
            .bind(row.id)
            .bind(row.nom_amenageur)
            .bind(row.siren_amenageur)
            .bind(row.contact_amenageur)
            .bind(row.created_at)
            .bind(row.updated_at)
            .bind(row.created_by)
            .bind(row.updated_by)
            .execute(&mut *conn)
            .await
            .or_classify()?;
        Ok(())
    }
}

impl Persist for Operateur {
    const ENTITY: &'static str = "operateur";

    fn describe(&self) -> String {
        format!("{:?}", operateur::key(self))
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }

    async fn find(conn: &mut SqliteConnection, candidate: &Self) -> Result<Vec<Self>> {
        let (nom, contact, telephone) = operateur::key(candidate);
        let rows: Vec<OperateurRow> = sqlx::query_as(include_str!("../../queries/select_operateur_by_key.sql"))
            .bind(blank(nom))
            .bind(contact)
            .bind(blank(telephone))
            .fetch_all(&mut *conn)
            .await
            .or_classify()?;
        convert(rows)
    }

    async fn insert(&mut self, conn: &mut SqliteConnection) -> Result<()> {
        let row = OperateurRow::from(&*self);
        sqlx::query(include_str!("../../queries/insert_operateur.sql"))
            .bind(row.id)
            .bind(row.nom_operateur)
            .bind(row.contact_operateur)
            .bind(row.telephone_operateur)
            .bind(row.created_at)
            .bind(row.updated_at)
            .bind(row.created_by)
            .bind(row.updated_by)
            .execute(&mut *conn)
            .await
            .or_classify()?;
        Ok(())
    }
}

impl Persist for Enseigne {
    const ENTITY: &'static str = "enseigne";

    fn describe(&self) -> String {
        format!("{:?}", enseigne::key(self))
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }

    async fn find(conn: &mut SqliteConnection, candidate: &Self) -> Result<Vec<Self>> {
        let rows: Vec<EnseigneRow> = sqlx::query_as(include_str!("../../queries/select_enseigne_by_key.sql"))
            .bind(enseigne::key(candidate))
            .fetch_all(&mut *conn)
            .await
            .or_classify()?;
        convert(rows)
    }

    async fn insert(&mut self, conn: &mut SqliteConnection) -> Result<()> {
        let row = EnseigneRow::from(&*self);
        sqlx::query(include_str!("../../queries/insert_enseigne.sql"))
            .bind(row.id)
            .bind(row.nom_enseigne)
            .bind(row.created_at)
            .bind(row.updated_at)
            .bind(row.created_by)
            .bind(row.updated_by)
            .execute(&mut *conn)
            .await
            .or_classify()?;
        Ok(())
    }
}

// =========================================================================
// Localisation
// =========================================================================

impl Persist for Localisation {
    const ENTITY: &'static str = "localisation";

    fn describe(&self) -> String {
        format!("{:?}", localisation::key(self))
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }

    fn absorb(&mut self, candidate: &Self) -> bool {
        Localisation::absorb(self, candidate)
    }

    async fn find(conn: &mut SqliteConnection, candidate: &Self) -> Result<Vec<Self>> {
        let rows: Vec<LocalisationRow> = sqlx::query_as(include_str!("../../queries/select_localisation_by_key.sql"))
            .bind(localisation::key(candidate))
            .fetch_all(&mut *conn)
            .await
            .or_classify()?;
        convert(rows)
    }

    async fn insert(&mut self, conn: &mut SqliteConnection) -> Result<()> {
        let row = LocalisationRow::from(&*self);
        sqlx::query(include_str!("../../queries/insert_localisation.sql"))
            .bind(row.id)
            .bind(row.adresse_station)
            .bind(row.code_insee_commune)
            .bind(row.coordonnees_xy)
            .bind(row.created_at)
            .bind(row.updated_at)
            .bind(row.created_by)
            .bind(row.updated_by)
            .execute(&mut *conn)
            .await
            .or_classify()?;
        Ok(())
    }

    async fn update(&mut self, conn: &mut SqliteConnection) -> Result<()> {
        let row = LocalisationRow::from(&*self);
        sqlx::query(include_str!("../../queries/update_localisation.sql"))
            .bind(row.code_insee_commune)
            .bind(row.coordonnees_xy)
            .bind(row.updated_at)
            .bind(row.updated_by)
            .bind(row.id)
            .execute(&mut *conn)
            .await
            .or_classify()?;
        Ok(())
    }
}

// =========================================================================
// Station: links its operational unit on every write
// =========================================================================

impl Persist for Station {
    const ENTITY: &'static str = "station";

    fn describe(&self) -> String {
        station::key(self).to_string()
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }

    fn absorb(&mut self, candidate: &Self) -> bool {
        Station::absorb(self, candidate)
    }

    async fn find(conn: &mut SqliteConnection, candidate: &Self) -> Result<Vec<Self>> {
        let rows: Vec<StationRow> = sqlx::query_as(include_str!("../../queries/select_station_by_key.sql"))
            .bind(station::key(candidate))
            .fetch_all(&mut *conn)
            .await
            .or_classify()?;
        convert(rows)
    }

    async fn insert(&mut self, conn: &mut SqliteConnection) -> Result<()> {
        self.operational_unit_id = Some(resolve_operational_unit(conn, &self.id_station_itinerance).await?);
        let row = StationRow::from(&*self);
        sqlx::query(include_str!("../../queries/insert_station.sql"))
            .bind(row.id)
            .bind(row.id_station_itinerance)
            .bind(row.id_station_local)
            .bind(row.nom_station)
            .bind(row.implantation_station)
            .bind(row.nbre_pdc)
            .bind(row.condition_acces)
            .bind(row.horaires)
            .bind(row.station_deux_roues)
            .bind(row.raccordement)
            .bind(row.num_pdl)
            .bind(row.date_maj)
            .bind(row.date_mise_en_service)
            .bind(row.amenageur_id)
            .bind(row.operateur_id)
            .bind(row.enseigne_id)
            .bind(row.localisation_id)
            .bind(row.operational_unit_id)
            .bind(row.created_at)
            .bind(row.updated_at)
            .bind(row.created_by)
            .bind(row.updated_by)
            .execute(&mut *conn)
            .await
            .or_classify()?;
        Ok(())
    }

    async fn update(&mut self, conn: &mut SqliteConnection) -> Result<()> {
        self.operational_unit_id = Some(resolve_operational_unit(conn, &self.id_station_itinerance).await?);
        let row = StationRow::from(&*self);
        sqlx::query(include_str!("../../queries/update_station.sql"))
            .bind(row.id_station_local)
            .bind(row.nom_station)
            .bind(row.implantation_station)
            .bind(row.nbre_pdc)
            .bind(row.condition_acces)
            .bind(row.horaires)
            .bind(row.station_deux_roues)
            .bind(row.raccordement)
            .bind(row.num_pdl)
            .bind(row.date_maj)
            .bind(row.date_mise_en_service)
            .bind(row.amenageur_id)
            .bind(row.operateur_id)
            .bind(row.enseigne_id)
            .bind(row.localisation_id)
            .bind(row.operational_unit_id)
            .bind(row.updated_at)
            .bind(row.updated_by)
            .bind(row.id)
            .execute(&mut *conn)
            .await
            .or_classify()?;
        Ok(())
    }
}

// =========================================================================
// PointDeCharge
// =========================================================================

impl Persist for PointDeCharge {
    const ENTITY: &'static str = "pointdecharge";

    fn describe(&self) -> String {
        pdc::key(self).to_string()
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }

    fn absorb(&mut self, candidate: &Self) -> bool {
        PointDeCharge::absorb(self, candidate)
    }

    async fn find(conn: &mut SqliteConnection, candidate: &Self) -> Result<Vec<Self>> {
        let rows: Vec<PointDeChargeRow> = sqlx::query_as(include_str!("../../queries/select_pdc_by_key.sql"))
            .bind(pdc::key(candidate))
            .fetch_all(&mut *conn)
            .await
            .or_classify()?;
        convert(rows)
    }

    async fn insert(&mut self, conn: &mut SqliteConnection) -> Result<()> {
        let row = PointDeChargeRow::from(&*self);
        sqlx::query(include_str!("../../queries/insert_pdc.sql"))
            .bind(row.id)
            .bind(row.id_pdc_itinerance)
            .bind(row.id_pdc_local)
            .bind(row.puissance_nominale)
            .bind(row.prise_type_ef)
            .bind(row.prise_type_2)
            .bind(row.prise_type_combo_ccs)
            .bind(row.prise_type_chademo)
            .bind(row.prise_type_autre)
            .bind(row.gratuit)
            .bind(row.paiement_acte)
            .bind(row.paiement_cb)
            .bind(row.paiement_autre)
            .bind(row.tarification)
            .bind(row.reservation)
            .bind(row.accessibilite_pmr)
            .bind(row.restriction_gabarit)
            .bind(row.observations)
            .bind(row.cable_t2_attache)
            .bind(row.station_id)
            .bind(row.created_at)
            .bind(row.updated_at)
            .bind(row.created_by)
            .bind(row.updated_by)
            .execute(&mut *conn)
            .await
            .or_classify()?;
        Ok(())
    }

    async fn update(&mut self, conn: &mut SqliteConnection) -> Result<()> {
        let row = PointDeChargeRow::from(&*self);
        sqlx::query(include_str!("../../queries/update_pdc.sql"))
            .bind(row.id_pdc_local)
            .bind(row.puissance_nominale)
            .bind(row.prise_type_ef)
            .bind(row.prise_type_2)
            .bind(row.prise_type_combo_ccs)
            .bind(row.prise_type_chademo)
            .bind(row.prise_type_autre)
            .bind(row.gratuit)
            .bind(row.paiement_acte)
            .bind(row.paiement_cb)
            .bind(row.paiement_autre)
            .bind(row.tarification)
            .bind(row.reservation)
            .bind(row.accessibilite_pmr)
            .bind(row.restriction_gabarit)
            .bind(row.observations)
            .bind(row.cable_t2_attache)
            .bind(row.station_id)
            .bind(row.updated_at)
            .bind(row.updated_by)
            .bind(row.id)
            .execute(&mut *conn)
            .await
            .or_classify()?;
        Ok(())
    }
}
