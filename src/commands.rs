//! Subcommand handlers.
//!
//! Records are printed as JSON on stdout; logs go to stderr.

use exn::ResultExt;
use futures::TryStreamExt;
use irve_config::Config;
use irve_model::Statique;
use irve_store::Repository;
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

use crate::cli::{Command, OuCommand};
use crate::error::{ErrorKind, Result};
use crate::input::read_records;

pub async fn run(repo: &Repository, config: &Config, command: Command) -> Result<()> {
    match command {
        Command::Import { file } => import(repo, &file).await,
        Command::Create { file } => create(repo, config, &file).await,
        Command::Update { id_pdc_itinerance, file } => update(repo, &id_pdc_itinerance, &file).await,
        Command::Get { id_pdc_itinerance } => {
            let record = repo.get(&id_pdc_itinerance).await.or_raise(|| ErrorKind::Store)?;
            print_json(&record)
        },
        Command::List { offset, limit, operational_units } => {
            let records = repo.list(offset, limit, &operational_units).await.or_raise(|| ErrorKind::Store)?;
            print_json(&records)
        },
        Command::Export { page_size } => export(repo, page_size).await,
        Command::Ou(OuCommand::List { pattern }) => {
            let units = repo.operational_units(pattern.as_deref()).await.or_raise(|| ErrorKind::Store)?;
            let mut out = BufWriter::new(std::io::stdout().lock());
            for unit in units {
                writeln!(out, "{}\t{}\t{}", unit.code, unit.kind, unit.name).or_raise(|| ErrorKind::Output)?;
            }
            out.flush().or_raise(|| ErrorKind::Output)
        },
        Command::Ou(OuCommand::Add { code, name }) => {
            let unit = repo.register_operational_unit(&code, &name).await.or_raise(|| ErrorKind::Store)?;
            info!(code = %unit.code, name = %unit.name, "operational unit registered");
            Ok(())
        },
    }
}

async fn import(repo: &Repository, file: &Path) -> Result<()> {
    let records = read_records(file).await?;
    match repo.import(records).await {
        Ok(summary) => {
            for stage in &summary.stages {
                info!(stage = %stage.stage, rows = stage.rows, statements = stage.statements, "stage saved");
            }
            info!(records = summary.records, "import complete");
            Ok(())
        },
        Err(err) => {
            warn!("import rolled back, no rows were persisted");
            Err(err).or_raise(|| ErrorKind::Store)
        },
    }
}

async fn create(repo: &Repository, config: &Config, file: &Path) -> Result<()> {
    let records = read_records(file).await?;
    let created = create_records(repo, config, file, &records).await?;
    info!(records = created.len(), "records created");
    print_json(&created)
}

/// Creates every record of a file in one transaction, or none of them.
///
/// Files larger than `import.batch_max_size` are refused; `import` is the
/// path for whole datasets.
async fn create_records(repo: &Repository, config: &Config, file: &Path, records: &[Statique]) -> Result<Vec<Statique>> {
    match records {
        [record] => Ok(vec![repo.create(record).await.or_raise(|| ErrorKind::Store)?]),
        records if records.len() > config.import.batch_max_size => exn::bail!(ErrorKind::Input {
            path: file.to_path_buf(),
            reason: format!(
                "{} records exceed import.batch_max_size ({}); use `irve import` instead",
                records.len(),
                config.import.batch_max_size
            ),
        }),
        records => repo.create_many(records).await.or_raise(|| ErrorKind::Store),
    }
}

async fn update(repo: &Repository, id_pdc_itinerance: &str, file: &Path) -> Result<()> {
    let records = read_records(file).await?;
    let [record] = records.as_slice() else {
        exn::bail!(ErrorKind::Input {
            path: file.to_path_buf(),
            reason: format!("expected exactly one record, found {}", records.len()),
        });
    };
    let updated = repo.update(id_pdc_itinerance, record).await.or_raise(|| ErrorKind::Store)?;
    print_json(&updated)
}

async fn export(repo: &Repository, page_size: u32) -> Result<()> {
    let mut out = BufWriter::new(std::io::stdout());
    let mut records = std::pin::pin!(repo.stream(page_size));
    let mut exported = 0_u64;
    while let Some(record) = records.try_next().await.or_raise(|| ErrorKind::Store)? {
        write_line(&mut out, &record)?;
        exported += 1;
    }
    out.flush().or_raise(|| ErrorKind::Output)?;
    info!(exported, "export complete");
    Ok(())
}

fn write_line(out: &mut impl Write, record: &Statique) -> Result<()> {
    serde_json::to_writer(&mut *out, record).or_raise(|| ErrorKind::Output)?;
    out.write_all(b"\n").or_raise(|| ErrorKind::Output)
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value).or_raise(|| ErrorKind::Output)?;
    writeln!(out).or_raise(|| ErrorKind::Output)
}

#[cfg(test)]
mod tests {
    use irve_model::testing::statique;
    use irve_store::Database;
    use std::path::PathBuf;

    use super::*;

    async fn repository() -> (Database, Repository) {
        let db = Database::connect_in_memory().await.unwrap();
        let repo = Repository::from(&db);
        repo.register_operational_unit("FR123", "Recharge Test").await.unwrap();
        (db, repo)
    }

    fn config(batch_max_size: usize) -> Config {
        let mut config = Config::default();
        config.import.batch_max_size = batch_max_size;
        config
    }

    #[tokio::test]
    async fn test_create_refuses_files_larger_than_one_batch() {
        let (_db, repo) = repository().await;
        let records = (1..=3).map(statique).collect::<Vec<_>>();
        let file = PathBuf::from("records.json");
        let err = create_records(&repo, &config(2), &file, &records).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Input { reason, .. } if reason.contains("batch_max_size")));
        assert_eq!(repo.count().await.unwrap(), 0);

        let created = create_records(&repo, &config(3), &file, &records).await.unwrap();
        assert_eq!(created, records);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicates_across_the_whole_file() {
        let (_db, repo) = repository().await;
        let records = vec![statique(1), statique(2), statique(3), statique(1)];
        let file = PathBuf::from("records.json");
        let err = create_records(&repo, &config(10), &file, &records).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Store));
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
