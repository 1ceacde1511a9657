use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

/// Administrative tool for the IRVE static registry.
#[derive(Debug, Parser)]
#[command(name = "irve", version, about)]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database file, overriding the configured one
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// Identifier recorded as the author of every write
    #[arg(long, global = true, value_name = "UUID")]
    pub author: Option<Uuid>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Bulk import a JSON array or JSON Lines file, all or nothing
    Import { file: PathBuf },

    /// Create records: one goes through the single path, more through one batch
    Create { file: PathBuf },

    /// Update a stored charge point from a file holding its record
    Update { id_pdc_itinerance: String, file: PathBuf },

    /// Print one flat record as JSON
    Get { id_pdc_itinerance: String },

    /// Print a page of flat records as a JSON array
    List {
        #[arg(long, default_value_t = 0)]
        offset: u64,

        #[arg(long, default_value_t = 50)]
        limit: u32,

        /// Only list records of this operational unit (repeatable)
        #[arg(long = "operational-unit", value_name = "CODE")]
        operational_units: Vec<String>,
    },

    /// Print every flat record as JSON Lines
    Export {
        #[arg(long, default_value_t = 1000)]
        page_size: u32,
    },

    /// Manage operational units
    #[command(subcommand)]
    Ou(OuCommand),
}

#[derive(Debug, Subcommand)]
pub enum OuCommand {
    /// List registered operational units
    List {
        /// SQL LIKE pattern matched against code or name
        #[arg(long)]
        pattern: Option<String>,
    },

    /// Register or rename an operational unit
    Add { code: String, name: String },
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_list_arguments() {
        let cli = Cli::try_parse_from([
            "irve",
            "--database",
            "/tmp/irve.sqlite3",
            "list",
            "--limit",
            "10",
            "--operational-unit",
            "FR073",
            "--operational-unit",
            "FR123",
        ])
        .unwrap();
        assert_eq!(cli.database, Some(PathBuf::from("/tmp/irve.sqlite3")));
        let Command::List { offset, limit, operational_units } = cli.command else {
            panic!("expected list");
        };
        assert_eq!(offset, 0);
        assert_eq!(limit, 10);
        assert_eq!(operational_units, ["FR073", "FR123"]);
    }

    #[test]
    fn test_ou_add() {
        let cli = Cli::try_parse_from(["irve", "ou", "add", "FR123", "Recharge"]).unwrap();
        assert!(matches!(cli.command, Command::Ou(OuCommand::Add { code, .. }) if code == "FR123"));
    }

    #[test]
    fn test_author_is_a_uuid() {
        let cli = Cli::try_parse_from(["irve", "create", "records.json", "--author", "67e55044-10b1-426f-9247-bb680e5fe0c8"])
            .unwrap();
        assert_eq!(cli.author, Some(Uuid::from_u128(0x67e55044_10b1_426f_9247_bb680e5fe0c8)));
        assert!(Cli::try_parse_from(["irve", "--author", "someone", "create", "records.json"]).is_err());
    }
}
