//! CLI Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("could not read {}", _0.display())]
    Read(#[error(not(source))] PathBuf),
    /// The input file is not a JSON array, a JSON object or JSON Lines.
    #[display("invalid input in {}: {reason}", path.display())]
    Input { path: PathBuf, reason: String },
    #[display("store operation failed")]
    Store,
    #[display("could not write output")]
    Output,
}
