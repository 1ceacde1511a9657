//! Operational units, the registered issuers of itinerance identifiers.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use uuid::Uuid;

use super::Audit;
use crate::consts::OPERATIONAL_UNIT_CODE_REGEX;
use crate::error::{Error, ErrorKind, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationalUnitKind {
    /// Issues identifiers for charging infrastructure.
    Charging,
    Mobility,
}
impl OperationalUnitKind {
    pub fn as_i64(&self) -> i64 {
        match self {
            Self::Charging => 1,
            Self::Mobility => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Charging => "charging",
            Self::Mobility => "mobility",
        }
    }
}
impl TryFrom<i64> for OperationalUnitKind {
    type Error = Error;
    fn try_from(value: i64) -> Result<Self> {
        Ok(match value {
            1 => Self::Charging,
            2 => Self::Mobility,
            _ => exn::bail!(ErrorKind::invalid("type", value)),
        })
    }
}
impl FromStr for OperationalUnitKind {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.trim().to_lowercase().as_str() {
            "1" | "charging" => Self::Charging,
            "2" | "mobility" => Self::Mobility,
            _ => exn::bail!(ErrorKind::invalid("type", s)),
        })
    }
}
impl Display for OperationalUnitKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperationalUnit {
    pub id: Uuid,
    /// Five characters: two letters followed by three alphanumerics.
    pub code: String,
    pub name: String,
    pub kind: OperationalUnitKind,
    pub audit: Audit,
}
impl OperationalUnit {
    pub fn new(code: impl Into<String>, name: impl Into<String>, kind: OperationalUnitKind) -> Result<Self> {
        let code = code.into();
        if !OPERATIONAL_UNIT_CODE_REGEX.is_match(&code) {
            exn::bail!(ErrorKind::invalid("code", code));
        }
        let name = name.into();
        if name.trim().is_empty() {
            exn::bail!(ErrorKind::invalid("name", "empty value"));
        }
        Ok(Self { id: Uuid::new_v4(), code, name, kind, audit: Audit::now() })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("FR123")]
    #[case("FRS63")]
    #[case("DEABC")]
    fn test_valid_codes(#[case] code: &str) {
        let unit = OperationalUnit::new(code, "Réseau", OperationalUnitKind::Charging).unwrap();
        assert_eq!(unit.code, code);
    }

    #[rstest]
    #[case("FR12")]
    #[case("FR1234")]
    #[case("fr123")]
    #[case("1R123")]
    fn test_invalid_codes(#[case] code: &str) {
        let err = OperationalUnit::new(code, "Réseau", OperationalUnitKind::Charging).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidField { field: "code", .. }));
    }

    #[test]
    fn test_kind_codes() {
        assert_eq!(OperationalUnitKind::try_from(1).unwrap(), OperationalUnitKind::Charging);
        assert_eq!(OperationalUnitKind::Mobility.as_i64(), 2);
        assert!(OperationalUnitKind::try_from(3).is_err());
        assert_eq!("mobility".parse::<OperationalUnitKind>().unwrap(), OperationalUnitKind::Mobility);
    }
}
