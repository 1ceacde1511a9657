use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use super::sanitize;
use crate::error::{Error, ErrorKind};

/// Where the station is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImplantationStation {
    #[serde(rename = "Voirie")]
    Voirie,
    #[serde(rename = "Parking public")]
    ParkingPublic,
    #[serde(rename = "Parking privé à usage public")]
    ParkingPriveUsagePublic,
    #[serde(rename = "Parking privé réservé à la clientèle")]
    ParkingPriveClientele,
    #[serde(rename = "Station dédiée à la recharge rapide")]
    StationRechargeRapide,
}
impl ImplantationStation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Voirie => "Voirie",
            Self::ParkingPublic => "Parking public",
            Self::ParkingPriveUsagePublic => "Parking privé à usage public",
            Self::ParkingPriveClientele => "Parking privé réservé à la clientèle",
            Self::StationRechargeRapide => "Station dédiée à la recharge rapide",
        }
    }
}
impl FromStr for ImplantationStation {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match sanitize(s).as_str() {
            "voirie" => Self::Voirie,
            "parkingpublic" => Self::ParkingPublic,
            "parkingprivéàusagepublic" => Self::ParkingPriveUsagePublic,
            "parkingprivéréservéàlaclientèle" => Self::ParkingPriveClientele,
            "stationdédiéeàlarechargerapide" => Self::StationRechargeRapide,
            _ => exn::bail!(ErrorKind::invalid("implantation_station", s)),
        })
    }
}
impl Display for ImplantationStation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// Who may access the station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionAcces {
    #[serde(rename = "Accès libre")]
    AccesLibre,
    #[serde(rename = "Accès réservé")]
    AccesReserve,
}
impl ConditionAcces {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccesLibre => "Accès libre",
            Self::AccesReserve => "Accès réservé",
        }
    }
}
impl FromStr for ConditionAcces {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match sanitize(s).as_str() {
            "accèslibre" => Self::AccesLibre,
            "accèsréservé" => Self::AccesReserve,
            _ => exn::bail!(ErrorKind::invalid("condition_acces", s)),
        })
    }
}
impl Display for ConditionAcces {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// Accessibility of a charge point for people with reduced mobility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessibilitePmr {
    #[serde(rename = "Réservé PMR")]
    ReservePmr,
    #[serde(rename = "Accessible mais non réservé PMR")]
    NonReserve,
    #[serde(rename = "Non accessible")]
    NonAccessible,
    #[serde(rename = "Accessibilité inconnue")]
    Inconnue,
}
impl AccessibilitePmr {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReservePmr => "Réservé PMR",
            Self::NonReserve => "Accessible mais non réservé PMR",
            Self::NonAccessible => "Non accessible",
            Self::Inconnue => "Accessibilité inconnue",
        }
    }
}
impl FromStr for AccessibilitePmr {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match sanitize(s).as_str() {
            "réservépmr" => Self::ReservePmr,
            "accessiblemaisnonréservépmr" => Self::NonReserve,
            "nonaccessible" => Self::NonAccessible,
            "accessibilitéinconnue" => Self::Inconnue,
            _ => exn::bail!(ErrorKind::invalid("accessibilite_pmr", s)),
        })
    }
}
impl Display for AccessibilitePmr {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// How the station is connected to the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Raccordement {
    Direct,
    Indirect,
}
impl Raccordement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "Direct",
            Self::Indirect => "Indirect",
        }
    }
}
impl FromStr for Raccordement {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match sanitize(s).as_str() {
            "direct" => Self::Direct,
            "indirect" => Self::Indirect,
            _ => exn::bail!(ErrorKind::invalid("raccordement", s)),
        })
    }
}
impl Display for Raccordement {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}
