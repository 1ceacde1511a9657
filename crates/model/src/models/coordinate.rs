use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use exn::{OptionExt, ResultExt};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, ErrorKind, Result};

const FIELD: &str = "coordonneesXY";

/// A WGS84 point, longitude first.
///
/// On the wire it is the string `"[longitude, latitude]"` (a two-element
/// array is accepted too); in storage it is WKT, `POINT(longitude latitude)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub longitude: f64,
    pub latitude: f64,
}
impl Coordinate {
    pub fn new(longitude: f64, latitude: f64) -> Result<Self> {
        if !(-180.0..=180.0).contains(&longitude) || !(-90.0..=90.0).contains(&latitude) {
            exn::bail!(ErrorKind::invalid(FIELD, format!("[{longitude}, {latitude}]")));
        }
        Ok(Self { longitude, latitude })
    }

    pub fn to_wkt(&self) -> String {
        format!("POINT({} {})", self.longitude, self.latitude)
    }

    pub fn from_wkt(wkt: &str) -> Result<Self> {
        let invalid = || ErrorKind::invalid(FIELD, wkt);
        let trimmed = wkt.trim();
        let trimmed = trimmed.split_once(';').map_or(trimmed, |(_srid, point)| point.trim());
        let inner = trimmed
            .get(..5)
            .filter(|keyword| keyword.eq_ignore_ascii_case("point"))
            .and_then(|_| trimmed[5..].trim().strip_prefix('('))
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_raise(invalid)?;
        let mut parts = inner.split_whitespace();
        let (Some(longitude), Some(latitude), None) = (parts.next(), parts.next(), parts.next()) else {
            exn::bail!(invalid());
        };
        Self::new(parse_degrees(longitude, wkt)?, parse_degrees(latitude, wkt)?)
    }
}
impl FromStr for Coordinate {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        let inner = s
            .trim()
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_raise(|| ErrorKind::invalid(FIELD, s))?;
        let Some((longitude, latitude)) = inner.split_once(',') else {
            exn::bail!(ErrorKind::invalid(FIELD, s));
        };
        Self::new(parse_degrees(longitude, s)?, parse_degrees(latitude, s)?)
    }
}
impl Display for Coordinate {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "[{}, {}]", self.longitude, self.latitude)
    }
}
impl Serialize for Coordinate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
impl<'de> Deserialize<'de> for Coordinate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Pair([f64; 2]),
        }
        let parsed = match Repr::deserialize(deserializer)? {
            Repr::Text(text) => text.parse(),
            Repr::Pair([longitude, latitude]) => Self::new(longitude, latitude),
        };
        parsed.map_err(|err: Error| serde::de::Error::custom(&*err))
    }
}

fn parse_degrees(value: &str, original: &str) -> Result<f64> {
    let parsed = value.trim().parse::<f64>().or_raise(|| ErrorKind::invalid(FIELD, original))?;
    if !parsed.is_finite() {
        exn::bail!(ErrorKind::invalid(FIELD, original));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("[-1.3874, 46.1234]")]
    #[case("[-1.3874,46.1234]")]
    #[case("  [ -1.3874 , 46.1234 ] ")]
    fn test_parse_wire_format(#[case] input: &str) {
        let point: Coordinate = input.parse().unwrap();
        assert_eq!(point, Coordinate { longitude: -1.3874, latitude: 46.1234 });
    }

    #[rstest]
    #[case("POINT(-1.3874 46.1234)")]
    #[case("point ( -1.3874   46.1234 )")]
    #[case("SRID=4326;POINT(-1.3874 46.1234)")]
    fn test_parse_wkt(#[case] input: &str) {
        let point = Coordinate::from_wkt(input).unwrap();
        assert_eq!(point, Coordinate { longitude: -1.3874, latitude: 46.1234 });
    }

    #[test]
    fn test_wkt_is_longitude_first() {
        let point = Coordinate::new(2.35, 48.85).unwrap();
        assert_eq!(point.to_wkt(), "POINT(2.35 48.85)");
        assert_eq!(Coordinate::from_wkt(&point.to_wkt()).unwrap(), point);
    }

    #[rstest]
    #[case("[200.0, 46.0]")]
    #[case("[1.0, 95.0]")]
    #[case("[1.0]")]
    #[case("1.0, 2.0")]
    #[case("[NaN, 2.0]")]
    fn test_rejects_invalid(#[case] input: &str) {
        let err = input.parse::<Coordinate>().unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidField { field: "coordonneesXY", .. }));
    }

    #[test]
    fn test_serde_accepts_string_and_array() {
        let text: Coordinate = serde_json::from_str("\"[2.35, 48.85]\"").unwrap();
        let pair: Coordinate = serde_json::from_str("[2.35, 48.85]").unwrap();
        assert_eq!(text, pair);
        assert_eq!(serde_json::to_string(&text).unwrap(), "\"[2.35, 48.85]\"");
    }
}
