use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, ErrorKind};

const DEFAULT_COUNTRY_CODE: &str = "33";

/// A telephone number normalized to E.164 (`+33144276350`).
///
/// National French numbers (`01 44 27 63 50`) are accepted and rewritten using
/// the `+33` country code; international numbers keep their own.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);
impl PhoneNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl FromStr for PhoneNumber {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ErrorKind::invalid("telephone_operateur", s);
        let trimmed = s.trim();
        let international = trimmed.starts_with('+') || trimmed.starts_with("00");
        // "+33 (0)1 ..." carries a trunk prefix that must not reach the subscriber number.
        let trimmed = if international { trimmed.replace("(0)", "") } else { trimmed.to_string() };
        let mut digits = String::with_capacity(trimmed.len());
        for (position, c) in trimmed.chars().enumerate() {
            match c {
                '0'..='9' => digits.push(c),
                '+' if position == 0 => {},
                ' ' | '.' | '-' | '(' | ')' | '/' => {},
                _ => exn::bail!(invalid()),
            }
        }
        let normalized = if trimmed.starts_with('+') {
            digits
        } else if let Some(rest) = digits.strip_prefix("00") {
            rest.to_string()
        } else if let Some(rest) = digits.strip_prefix('0')
            && rest.len() == 9
        {
            format!("{DEFAULT_COUNTRY_CODE}{rest}")
        } else {
            exn::bail!(invalid());
        };
        if !(8..=15).contains(&normalized.len()) || normalized.starts_with('0') {
            exn::bail!(invalid());
        }
        if let Some(subscriber) = normalized.strip_prefix(DEFAULT_COUNTRY_CODE)
            && (subscriber.len() != 9 || subscriber.starts_with('0'))
        {
            exn::bail!(invalid());
        }
        Ok(Self(format!("+{normalized}")))
    }
}
impl TryFrom<String> for PhoneNumber {
    type Error = Error;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.as_str().parse()
    }
}
impl Display for PhoneNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}
impl Serialize for PhoneNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
impl<'de> Deserialize<'de> for PhoneNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(|err: Error| serde::de::Error::custom(&*err))
    }
}

/// Blank phone numbers are treated as absent.
pub(crate) fn optional_phone<'de, D>(deserializer: D) -> Result<Option<PhoneNumber>, D::Error>
where
    D: Deserializer<'de>,
{
    match super::blank_as_none(deserializer)? {
        Some(value) => value.parse().map(Some).map_err(|err: Error| serde::de::Error::custom(&*err)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("+33144276350")]
    #[case("+33 1 44 27 63 50")]
    #[case("+33 (0)1 44 27 63 50")]
    #[case("+33 (0)144276350")]
    #[case("+33 (0)1 44 27-63-50")]
    #[case("+33 (0)1-44-27-63-50")]
    #[case("(01) 44 27 63 50")]
    #[case("01 44 27 63 50")]
    #[case("01.44.27.63.50")]
    #[case("0144276350")]
    #[case("0033144276350")]
    fn test_french_numbers_normalize(#[case] input: &str) {
        assert_eq!(input.parse::<PhoneNumber>().unwrap().as_str(), "+33144276350");
    }

    #[test]
    fn test_foreign_number_keeps_country_code() {
        assert_eq!("+49 30 1234567".parse::<PhoneNumber>().unwrap().as_str(), "+49301234567");
    }

    #[rstest]
    #[case("")]
    #[case("not a number")]
    #[case("144276350")]
    #[case("+33 0 44 27 63 50")]
    #[case("01 44 27 63")]
    fn test_invalid_numbers(#[case] input: &str) {
        let err = input.parse::<PhoneNumber>().unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidField { field: "telephone_operateur", .. }));
    }
}
