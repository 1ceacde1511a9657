use regex::Regex;
use std::sync::LazyLock;

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

regex!(SIREN_REGEX, r"^\d{9}$");
regex!(EMAIL_REGEX, r"^[^@\s]+@[^@\s]+\.[^@\s]+$");
regex!(ID_ITINERANCE_REGEX, r"^[A-Z]{2}[A-Z0-9]{4,33}$");
regex!(OPERATIONAL_UNIT_CODE_REGEX, r"^[A-Z]{2}[A-Z0-9]{3}$");
regex!(CODE_INSEE_REGEX, r"^([013-9]\d|2[AB1-9])\d{3}$");
regex!(HORAIRES_REGEX, r"(.*?)((\d{1,2}:\d{2})-(\d{1,2}:\d{2})|24/7)");

/// Longest accepted PDL (point de livraison) identifier.
pub(crate) const NUM_PDL_MAX_LENGTH: usize = 64;
