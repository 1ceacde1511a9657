mod choices;
mod coordinate;
mod phone;
mod statique;

pub use self::choices::{AccessibilitePmr, ConditionAcces, ImplantationStation, Raccordement};
pub use self::coordinate::Coordinate;
pub use self::phone::PhoneNumber;
pub use self::statique::Statique;

fn sanitize(s: impl AsRef<str>) -> String {
    s.as_ref().trim().to_lowercase().replace(['-', '_', '\''], "").replace(' ', "")
}

/// Optional free text arrives as `""` as often as it arrives as `null`.
pub(crate) fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = serde::Deserialize::deserialize(deserializer)?;
    Ok(value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }))
}

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");
