//! Normalized entities.
//!
//! A [`Statique`](crate::models::Statique) record projects onto one entity of
//! each kind. Every kind defines a uniqueness key, the subset of fields that
//! decides whether two records describe the same real-world thing, exposed as
//! a free `key` function next to an `equals` comparator.

pub mod amenageur;
pub mod enseigne;
pub mod localisation;
pub mod operateur;
pub mod operational_unit;
pub mod pdc;
pub mod station;

use time::UtcDateTime;
use uuid::Uuid;

pub use self::amenageur::Amenageur;
pub use self::enseigne::Enseigne;
pub use self::localisation::Localisation;
pub use self::operateur::Operateur;
pub use self::operational_unit::{OperationalUnit, OperationalUnitKind};
pub use self::pdc::PointDeCharge;
pub use self::station::Station;

/// Length of an operational unit code, e.g. `FR123`.
pub const OPERATIONAL_UNIT_CODE_LENGTH: usize = 5;

/// The operational unit code an itinerance identifier was issued under.
///
/// Returns `None` for identifiers shorter than a code.
pub fn operational_unit_code(id_itinerance: &str) -> Option<&str> {
    id_itinerance.get(..OPERATIONAL_UNIT_CODE_LENGTH)
}

/// Creation and last-modification stamps shared by every entity.
///
/// Authors are opaque identifiers chosen by the caller. `None` marks an
/// unattributed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Audit {
    pub created_at: UtcDateTime,
    pub updated_at: UtcDateTime,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
}
impl Audit {
    pub fn now() -> Self {
        let now = UtcDateTime::now();
        Self { created_at: now, updated_at: now, created_by: None, updated_by: None }
    }

    pub fn touch(&mut self) {
        self.updated_at = UtcDateTime::now().max(self.created_at);
    }

    /// Attributes a new entity to `author`.
    pub fn created(&mut self, author: Option<Uuid>) {
        self.created_by = author;
        self.updated_by = author;
    }

    /// Attributes the latest modification to `author`.
    pub fn updated(&mut self, author: Option<Uuid>) {
        self.touch();
        self.updated_by = author;
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("FR123E000001", Some("FR123"))]
    #[case("FR123P000001", Some("FR123"))]
    #[case("FRS63E0001", Some("FRS63"))]
    #[case("FR1", None)]
    fn test_operational_unit_code(#[case] id: &str, #[case] expected: Option<&str>) {
        assert_eq!(operational_unit_code(id), expected);
    }

    #[test]
    fn test_touch_never_precedes_creation() {
        let mut stamps = Audit::now();
        stamps.touch();
        assert!(stamps.created_at <= stamps.updated_at);
    }

    #[test]
    fn test_update_keeps_the_creator() {
        let creator = Uuid::new_v4();
        let editor = Uuid::new_v4();
        let mut stamps = Audit::now();
        stamps.created(Some(creator));
        assert_eq!((stamps.created_by, stamps.updated_by), (Some(creator), Some(creator)));
        stamps.updated(Some(editor));
        assert_eq!((stamps.created_by, stamps.updated_by), (Some(creator), Some(editor)));
        stamps.updated(None);
        assert_eq!(stamps.updated_by, None);
    }
}
