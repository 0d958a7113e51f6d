use serde::{Deserialize, Serialize};

use crate::error::ProjectionError;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectionKind {
    LinearCylindrical,
    CylindricalEqualArea,
    Mercator,
    Orthographic,
    AzimuthalEquidistant,
    AzimuthalEqualArea,
    Polar,
    /// Flat UTM display: plate carree with the UTM cell grid.
    Utm,
    /// True ellipsoidal transverse Mercator inside one active UTM cell.
    UtmNear,
}

impl ProjectionKind {
    pub const ALL: [ProjectionKind; 9] = [
        ProjectionKind::LinearCylindrical,
        ProjectionKind::CylindricalEqualArea,
        ProjectionKind::Mercator,
        ProjectionKind::Orthographic,
        ProjectionKind::AzimuthalEquidistant,
        ProjectionKind::AzimuthalEqualArea,
        ProjectionKind::Polar,
        ProjectionKind::Utm,
        ProjectionKind::UtmNear,
    ];

    /// Projections whose plane x is a periodic longitude.
    pub fn is_cylindrical(self) -> bool {
        matches!(
            self,
            ProjectionKind::LinearCylindrical
                | ProjectionKind::CylindricalEqualArea
                | ProjectionKind::Mercator
                | ProjectionKind::Utm
        )
    }

    /// Pole-centred projections driven by the rotation matrices.
    pub fn is_azimuthal(self) -> bool {
        matches!(
            self,
            ProjectionKind::Orthographic
                | ProjectionKind::AzimuthalEquidistant
                | ProjectionKind::AzimuthalEqualArea
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            ProjectionKind::LinearCylindrical => "linear-cylindrical",
            ProjectionKind::CylindricalEqualArea => "cylindrical-equal-area",
            ProjectionKind::Mercator => "mercator",
            ProjectionKind::Orthographic => "orthographic",
            ProjectionKind::AzimuthalEquidistant => "azimuthal-equidistant",
            ProjectionKind::AzimuthalEqualArea => "azimuthal-equal-area",
            ProjectionKind::Polar => "polar",
            ProjectionKind::Utm => "utm",
            ProjectionKind::UtmNear => "utm-near",
        }
    }
}

impl std::fmt::Display for ProjectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ProjectionKind {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProjectionKind::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ProjectionError::UnknownKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::ProjectionKind;

    #[test]
    fn names_round_trip_through_from_str() {
        for kind in ProjectionKind::ALL {
            assert_eq!(kind.name().parse::<ProjectionKind>(), Ok(kind));
        }
        assert!("gnomonic".parse::<ProjectionKind>().is_err());
    }

    #[test]
    fn serde_uses_kebab_case() {
        let json = serde_json::to_string(&ProjectionKind::AzimuthalEqualArea).expect("json");
        assert_eq!(json, "\"azimuthal-equal-area\"");
    }

    #[test]
    fn families_are_disjoint() {
        for kind in ProjectionKind::ALL {
            assert!(!(kind.is_cylindrical() && kind.is_azimuthal()), "{kind}");
        }
    }
}
