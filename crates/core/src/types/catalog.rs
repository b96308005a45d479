//! Fixed catalogs: task categories, home areas and maintenance frequencies.

use serde::{Deserialize, Serialize};

/// Declares a `snake_case` catalog enum with `ALL`, `as_str`, `label`,
/// `Display` and `FromStr`.
macro_rules! catalog_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => ($id:literal, $label:literal)),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every entry in display order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Stable identifier used in storage, forms and query strings.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $id),+
                }
            }

            /// Human-readable name.
            #[must_use]
            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|item| item.as_str() == s)
                    .ok_or_else(|| format!(concat!("invalid ", stringify!($name), ": {}"), s))
            }
        }
    };
}

catalog_enum! {
    /// Kind of maintenance work.
    Category {
        HeatingCooling => ("heating_cooling", "HVAC"),
        Plumbing => ("plumbing", "Plumbing"),
        Electrical => ("electrical", "Electrical"),
        Cleaning => ("cleaning", "Cleaning"),
        Maintenance => ("maintenance", "Maintenance"),
        Safety => ("safety", "Safety"),
        Mechanical => ("mechanical", "Mechanical"),
        Landscaping => ("landscaping", "Landscaping"),
        Structural => ("structural", "Structural"),
        PestControl => ("pest_control", "Pest Control"),
    }
}

catalog_enum! {
    /// Room or area of the home a task applies to.
    Area {
        Kitchen => ("kitchen", "Kitchen"),
        LivingRoom => ("living_room", "Living Room"),
        Bathroom => ("bathroom", "Bathroom"),
        Bedroom => ("bedroom", "Bedroom"),
        Basement => ("basement", "Basement"),
        Attic => ("attic", "Attic"),
        Garage => ("garage", "Garage"),
        Yard => ("yard", "Yard"),
        Roof => ("roof", "Roof"),
        Exterior => ("exterior", "Exterior"),
        WholeHome => ("whole_home", "Whole Home"),
        General => ("general", "General"),
    }
}

catalog_enum! {
    /// How often a templated task recurs.
    Frequency {
        Monthly => ("monthly", "Monthly"),
        Quarterly => ("quarterly", "Quarterly"),
        Seasonal => ("seasonal", "Seasonal"),
        Yearly => ("yearly", "Yearly"),
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::Maintenance
    }
}

impl Default for Area {
    fn default() -> Self {
        Self::General
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_parse_back() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), *category);
        }
        for area in Area::ALL {
            assert_eq!(area.as_str().parse::<Area>().unwrap(), *area);
        }
    }

    #[test]
    fn test_unknown_id_is_rejected() {
        let err = "spaceship".parse::<Area>().unwrap_err();
        assert_eq!(err, "invalid Area: spaceship");
    }

    #[test]
    fn test_labels() {
        assert_eq!(Category::HeatingCooling.label(), "HVAC");
        assert_eq!(Area::WholeHome.label(), "Whole Home");
        assert_eq!(Frequency::Seasonal.to_string(), "seasonal");
    }

    #[test]
    fn test_serde_uses_ids() {
        let json = serde_json::to_string(&Category::PestControl).unwrap();
        assert_eq!(json, "\"pest_control\"");
        let area: Area = serde_json::from_str("\"living_room\"").unwrap();
        assert_eq!(area, Area::LivingRoom);
    }
}
