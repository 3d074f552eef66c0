use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::EnumIter;

/// Which input file a group of fields belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Origin,
    Destination,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Origin => "origin",
            Self::Destination => "destination",
        }
    }

    /// Roles offered for this side, in display order
    pub fn roles(&self) -> &'static [SlotRole] {
        match self {
            Self::Origin => &[
                SlotRole::UniqueId,
                SlotRole::Latitude,
                SlotRole::Longitude,
                SlotRole::Population,
            ],
            Self::Destination => &[
                SlotRole::UniqueId,
                SlotRole::Latitude,
                SlotRole::Longitude,
                SlotRole::Target,
                SlotRole::Category,
            ],
        }
    }

    pub fn file_label(&self) -> &'static str {
        match self {
            Self::Origin => "Origin file",
            Self::Destination => "Destination file",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "origin" | "source" => Ok(Self::Origin),
            "destination" => Ok(Self::Destination),
            _ => Err(format!("Unknown side: {}", s)),
        }
    }
}

/// Semantic role a file column can be mapped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "snake_case")]
pub enum SlotRole {
    UniqueId,
    Latitude,
    Longitude,
    Population,
    Target,
    Category,
}

impl SlotRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UniqueId => "unique_id",
            Self::Latitude => "latitude",
            Self::Longitude => "longitude",
            Self::Population => "population",
            Self::Target => "target",
            Self::Category => "category",
        }
    }

    /// Key the analysis engine expects in its field mapping
    pub fn mapping_key(&self) -> &'static str {
        match self {
            Self::UniqueId => "idx",
            Self::Latitude => "lat",
            Self::Longitude => "lon",
            Self::Population => "population",
            Self::Target => "target",
            Self::Category => "category",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::UniqueId => "Unique id field",
            Self::Latitude => "Latitude (y-coordinate) field",
            Self::Longitude => "Longitude (x-coordinate) field",
            Self::Population => "Population field",
            Self::Target => "Target field",
            Self::Category => "Category field (Optional)",
        }
    }

    /// Only shown while coverage measures are requested
    pub fn requires_coverage(&self) -> bool {
        matches!(self, Self::Population | Self::Target)
    }
}

impl fmt::Display for SlotRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SlotRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unique_id" => Ok(Self::UniqueId),
            "latitude" => Ok(Self::Latitude),
            "longitude" => Ok(Self::Longitude),
            "population" => Ok(Self::Population),
            "target" => Ok(Self::Target),
            "category" => Ok(Self::Category),
            _ => Err(format!("Unknown slot role: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Walk,
    Drive,
}

impl TravelMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Walk => "Walk",
            Self::Drive => "Drive",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Self::Walk => Self::Drive,
            Self::Drive => Self::Walk,
        }
    }
}

/// How quickly a facility's contribution fades with distance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum DecayFunction {
    #[default]
    Linear,
    Root,
    Logit,
}

impl DecayFunction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Linear => "Linear",
            Self::Root => "Inverse square root",
            Self::Logit => "Logit",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Self::Linear => Self::Root,
            Self::Root => Self::Logit,
            Self::Logit => Self::Linear,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Self::Linear => Self::Logit,
            Self::Root => Self::Linear,
            Self::Logit => Self::Root,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_side_conversion() {
        assert_eq!(Side::from_str("origin").unwrap(), Side::Origin);
        assert_eq!(Side::from_str("source").unwrap(), Side::Origin);
        assert_eq!(Side::Destination.as_str(), "destination");
        assert!(Side::from_str("elsewhere").is_err());
    }

    #[test]
    fn test_role_round_trip_through_str() {
        for role in SlotRole::iter() {
            assert_eq!(SlotRole::from_str(role.as_str()).unwrap(), role);
        }
    }

    #[test]
    fn test_side_roles() {
        assert_eq!(Side::Origin.roles().len(), 4);
        assert!(Side::Destination.roles().contains(&SlotRole::Category));
        assert!(!Side::Origin.roles().contains(&SlotRole::Category));
    }

    #[test]
    fn test_decay_function_cycles() {
        let mut f = DecayFunction::default();
        for _ in 0..3 {
            f = f.next();
        }
        assert_eq!(f, DecayFunction::Linear);
        assert_eq!(DecayFunction::Linear.prev(), DecayFunction::Logit);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&DecayFunction::Root).unwrap(), "\"root\"");
        assert_eq!(serde_json::to_string(&SlotRole::UniqueId).unwrap(), "\"unique_id\"");
        assert_eq!(serde_json::to_string(&TravelMode::Drive).unwrap(), "\"drive\"");
    }
}
