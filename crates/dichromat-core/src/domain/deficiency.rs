//! Deficiency types and plate indices.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// A dichromacy class that can be simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dichromacy {
    /// Missing long-wavelength (red) cones.
    Protanopia,
    /// Missing medium-wavelength (green) cones.
    Deuteranopia,
    /// Missing short-wavelength (blue) cones.
    Tritanopia,
}

impl Dichromacy {
    /// All dichromacy classes in schedule order.
    pub const ALL: [Self; 3] = [Self::Protanopia, Self::Deuteranopia, Self::Tritanopia];

    /// Lowercase identifier used in JSON and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Protanopia => "protanopia",
            Self::Deuteranopia => "deuteranopia",
            Self::Tritanopia => "tritanopia",
        }
    }

    /// Human-readable description for interpretation text.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Protanopia => "protanopia (red color blindness)",
            Self::Deuteranopia => "deuteranopia (green color blindness)",
            Self::Tritanopia => "tritanopia (blue color blindness)",
        }
    }
}

impl fmt::Display for Dichromacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dichromacy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match DeficiencyType::from_str(s)? {
            DeficiencyType::Dichromat(d) => Ok(d),
            DeficiencyType::Control => Err(CoreError::UnknownDeficiencyType(s.to_string())),
        }
    }
}

/// The type a plate is designed to screen for.
///
/// `Control` plates carry no deficiency-specific difficulty and detect
/// unreliable answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DeficiencyType {
    /// A plate targeting one dichromacy.
    Dichromat(Dichromacy),
    /// A calibration plate.
    Control,
}

impl DeficiencyType {
    /// Protanopia plate.
    pub const PROTANOPIA: Self = Self::Dichromat(Dichromacy::Protanopia);
    /// Deuteranopia plate.
    pub const DEUTERANOPIA: Self = Self::Dichromat(Dichromacy::Deuteranopia);
    /// Tritanopia plate.
    pub const TRITANOPIA: Self = Self::Dichromat(Dichromacy::Tritanopia);

    /// All four types in schedule order.
    pub const ALL: [Self; 4] = [
        Self::PROTANOPIA,
        Self::DEUTERANOPIA,
        Self::TRITANOPIA,
        Self::Control,
    ];

    /// Returns the dichromacy this type targets, if any.
    #[must_use]
    pub const fn dichromacy(self) -> Option<Dichromacy> {
        match self {
            Self::Dichromat(d) => Some(d),
            Self::Control => None,
        }
    }

    /// Lowercase identifier used in JSON and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dichromat(d) => d.as_str(),
            Self::Control => "control",
        }
    }
}

impl From<Dichromacy> for DeficiencyType {
    fn from(d: Dichromacy) -> Self {
        Self::Dichromat(d)
    }
}

impl fmt::Display for DeficiencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeficiencyType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "protanopia" => Ok(Self::PROTANOPIA),
            "deuteranopia" => Ok(Self::DEUTERANOPIA),
            "tritanopia" => Ok(Self::TRITANOPIA),
            "control" => Ok(Self::Control),
            _ => Err(CoreError::UnknownDeficiencyType(s.to_string())),
        }
    }
}

impl TryFrom<String> for DeficiencyType {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<DeficiencyType> for String {
    fn from(value: DeficiencyType) -> Self {
        value.as_str().to_string()
    }
}

/// A plate position within a session, always in `1..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ImageIndex(u8);

impl ImageIndex {
    /// First valid index.
    pub const MIN: u8 = 1;
    /// Last valid index; a session always has this many plates.
    pub const MAX: u8 = 10;

    /// Validates and wraps an index.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ImageIndexOutOfRange`] outside `1..=10`.
    pub fn new(index: u32) -> Result<Self> {
        u8::try_from(index)
            .ok()
            .filter(|i| (Self::MIN..=Self::MAX).contains(i))
            .map(Self)
            .ok_or(CoreError::ImageIndexOutOfRange(index))
    }

    /// Iterates over all ten indices in order.
    pub fn all() -> impl Iterator<Item = Self> {
        (Self::MIN..=Self::MAX).map(Self)
    }

    /// The raw 1-based index.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// The 0-based position, for indexing fixed tables.
    #[must_use]
    pub const fn position(self) -> usize {
        (self.0 - 1) as usize
    }
}

impl TryFrom<u8> for ImageIndex {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(u32::from(value))
    }
}

impl From<ImageIndex> for u8 {
    fn from(value: ImageIndex) -> Self {
        value.0
    }
}

impl fmt::Display for ImageIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deficiency_round_trips_through_strings() {
        for t in DeficiencyType::ALL {
            assert_eq!(t.as_str().parse::<DeficiencyType>().unwrap(), t);
        }
        assert!("achromatopsia".parse::<DeficiencyType>().is_err());
    }

    #[test]
    fn test_deficiency_json_is_lowercase_string() {
        let json = serde_json::to_string(&DeficiencyType::TRITANOPIA).unwrap();
        assert_eq!(json, "\"tritanopia\"");
        let control: DeficiencyType = serde_json::from_str("\"control\"").unwrap();
        assert_eq!(control, DeficiencyType::Control);
        assert!(serde_json::from_str::<DeficiencyType>("\"mauve\"").is_err());
    }

    #[test]
    fn test_control_is_not_a_dichromacy() {
        assert!("control".parse::<Dichromacy>().is_err());
        assert_eq!(DeficiencyType::Control.dichromacy(), None);
        assert_eq!(
            DeficiencyType::DEUTERANOPIA.dichromacy(),
            Some(Dichromacy::Deuteranopia)
        );
    }

    #[test]
    fn test_image_index_bounds() {
        assert!(ImageIndex::new(0).is_err());
        assert!(ImageIndex::new(11).is_err());
        assert!(ImageIndex::new(300).is_err());
        assert_eq!(ImageIndex::new(1).unwrap().position(), 0);
        assert_eq!(ImageIndex::new(10).unwrap().get(), 10);
        assert_eq!(ImageIndex::all().count(), 10);
    }

    #[test]
    fn test_image_index_deserialize_validates() {
        assert!(serde_json::from_str::<ImageIndex>("4").is_ok());
        assert!(serde_json::from_str::<ImageIndex>("0").is_err());
    }
}
