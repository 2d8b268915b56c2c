//! Fixed per-session schedule, candidate answers and palettes.

use crate::domain::{Color, DeficiencyType, ImageIndex};

/// Plate type for each index, 1 through 10.
const SCHEDULE: [DeficiencyType; ImageIndex::MAX as usize] = [
    DeficiencyType::PROTANOPIA,
    DeficiencyType::PROTANOPIA,
    DeficiencyType::PROTANOPIA,
    DeficiencyType::DEUTERANOPIA,
    DeficiencyType::DEUTERANOPIA,
    DeficiencyType::DEUTERANOPIA,
    DeficiencyType::TRITANOPIA,
    DeficiencyType::TRITANOPIA,
    DeficiencyType::TRITANOPIA,
    DeficiencyType::Control,
];

/// Background and foreground dot colors for one plate type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Color of dots outside the number.
    pub background: Color,
    /// Color of dots forming the number.
    pub foreground: Color,
}

/// Type screened by the plate at `index`.
#[must_use]
pub const fn scheduled_type(index: ImageIndex) -> DeficiencyType {
    SCHEDULE[index.position()]
}

/// Numbers a plate of this type may hide.
#[must_use]
pub const fn candidates(deficiency_type: DeficiencyType) -> &'static [u8] {
    match deficiency_type {
        DeficiencyType::PROTANOPIA => &[12, 29, 42, 57, 74],
        DeficiencyType::DEUTERANOPIA => &[8, 15, 35, 63, 88],
        DeficiencyType::TRITANOPIA => &[5, 26, 45, 69, 96],
        DeficiencyType::Control => &[7, 16, 23, 38, 52],
    }
}

/// Dot colors for a plate type.
#[must_use]
pub const fn palette(deficiency_type: DeficiencyType) -> Palette {
    let (background, foreground) = match deficiency_type {
        DeficiencyType::PROTANOPIA => (Color::new(200, 100, 100), Color::new(100, 180, 100)),
        DeficiencyType::DEUTERANOPIA => (Color::new(100, 180, 100), Color::new(200, 100, 100)),
        DeficiencyType::TRITANOPIA => (Color::new(100, 100, 200), Color::new(220, 220, 100)),
        DeficiencyType::Control => (Color::new(150, 150, 150), Color::new(50, 50, 50)),
    };
    Palette {
        background,
        foreground,
    }
}
