//! Built-in color palettes and the bounded palette collection.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use strum::EnumIter;

/// Maximum number of palettes held for selection at once.
pub const MAX_PALETTES: usize = 5;

// ----------------------------------------------------------------------------
// Built-in Palettes
// ----------------------------------------------------------------------------

/// Art-derived color palettes shipped with the application.
#[derive(Clone, Copy, Debug, Deserialize, EnumIter, Eq, PartialEq, Serialize)]
pub enum PaletteName {
    LaputaMedium,
    YesterdayMedium,
    Dali,
    Panton,
    Rattner,
}

impl Display for PaletteName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PaletteName::LaputaMedium => "Laputa Medium",
            PaletteName::YesterdayMedium => "Yesterday Medium",
            PaletteName::Dali => "Dali",
            PaletteName::Panton => "Panton",
            PaletteName::Rattner => "Rattner",
        };
        write!(f, "{name}")
    }
}

impl PaletteName {
    /// Hex color values of the palette, innermost ring first.
    pub fn colors(&self) -> &'static [&'static str] {
        match self {
            PaletteName::LaputaMedium => &[
                "#F0D77B", "#B4DAE5", "#AE93BE", "#5C5992", "#403369", "#1D2645", "#14191F",
            ],
            PaletteName::YesterdayMedium => &[
                "#92BBD9", "#DCCA2C", "#6FB382", "#4D6D93", "#26432F", "#132E41", "#061A21",
            ],
            PaletteName::Dali => &[
                "#b4b87f", "#9c913f", "#585b33", "#6ea8ab", "#397893", "#31333f", "#8f5715",
                "#ba9a44", "#cfbb83",
            ],
            PaletteName::Panton => &[
                "#e84a00", "#bb1d2c", "#9b0c43", "#661f66", "#2c1f62", "#006289", "#004759",
            ],
            PaletteName::Rattner => &[
                "#de8e69", "#f1be99", "#c1bd38", "#7a9132", "#4c849a", "#184363", "#5d5686",
                "#a39fc9",
            ],
        }
    }
}

/// A named list of hex colors.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Palette {
    pub name: String,
    pub colors: Vec<String>,
}

impl From<PaletteName> for Palette {
    fn from(name: PaletteName) -> Self {
        Palette {
            name: name.to_string(),
            colors: name.colors().iter().map(|color| color.to_string()).collect(),
        }
    }
}

// ----------------------------------------------------------------------------
// Palette Collection
// ----------------------------------------------------------------------------

/// Palettes currently offered for ring coloring.
///
/// Owned by the consuming layer rather than shared process-wide. The
/// collection is bounded: adding beyond [`MAX_PALETTES`] evicts the oldest
/// entry.
///
/// ## Examples
///
/// ```rust
/// use brick::palette::{Palette, PaletteCollection, PaletteName};
///
/// let mut palettes = PaletteCollection::default();
/// assert!(palettes.exists("Dali"));
///
/// palettes.add(Palette::from(PaletteName::Panton));
/// assert!(palettes.exists("Panton"));
/// ```
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PaletteCollection {
    palettes: Vec<Palette>,
}

impl Default for PaletteCollection {
    fn default() -> Self {
        PaletteCollection {
            palettes: vec![
                Palette::from(PaletteName::Dali),
                Palette::from(PaletteName::LaputaMedium),
                Palette::from(PaletteName::Rattner),
            ],
        }
    }
}

impl PaletteCollection {
    pub fn new() -> Self {
        PaletteCollection {
            palettes: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.palettes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }

    pub fn palettes(&self) -> &[Palette] {
        &self.palettes
    }

    /// Add a palette, evicting the oldest when the collection is full.
    pub fn add(&mut self, palette: Palette) {
        if self.palettes.len() >= MAX_PALETTES {
            self.palettes.remove(0);
        }
        self.palettes.push(palette);
    }

    /// Remove the palette with the given name, if present.
    pub fn remove(&mut self, name: &str) {
        self.palettes.retain(|palette| palette.name != name);
    }

    pub fn exists(&self, name: &str) -> bool {
        self.palettes.iter().any(|palette| palette.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Palette> {
        self.palettes.iter().find(|palette| palette.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn builtin_palettes_have_colors() {
        for name in PaletteName::iter() {
            assert!(!name.colors().is_empty(), "{name} palette is empty");
            assert!(name.colors().iter().all(|color| color.starts_with('#')));
        }
    }

    #[test]
    fn add_beyond_capacity_evicts_oldest() {
        let mut palettes = PaletteCollection::new();
        for i in 0..MAX_PALETTES + 2 {
            palettes.add(Palette {
                name: format!("palette-{i}"),
                colors: vec!["#000000".to_string()],
            });
        }

        assert_eq!(palettes.len(), MAX_PALETTES);
        assert!(!palettes.exists("palette-0"));
        assert!(!palettes.exists("palette-1"));
        assert!(palettes.exists("palette-6"));
    }

    #[test]
    fn remove_by_name() {
        let mut palettes = PaletteCollection::default();
        palettes.remove("Dali");

        assert!(!palettes.exists("Dali"));
        assert_eq!(palettes.len(), 2);
    }
}
