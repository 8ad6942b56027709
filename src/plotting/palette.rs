use std::collections::BTreeMap;

use super::Color;
use crate::error::{Result, VizError};

/// Four evenly spaced hues of equal lightness (seaborn's "husl" palette)
pub const DEFAULT_COLORS: [Color; 4] = [
    Color::rgb(247, 112, 137),
    Color::rgb(151, 164, 49),
    Color::rgb(54, 173, 164),
    Color::rgb(164, 140, 244),
];

/// Mapping from class label to display color.
/// Looking up a label without a color is an error, never a fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: BTreeMap<usize, Color>,
}

impl Palette {
    pub fn empty() -> Palette {
        Palette {
            colors: BTreeMap::new(),
        }
    }

    /// Assign `colors[i]` to label `i`
    pub fn from_colors(colors: &[Color]) -> Palette {
        Palette {
            colors: colors.iter().copied().enumerate().collect(),
        }
    }

    pub fn insert(&mut self, label: usize, color: Color) -> Option<Color> {
        self.colors.insert(label, color)
    }

    pub fn color(&self, label: usize) -> Result<Color> {
        self.colors
            .get(&label)
            .copied()
            .ok_or(VizError::MissingColor { label })
    }

    /// Colors for every label, in order
    pub fn colors_for<I>(&self, labels: I) -> Result<Vec<Color>>
    where
        I: IntoIterator<Item = usize>,
    {
        labels.into_iter().map(|label| self.color(label)).collect()
    }

    /// Fail on the first label the palette has no color for
    pub fn ensure_covers<I>(&self, labels: I) -> Result<()>
    where
        I: IntoIterator<Item = usize>,
    {
        labels.into_iter().try_for_each(|label| self.color(label).map(|_| ()))
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Entries ordered by label
    pub fn iter(&self) -> impl Iterator<Item = (usize, Color)> + '_ {
        self.colors.iter().map(|(&label, &color)| (label, color))
    }
}

impl Default for Palette {
    /// `{0: c0, 1: c1, 2: c2, 3: c3}` over [`DEFAULT_COLORS`]
    fn default() -> Self {
        Palette::from_colors(&DEFAULT_COLORS)
    }
}

impl FromIterator<(usize, Color)> for Palette {
    fn from_iter<T: IntoIterator<Item = (usize, Color)>>(iter: T) -> Self {
        Palette {
            colors: iter.into_iter().collect(),
        }
    }
}
