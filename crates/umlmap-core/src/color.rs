//! Color handling and the stereotype palette.
//!
//! [`Color`] wraps the `DynamicColor` type from the color crate. [`Palette`]
//! assigns one categorical color per stereotype, indexed by the stereotype's
//! position in the model.

use std::{
    hash::{Hash, Hasher},
    str::FromStr,
};

use color::DynamicColor;

/// Wrapper around the `DynamicColor` type from the color crate
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Color {
    color: DynamicColor,
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl Color {
    /// Create a new `Color` from a CSS color string such as `"#ff0000"` or `"red"`.
    ///
    /// # Examples
    ///
    /// ```
    /// use umlmap_core::color::Color;
    ///
    /// let red = Color::new("#ff0000").unwrap();
    /// assert!(Color::new("not-a-color").is_err());
    /// ```
    pub fn new(color_str: &str) -> Result<Self, String> {
        match DynamicColor::from_str(color_str) {
            Ok(color) => Ok(Self { color }),
            Err(err) => Err(format!("invalid color `{color_str}`: {err}")),
        }
    }

    /// Creates a new color with the specified alpha value.
    pub fn with_alpha(self, alpha: f32) -> Self {
        Color {
            color: self.color.with_alpha(alpha),
        }
    }

    /// Returns the alpha (transparency) component of this color.
    pub fn alpha(&self) -> f32 {
        self.color.components[3]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new("black").expect("'black' is a valid CSS color")
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.color)
    }
}

/// The nine categorical colors used for stereotypes.
const DEFAULT_PALETTE: [&str; 9] = [
    "#e41a1c", "#377eb8", "#4daf4a", "#984ea3", "#ff7f00", "#ffff33", "#a65628", "#f781bf",
    "#999999",
];

/// Fixed categorical palette indexed by stereotype position.
///
/// Indices past the end wrap around, so the tenth stereotype shares the
/// first stereotype's color.
///
/// # Examples
///
/// ```
/// use umlmap_core::color::Palette;
///
/// let palette = Palette::default();
/// assert_eq!(palette.len(), 9);
/// assert_eq!(palette.color_for(9), palette.color_for(0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    /// Builds a palette from CSS color strings.
    ///
    /// # Errors
    ///
    /// Returns an error if the list is empty or a color cannot be parsed.
    pub fn from_strings<S: AsRef<str>>(colors: &[S]) -> Result<Self, String> {
        if colors.is_empty() {
            return Err("palette must contain at least one color".to_string());
        }
        let colors = colors
            .iter()
            .map(|c| Color::new(c.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { colors })
    }

    /// Number of distinct colors in the palette.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// A palette is never empty; provided for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Returns the color for the stereotype at `index`, wrapping around.
    pub fn color_for(&self, index: usize) -> Color {
        self.colors[index % self.colors.len()]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::from_strings(&DEFAULT_PALETTE).expect("default palette colors are valid")
    }
}
