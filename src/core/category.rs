//! Product categories and their per-category lookup tables

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::ValidationError;

const ADULT_SIZES: &[&str] = &["S", "M", "L", "XL"];
const KIDS_SIZES: &[&str] = &["4-6 ans", "7-9 ans", "10-12 ans", "13-15 ans"];

/// The three garment categories sold by the storefront
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Men,
    Women,
    Kids,
}

impl Category {
    /// All categories, in catalog order
    pub const ALL: [Category; 3] = [Category::Men, Category::Women, Category::Kids];

    /// Wire name (`men`, `women`, `kids`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Men => "men",
            Category::Women => "women",
            Category::Kids => "kids",
        }
    }

    /// Short French label (`Homme`, `Femme`, `Enfant`)
    pub fn label(&self) -> &'static str {
        match self {
            Category::Men => "Homme",
            Category::Women => "Femme",
            Category::Kids => "Enfant",
        }
    }

    /// Product label as written in the order log (`Blouza Homme`, ...)
    pub fn display_label(&self) -> String {
        format!("Blouza {}", self.label())
    }

    /// Valid size choices for this category
    pub fn sizes(&self) -> &'static [&'static str] {
        match self {
            Category::Men | Category::Women => ADULT_SIZES,
            Category::Kids => KIDS_SIZES,
        }
    }

    /// Whether `size` is one of this category's choices, compared exactly
    pub fn accepts_size(&self, size: &str) -> bool {
        self.sizes().contains(&size)
    }

    /// Recover a category from its log label
    ///
    /// Accepts the short label (`Homme`) or the product label
    /// (`Blouza Homme`), case-insensitively.
    pub fn from_label(text: &str) -> Option<Category> {
        let text = text.trim();
        let short = text
            .get(..7)
            .filter(|prefix| prefix.eq_ignore_ascii_case("blouza "))
            .map(|_| text[7..].trim_start())
            .unwrap_or(text);

        Category::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(short))
    }

    pub fn color_band(&self) -> ColorBand {
        match self {
            Category::Men => ColorBand::Blue,
            Category::Women => ColorBand::Pink,
            Category::Kids => ColorBand::Green,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "men" => Ok(Category::Men),
            "women" => Ok(Category::Women),
            "kids" => Ok(Category::Kids),
            _ => Err(ValidationError::UnknownCategory {
                value: s.to_string(),
            }),
        }
    }
}

/// Display colour band used when rendering an order card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorBand {
    Blue,
    Pink,
    Green,
    Neutral,
}

impl ColorBand {
    /// Band for a category label read back from the log
    pub fn for_label(label: &str) -> ColorBand {
        Category::from_label(label)
            .map(|c| c.color_band())
            .unwrap_or(ColorBand::Neutral)
    }
}
