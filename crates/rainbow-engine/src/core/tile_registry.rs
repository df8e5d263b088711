use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ConfigError;

use super::block::Rank;

/// 24-bit RGB color of a tile.
///
/// Serialized as a `#rrggbb` hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl TileColor {
    pub const GRAY: Self = Self::new(0x7f, 0x7f, 0x7f);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Perceived brightness in `0.0..=1.0`, used to pick a readable label color.
    #[must_use]
    pub fn luminance(self) -> f32 {
        (0.299 * f32::from(self.r) + 0.587 * f32::from(self.g) + 0.114 * f32::from(self.b))
            / 255.0
    }
}

impl fmt::Display for TileColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid color {input:?}: expected `#rrggbb`")]
pub struct ParseColorError {
    #[error(not(source))]
    input: String,
}

impl FromStr for TileColor {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || ParseColorError {
            input: s.to_owned(),
        };
        let hex = s.strip_prefix('#').ok_or_else(error)?;
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(error());
        }
        let value = u32::from_str_radix(hex, 16).map_err(|_| error())?;
        let [_, r, g, b] = value.to_be_bytes();
        Ok(Self::new(r, g, b))
    }
}

impl Serialize for TileColor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TileColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Display attributes of one rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockType {
    rank: Rank,
    color: TileColor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
}

impl BlockType {
    #[must_use]
    pub fn new(rank: Rank, color: TileColor) -> Self {
        Self {
            rank,
            color,
            label: None,
        }
    }

    #[must_use]
    pub fn with_label(self, label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..self
        }
    }

    #[must_use]
    pub fn rank(&self) -> Rank {
        self.rank
    }

    #[must_use]
    pub fn color(&self) -> TileColor {
        self.color
    }

    /// Text shown on the tile; the rank number unless a label is configured.
    #[must_use]
    pub fn label(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| self.rank.to_string())
    }
}

/// Table mapping each rank to its display attributes.
///
/// The default table covers ranks 1 to 7 with the colors of the rainbow, red first.
///
/// ```
/// use rainbow_engine::{Rank, TileRegistry};
///
/// let registry = TileRegistry::default();
/// let red = registry.get(Rank::MIN).unwrap();
/// assert_eq!(red.color().to_string(), "#ff0000");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileRegistry {
    types: Vec<BlockType>,
}

impl Default for TileRegistry {
    fn default() -> Self {
        const RAINBOW: [TileColor; 7] = [
            TileColor::new(0xff, 0x00, 0x00),
            TileColor::new(0xff, 0x7f, 0x00),
            TileColor::new(0xff, 0xff, 0x00),
            TileColor::new(0x00, 0xff, 0x00),
            TileColor::new(0x00, 0x00, 0xff),
            TileColor::new(0x4b, 0x00, 0x82),
            TileColor::new(0x8b, 0x00, 0xff),
        ];
        let types = RAINBOW
            .into_iter()
            .zip(1..)
            .filter_map(|(color, rank)| Some(BlockType::new(Rank::new(rank)?, color)))
            .collect();
        Self { types }
    }
}

impl TileRegistry {
    #[must_use]
    pub fn new(types: Vec<BlockType>) -> Self {
        Self { types }
    }

    #[must_use]
    pub fn get(&self, rank: Rank) -> Option<&BlockType> {
        self.types.iter().find(|block_type| block_type.rank == rank)
    }

    /// Color for `rank`, gray for ranks the table does not know.
    #[must_use]
    pub fn color_of(&self, rank: Rank) -> TileColor {
        self.get(rank).map_or(TileColor::GRAY, BlockType::color)
    }

    #[must_use]
    pub fn label_of(&self, rank: Rank) -> String {
        self.get(rank)
            .map_or_else(|| rank.to_string(), BlockType::label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockType> {
        self.types.iter()
    }

    /// Checks that every rank a game up to `win_condition` can produce has exactly
    /// one entry.
    pub fn validate_up_to(&self, win_condition: Rank) -> Result<(), ConfigError> {
        let mut seen = BTreeSet::new();
        for block_type in &self.types {
            if !seen.insert(block_type.rank) {
                return Err(ConfigError::DuplicateBlockType {
                    rank: block_type.rank,
                });
            }
        }
        match win_condition.up_to().find(|rank| !seen.contains(rank)) {
            Some(rank) => Err(ConfigError::MissingBlockType { rank }),
            None => Ok(()),
        }
    }
}
