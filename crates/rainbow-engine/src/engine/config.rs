use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    ConfigError,
    core::{Grid, Rank, TileRegistry},
};

/// Upper bound for [`GameConfig::input_buffer`].
pub const MAX_INPUT_BUFFER: usize = 16;

/// Number of blocks each spawning phase creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpawnPolicy {
    /// Blocks spawned when the level is generated.
    pub first_round: usize,
    /// Blocks spawned after every move.
    pub later_rounds: usize,
}

impl Default for SpawnPolicy {
    fn default() -> Self {
        Self {
            first_round: 2,
            later_rounds: 1,
        }
    }
}

impl SpawnPolicy {
    #[must_use]
    pub fn amount_for_round(&self, round: usize) -> usize {
        if round == 0 {
            self.first_round
        } else {
            self.later_rounds
        }
    }
}

/// Settings of a game, fixed for the lifetime of a session.
///
/// Every field has a default, so a JSON file only needs the fields it changes:
///
/// ```
/// use rainbow_engine::GameConfig;
///
/// let config: GameConfig = serde_json::from_str(r#"{ "width": 5, "win_condition": 3 }"#).unwrap();
/// assert_eq!(config.width, 5);
/// assert_eq!(config.height, 4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    pub width: u8,
    pub height: u8,
    /// Display attributes per rank.
    pub block_types: TileRegistry,
    /// Rank that wins the game as soon as a block reaches it.
    pub win_condition: Rank,
    /// How long the presentation layer animates a move. Not used by the engine.
    #[serde(with = "duration_millis")]
    pub animation_time: Duration,
    pub spawn: SpawnPolicy,
    /// Maximum number of directional inputs queued while a move is in progress.
    pub input_buffer: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 4,
            height: 4,
            block_types: TileRegistry::default(),
            win_condition: Rank::new(7).unwrap_or(Rank::MIN),
            animation_time: Duration::from_millis(200),
            spawn: SpawnPolicy::default(),
            input_buffer: 4,
        }
    }
}

impl GameConfig {
    #[must_use]
    pub fn grid(&self) -> Grid {
        Grid::new(self.width, self.height)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let Self { width, height, .. } = *self;
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyGrid { width, height });
        }
        if width > Grid::MAX_SIDE || height > Grid::MAX_SIDE {
            return Err(ConfigError::GridTooLarge {
                width,
                height,
                max: Grid::MAX_SIDE,
            });
        }
        if self.spawn.first_round == 0 || self.spawn.later_rounds == 0 {
            return Err(ConfigError::ZeroSpawnAmount);
        }
        if !(1..=MAX_INPUT_BUFFER).contains(&self.input_buffer) {
            return Err(ConfigError::InputBufferSize {
                size: self.input_buffer,
                max: MAX_INPUT_BUFFER,
            });
        }
        self.block_types.validate_up_to(self.win_condition)
    }
}

/// Serializes a [`Duration`] as whole milliseconds.
mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize as _, Deserializer, Serializer};

    pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grid(), Grid::new(4, 4));
        assert_eq!(config.win_condition.get(), 7);
    }

    #[test]
    fn test_spawn_amount_per_round() {
        let policy = SpawnPolicy::default();
        assert_eq!(policy.amount_for_round(0), 2);
        assert_eq!(policy.amount_for_round(1), 1);
        assert_eq!(policy.amount_for_round(57), 1);
    }

    #[test]
    fn test_empty_grid_is_rejected() {
        let config = GameConfig {
            height: 0,
            ..GameConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyGrid {
                width: 4,
                height: 0
            })
        );
    }

    #[test]
    fn test_oversized_grid_is_rejected() {
        let config = GameConfig {
            width: 17,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::GridTooLarge { width: 17, .. })
        ));
    }

    #[test]
    fn test_win_condition_needs_block_types() {
        let config = GameConfig {
            win_condition: Rank::new(9).unwrap(),
            ..GameConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingBlockType {
                rank: Rank::new(8).unwrap()
            })
        );
    }

    #[test]
    fn test_zero_spawn_is_rejected() {
        let config = GameConfig {
            spawn: SpawnPolicy {
                first_round: 2,
                later_rounds: 0,
            },
            ..GameConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroSpawnAmount));
    }

    #[test]
    fn test_input_buffer_bounds() {
        for input_buffer in [0, MAX_INPUT_BUFFER + 1] {
            let config = GameConfig {
                input_buffer,
                ..GameConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InputBufferSize { .. })
            ));
        }
    }

    mod serialization {
        use super::*;

        #[test]
        fn test_empty_object_is_default() {
            let config: GameConfig = serde_json::from_str("{}").unwrap();
            assert_eq!(config, GameConfig::default());
        }

        #[test]
        fn test_animation_time_in_millis() {
            let config: GameConfig = serde_json::from_str(r#"{"animation_time": 350}"#).unwrap();
            assert_eq!(config.animation_time, Duration::from_millis(350));

            let json = serde_json::to_value(&config).unwrap();
            assert_eq!(json["animation_time"], 350);
        }

        #[test]
        fn test_partial_spawn_policy() {
            let config: GameConfig =
                serde_json::from_str(r#"{"spawn": {"later_rounds": 2}}"#).unwrap();
            assert_eq!(
                config.spawn,
                SpawnPolicy {
                    first_round: 2,
                    later_rounds: 2
                }
            );
        }

        #[test]
        fn test_unknown_field_is_rejected() {
            let result: Result<GameConfig, _> = serde_json::from_str(r#"{"widht": 5}"#);
            assert!(result.is_err());
        }

        #[test]
        fn test_zero_win_condition_is_rejected() {
            let result: Result<GameConfig, _> = serde_json::from_str(r#"{"win_condition": 0}"#);
            assert!(result.is_err());
        }
    }
}
