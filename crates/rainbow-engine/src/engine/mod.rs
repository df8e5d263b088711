//! Turn sequencing on top of the [`Board`](crate::Board).
//!
//! - [`GameSession`] - the turn state machine (generate, spawn, wait, move, win/lose)
//! - [`ResolutionPlan`] - one move resolved logically, committed after animation
//! - [`Spawner`] - seeded random placement of new blocks
//! - [`GameConfig`] - grid size, tile table, win rank and spawn policy
//! - [`GameStats`] - per-session counters
//!
//! # Turn flow
//!
//! ```text
//! GenerateLevel -> SpawningBlocks -> WaitingInput -> Moving -> SpawningBlocks -> ...
//!                        |                                          |
//!                        +--> Win | Lose                            +--> Win | Lose
//! ```
//!
//! `Moving` is left only when the caller reports that the move animation finished
//! ([`GameSession::animation_complete`]), so the merge cleanup never races the
//! presentation layer.

pub use self::{config::*, game_session::*, game_stats::*, resolver::*, spawner::*};

mod config;
mod game_session;
mod game_stats;
mod resolver;
mod spawner;
