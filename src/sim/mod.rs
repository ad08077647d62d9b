//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through `update(dt)`
//! - Seeded RNG only
//! - Stable iteration order (row-major grid)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod combo;
pub mod criteria;
pub mod generator;
pub mod grid;
pub mod progression;
pub mod session;
pub mod state;
pub mod timer;

pub use autopilot::Autopilot;
pub use combo::ComboTracker;
pub use criteria::{Criteria, ExpressionMode, Rule, RuleKind, is_prime, satisfies};
pub use generator::{GenContext, RegenReport, regenerate};
pub use grid::{Cell, Grid};
pub use progression::{CycleType, Difficulty, LevelConfig, next_level_config};
pub use session::{AbsorbOutcome, GameSession};
pub use state::{
    Direction, GameEvent, GameOverReport, GamePhase, InputEvent, Player, SessionState,
};
pub use timer::Timer;
