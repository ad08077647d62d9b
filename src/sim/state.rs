//! Session state and the events it emits

use serde::{Deserialize, Serialize};

use super::progression::Difficulty;
use crate::highscores::HighScoreOutcome;
use crate::tuning::Tuning;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Short pause before play (session start, after a life lost, after level-up)
    Ready,
    /// Input is processed
    Playing,
    /// Short pause after taking damage
    Losing,
    /// No lives left, report emitted
    GameOver,
}

impl GamePhase {
    pub fn accepts_input(self) -> bool {
        self == GamePhase::Playing
    }
}

/// Grid movement directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Edge-triggered input delivered by the input layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    Move(Direction),
    Absorb,
}

/// Player position on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub gx: usize,
    pub gy: usize,
}

impl Player {
    /// Spawn at `start`, clamped into a `width x height` grid
    pub fn spawn(start: (usize, usize), width: usize, height: usize) -> Self {
        Self {
            gx: start.0.min(width.saturating_sub(1)),
            gy: start.1.min(height.saturating_sub(1)),
        }
    }

    /// Position after one step, clamped to the grid
    pub fn stepped(self, direction: Direction, width: usize, height: usize) -> Self {
        let Player { gx, gy } = self;
        match direction {
            Direction::Up => Player {
                gx,
                gy: gy.saturating_sub(1),
            },
            Direction::Down => Player {
                gx,
                gy: (gy + 1).min(height.saturating_sub(1)),
            },
            Direction::Left => Player {
                gx: gx.saturating_sub(1),
                gy,
            },
            Direction::Right => Player {
                gx: (gx + 1).min(width.saturating_sub(1)),
                gy,
            },
        }
    }
}

/// Scalars describing a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub lives: u32,
    pub level: u32,
    pub score: u64,
    pub difficulty: Difficulty,
    /// Score at which the next extra life is granted
    pub next_extend: u64,
    pub phase: GamePhase,
}

impl SessionState {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            lives: tuning.starting_lives,
            level: 1,
            score: 0,
            difficulty: Difficulty::new(tuning),
            next_extend: tuning.extend_every,
            phase: GamePhase::Ready,
        }
    }

    pub fn max_number(&self) -> i32 {
        self.difficulty.max_number
    }

    pub fn expression_deviation(&self) -> i32 {
        self.difficulty.expression_deviation
    }
}

/// Final numbers of a finished session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOverReport {
    pub score: u64,
    pub level: u32,
    pub high_score: u64,
    pub high_level: u32,
    pub outcome: HighScoreOutcome,
}

/// Things that happened during a step, drained by the shell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseChanged(GamePhase),
    Moved {
        from: (usize, usize),
        to: (usize, usize),
    },
    Absorbed {
        x: usize,
        y: usize,
        points: u64,
        combo: u32,
    },
    /// Wrong absorption or projectile hit
    Missed { lives: u32 },
    LevelUp { level: u32, criteria: String },
    /// Every cell changed, redraw the whole grid
    GridRegenerated,
    /// Extra life granted
    Extend { lives: u32 },
    GameOver(GameOverReport),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_clamps_at_edges() {
        let p = Player { gx: 0, gy: 0 };
        assert_eq!(p.stepped(Direction::Up, 5, 6), p);
        assert_eq!(p.stepped(Direction::Left, 5, 6), p);

        let corner = Player { gx: 4, gy: 5 };
        assert_eq!(corner.stepped(Direction::Right, 5, 6), corner);
        assert_eq!(corner.stepped(Direction::Down, 5, 6), corner);
        assert_eq!(
            corner.stepped(Direction::Up, 5, 6),
            Player { gx: 4, gy: 4 }
        );
    }

    #[test]
    fn test_spawn_is_clamped_into_small_grids() {
        assert_eq!(Player::spawn((2, 2), 5, 6), Player { gx: 2, gy: 2 });
        assert_eq!(Player::spawn((2, 2), 1, 2), Player { gx: 0, gy: 1 });
    }

    #[test]
    fn test_only_playing_accepts_input() {
        assert!(GamePhase::Playing.accepts_input());
        assert!(!GamePhase::Ready.accepts_input());
        assert!(!GamePhase::Losing.accepts_input());
        assert!(!GamePhase::GameOver.accepts_input());
    }
}
