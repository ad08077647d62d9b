//! Idle/demo mode driver
//!
//! Picks one input per think interval: absorb when standing on a pending
//! target, otherwise walk toward the nearest one. A small mistake chance
//! makes it absorb whatever it stands on, so demo sessions eventually end.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::session::GameSession;
use super::state::{Direction, InputEvent};
use super::timer::Timer;

/// Seconds between decisions
pub const DEFAULT_THINK_INTERVAL: f32 = 0.2;

pub struct Autopilot {
    think: Timer,
    mistake_chance: f64,
    rng: Pcg32,
}

impl Autopilot {
    pub fn new(seed: u64, think_interval: f32, mistake_chance: f64) -> Self {
        Self {
            think: Timer::repeating(think_interval),
            mistake_chance: mistake_chance.clamp(0.0, 1.0),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Never makes mistakes
    pub fn perfect(seed: u64) -> Self {
        Self::new(seed, DEFAULT_THINK_INTERVAL, 0.0)
    }

    /// Input for this step, if it is time to act
    pub fn next_input(&mut self, session: &GameSession, dt: f32) -> Option<InputEvent> {
        if !session.phase().accepts_input() {
            return None;
        }
        if self.think.tick(dt) == 0 {
            return None;
        }
        let player = session.player();
        let here = session.grid().get(player.gx, player.gy)?;

        if here.is_pending_target() {
            return Some(InputEvent::Absorb);
        }
        if !here.absorbed && self.rng.random_bool(self.mistake_chance) {
            log::debug!("Autopilot fumbles on {}", here.display);
            return Some(InputEvent::Absorb);
        }

        let (tx, ty) = nearest_pending_target(session)?;
        step_toward((player.gx, player.gy), (tx, ty)).map(InputEvent::Move)
    }
}

fn nearest_pending_target(session: &GameSession) -> Option<(usize, usize)> {
    let player = session.player();
    session
        .grid()
        .iter()
        .filter(|(_, cell)| cell.is_pending_target())
        .min_by_key(|((x, y), _)| x.abs_diff(player.gx) + y.abs_diff(player.gy))
        .map(|(pos, _)| pos)
}

/// Horizontal first, then vertical
fn step_toward(from: (usize, usize), to: (usize, usize)) -> Option<Direction> {
    use std::cmp::Ordering;
    match (to.0.cmp(&from.0), to.1.cmp(&from.1)) {
        (Ordering::Greater, _) => Some(Direction::Right),
        (Ordering::Less, _) => Some(Direction::Left),
        (Ordering::Equal, Ordering::Greater) => Some(Direction::Down),
        (Ordering::Equal, Ordering::Less) => Some(Direction::Up),
        (Ordering::Equal, Ordering::Equal) => None,
    }
}
