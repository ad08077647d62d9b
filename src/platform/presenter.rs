//! Grid presenter
//!
//! Keeps one visual per cell plus the player and two HUD lines, and turns
//! drained session events into `SpriteLayer` calls.

use glam::Vec2;

use super::{SpriteLayer, Tint, VisualHandle};
use crate::cell_position;
use crate::sim::{GameEvent, GamePhase, GameSession};

/// Criteria line position
pub const CRITERIA_POS: Vec2 = Vec2::new(128.0, 72.0);
/// Lives/score/combo line position
pub const STATS_POS: Vec2 = Vec2::new(128.0, 100.0);

pub struct GridPresenter {
    width: usize,
    /// Row-major, same order as the grid
    cells: Vec<VisualHandle>,
    player: VisualHandle,
    criteria: VisualHandle,
    stats: VisualHandle,
}

impl GridPresenter {
    /// Create every visual and draw the session's current state
    pub fn attach<L: SpriteLayer + ?Sized>(layer: &mut L, session: &GameSession) -> Self {
        let grid = session.grid();
        let cells = grid
            .iter()
            .map(|((x, y), _)| layer.create_cell_visual(cell_position(x, y)))
            .collect();
        let player = session.player();
        let presenter = Self {
            width: grid.width(),
            cells,
            player: layer.create_cell_visual(cell_position(player.gx, player.gy)),
            criteria: layer.create_cell_visual(CRITERIA_POS),
            stats: layer.create_cell_visual(STATS_POS),
        };
        layer.set_tint(presenter.criteria, Tint::Hud);
        layer.set_tint(presenter.stats, Tint::Hud);
        presenter.sync(layer, session);
        presenter
    }

    /// Redraw everything from the session
    pub fn sync<L: SpriteLayer + ?Sized>(&self, layer: &mut L, session: &GameSession) {
        for ((x, y), _) in session.grid().iter() {
            self.draw_cell(layer, session, x, y);
        }
        let player = session.player();
        layer.move_visual(self.player, cell_position(player.gx, player.gy));
        self.draw_player_tint(layer, session.phase());
        layer.set_text(self.criteria, &session.criteria().describe());
        self.draw_stats(layer, session);
    }

    /// Apply a batch of drained events
    pub fn apply<L: SpriteLayer + ?Sized>(
        &self,
        layer: &mut L,
        session: &GameSession,
        events: &[GameEvent],
    ) {
        let mut stats_dirty = false;
        for event in events {
            match event {
                GameEvent::Moved { to, .. } => {
                    layer.move_visual(self.player, cell_position(to.0, to.1));
                }
                GameEvent::Absorbed { x, y, .. } => {
                    self.draw_cell(layer, session, *x, *y);
                    stats_dirty = true;
                }
                GameEvent::GridRegenerated => {
                    for ((x, y), _) in session.grid().iter() {
                        self.draw_cell(layer, session, x, y);
                    }
                    layer.set_text(self.criteria, &session.criteria().describe());
                }
                GameEvent::PhaseChanged(phase) => self.draw_player_tint(layer, *phase),
                GameEvent::Missed { .. }
                | GameEvent::LevelUp { .. }
                | GameEvent::Extend { .. }
                | GameEvent::GameOver(_) => stats_dirty = true,
            }
        }
        if stats_dirty {
            self.draw_stats(layer, session);
        }
    }

    /// Destroy every visual this presenter created
    pub fn detach<L: SpriteLayer + ?Sized>(self, layer: &mut L) {
        for handle in self.cells {
            layer.destroy_visual(handle);
        }
        layer.destroy_visual(self.player);
        layer.destroy_visual(self.criteria);
        layer.destroy_visual(self.stats);
    }

    pub fn cell_visual(&self, x: usize, y: usize) -> Option<VisualHandle> {
        if x >= self.width {
            return None;
        }
        self.cells.get(y * self.width + x).copied()
    }

    pub fn player_visual(&self) -> VisualHandle {
        self.player
    }

    fn draw_cell<L: SpriteLayer + ?Sized>(
        &self,
        layer: &mut L,
        session: &GameSession,
        x: usize,
        y: usize,
    ) {
        let (Some(handle), Some(cell)) = (self.cell_visual(x, y), session.grid().get(x, y)) else {
            return;
        };
        if cell.absorbed {
            layer.set_text(handle, "");
            layer.set_tint(handle, Tint::Absorbed);
        } else {
            layer.set_text(handle, &cell.display);
            layer.set_tint(handle, Tint::Cell);
        }
    }

    fn draw_player_tint<L: SpriteLayer + ?Sized>(&self, layer: &mut L, phase: GamePhase) {
        let tint = match phase {
            GamePhase::Losing | GamePhase::GameOver => Tint::Hurt,
            GamePhase::Ready | GamePhase::Playing => Tint::Player,
        };
        layer.set_tint(self.player, tint);
    }

    fn draw_stats<L: SpriteLayer + ?Sized>(&self, layer: &mut L, session: &GameSession) {
        layer.set_text(self.stats, &stats_line(session));
    }
}

/// HUD text for lives, score, level and combo
pub fn stats_line(session: &GameSession) -> String {
    let state = session.state();
    let combo = session.combo().count();
    let mut line = format!(
        "Lives {}  Score {}  Level {}",
        state.lives, state.score, state.level
    );
    if combo > 1 {
        line.push_str(&format!("  x{combo}"));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscores::HighScoreRecord;
    use crate::platform::HeadlessLayer;
    use crate::sim::{AbsorbOutcome, Direction};
    use crate::tuning::Tuning;

    fn setup() -> (HeadlessLayer, GameSession, GridPresenter) {
        let mut layer = HeadlessLayer::new();
        let mut session =
            GameSession::new(Tuning::default(), 5, HighScoreRecord::default()).unwrap();
        session.drain_events();
        let presenter = GridPresenter::attach(&mut layer, &session);
        (layer, session, presenter)
    }

    #[test]
    fn test_attach_creates_one_visual_per_cell() {
        let (layer, session, presenter) = setup();
        // cells + player + two HUD lines
        assert_eq!(layer.len(), session.grid().len() + 3);
        let handle = presenter.cell_visual(1, 2).unwrap();
        let visual = layer.visual(handle).unwrap();
        assert_eq!(visual.pos, cell_position(1, 2));
        assert_eq!(visual.text, session.grid().get(1, 2).unwrap().display);
        assert!(presenter.cell_visual(5, 0).is_none());
    }

    #[test]
    fn test_absorb_hides_cell_text() {
        let (mut layer, mut session, presenter) = setup();
        session.update(session.tuning().ready_delay);

        let (x, y) = session.grid().first_pending_target().unwrap();
        let start = session.player();
        // Walk there
        for _ in 0..x.abs_diff(start.gx) {
            session.move_player(if x > start.gx { Direction::Right } else { Direction::Left });
        }
        for _ in 0..y.abs_diff(start.gy) {
            session.move_player(if y > start.gy { Direction::Down } else { Direction::Up });
        }
        let outcome = session.absorb();
        assert!(matches!(
            outcome,
            AbsorbOutcome::Hit { .. } | AbsorbOutcome::LevelComplete { .. }
        ));
        let events = session.drain_events();
        presenter.apply(&mut layer, &session, &events);

        let player = layer.visual(presenter.player_visual()).unwrap();
        assert_eq!(player.pos, cell_position(x, y));
        if matches!(outcome, AbsorbOutcome::Hit { .. }) {
            let cell = layer.visual(presenter.cell_visual(x, y).unwrap()).unwrap();
            assert_eq!(cell.text, "");
            assert_eq!(cell.tint, Some(Tint::Absorbed));
        }
    }

    #[test]
    fn test_losing_tints_player() {
        let (mut layer, mut session, presenter) = setup();
        session.update(session.tuning().ready_delay);
        session.hit();
        let events = session.drain_events();
        presenter.apply(&mut layer, &session, &events);
        let player = layer.visual(presenter.player_visual()).unwrap();
        assert_eq!(player.tint, Some(Tint::Hurt));
        assert!(layer.texts().any(|t| t.starts_with("Lives 2")));
    }

    #[test]
    fn test_detach_removes_everything() {
        let (mut layer, _session, presenter) = setup();
        presenter.detach(&mut layer);
        assert!(layer.is_empty());
    }
}
