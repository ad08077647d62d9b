//! Game session state machine
//!
//! Owns the grid, the player, the combo tracker and the session scalars, and
//! advances the Ready / Playing / Losing / GameOver cycle. Nothing here talks
//! to a platform: everything observable is pushed onto the event queue.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::combo::ComboTracker;
use super::criteria::Criteria;
use super::generator::{GenContext, RegenReport, regenerate};
use super::grid::Grid;
use super::progression::{LevelConfig, next_level_config};
use super::state::{
    Direction, GameEvent, GameOverReport, GamePhase, InputEvent, Player, SessionState,
};
use super::timer::Timer;
use crate::consts::PLAYER_START;
use crate::highscores::HighScoreRecord;
use crate::tuning::{Tuning, TuningError};

/// Result of an absorb attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbsorbOutcome {
    /// Not playing
    Ignored,
    /// Cell was already absorbed
    AlreadyAbsorbed,
    Hit { points: u64 },
    /// Wrong cell, a life was lost
    Miss,
    /// Last target taken, next level loaded
    LevelComplete { points: u64 },
}

pub struct GameSession {
    tuning: Tuning,
    seed: u64,
    rng: Pcg32,
    state: SessionState,
    grid: Grid,
    player: Player,
    level_config: LevelConfig,
    criteria: Criteria,
    combo: ComboTracker,
    /// Pending Ready or Losing transition
    phase_timer: Option<Timer>,
    best: HighScoreRecord,
    report: Option<GameOverReport>,
    events: Vec<GameEvent>,
}

impl GameSession {
    /// Start a session at level 1 in the Ready phase
    pub fn new(tuning: Tuning, seed: u64, best: HighScoreRecord) -> Result<Self, TuningError> {
        tuning.validate()?;
        Ok(Self::start(tuning, seed, best))
    }

    fn start(tuning: Tuning, seed: u64, best: HighScoreRecord) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let state = SessionState::new(&tuning);
        let level_config = next_level_config(state.level, state.max_number(), &mut rng);
        let grid = Grid::new(tuning.grid_width, tuning.grid_height);
        let player = Player::spawn(PLAYER_START, tuning.grid_width, tuning.grid_height);
        let combo = ComboTracker::new(tuning.combo_timer_max, tuning.combo_decay_interval);

        let mut session = Self {
            criteria: level_config.criteria(),
            tuning,
            seed,
            rng,
            state,
            grid,
            player,
            level_config,
            combo,
            phase_timer: None,
            best,
            report: None,
            events: Vec::new(),
        };
        session.regenerate_grid();
        session.enter_phase(GamePhase::Ready);
        log::info!(
            "Session started (seed {seed}): level 1, '{}'",
            session.criteria.describe()
        );
        session
    }

    /// Fresh session with the same tuning and high-score record
    pub fn restart(&mut self, seed: u64) {
        let tuning = self.tuning.clone();
        *self = Self::start(tuning, seed, self.best);
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn player(&self) -> Player {
        self.player
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    pub fn level_config(&self) -> &LevelConfig {
        &self.level_config
    }

    pub fn combo(&self) -> &ComboTracker {
        &self.combo
    }

    pub fn best(&self) -> HighScoreRecord {
        self.best
    }

    /// Set once the session is over
    pub fn report(&self) -> Option<&GameOverReport> {
        self.report.as_ref()
    }

    pub fn is_over(&self) -> bool {
        self.state.phase == GamePhase::GameOver
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn handle_input(&mut self, input: InputEvent) {
        match input {
            InputEvent::Move(direction) => {
                self.move_player(direction);
            }
            InputEvent::Absorb => {
                self.absorb();
            }
        }
    }

    /// Advance timers by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        match self.state.phase {
            GamePhase::GameOver => return,
            GamePhase::Playing => self.combo.update(dt),
            GamePhase::Ready | GamePhase::Losing => {}
        }

        let fired = self
            .phase_timer
            .as_mut()
            .is_some_and(|timer| timer.tick(dt) > 0);
        if !fired {
            return;
        }
        self.phase_timer = None;

        match self.state.phase {
            GamePhase::Ready => self.enter_phase(GamePhase::Playing),
            GamePhase::Losing if self.state.lives == 0 => self.game_over(),
            GamePhase::Losing => self.enter_phase(GamePhase::Ready),
            GamePhase::Playing | GamePhase::GameOver => {}
        }
    }

    /// Step the player one cell, returns whether it moved
    pub fn move_player(&mut self, direction: Direction) -> bool {
        if !self.state.phase.accepts_input() {
            return false;
        }
        let next = self
            .player
            .stepped(direction, self.grid.width(), self.grid.height());
        if next == self.player {
            return false;
        }
        self.events.push(GameEvent::Moved {
            from: (self.player.gx, self.player.gy),
            to: (next.gx, next.gy),
        });
        self.player = next;
        true
    }

    /// Absorb the cell under the player
    pub fn absorb(&mut self) -> AbsorbOutcome {
        if !self.state.phase.accepts_input() {
            return AbsorbOutcome::Ignored;
        }
        let Player { gx, gy } = self.player;
        let Some(cell) = self.grid.get_mut(gx, gy) else {
            return AbsorbOutcome::Ignored;
        };
        if cell.absorbed {
            return AbsorbOutcome::AlreadyAbsorbed;
        }
        if !cell.is_target {
            log::debug!("Absorbed {} at ({gx}, {gy}): not a target", cell.display);
            self.lose_life();
            return AbsorbOutcome::Miss;
        }

        cell.absorbed = true;
        let points = self
            .tuning
            .base_score
            .saturating_mul(u64::from(self.combo.count()));
        self.state.score = self.state.score.saturating_add(points);
        self.combo.hit();
        self.events.push(GameEvent::Absorbed {
            x: gx,
            y: gy,
            points,
            combo: self.combo.count(),
        });
        self.check_extend();

        if self.grid.is_cleared() {
            self.level_up();
            return AbsorbOutcome::LevelComplete { points };
        }
        AbsorbOutcome::Hit { points }
    }

    /// Projectile collision with the player
    pub fn hit(&mut self) -> bool {
        if !self.state.phase.accepts_input() {
            return false;
        }
        self.lose_life();
        true
    }

    /// Grant an extra life for every threshold the score has passed
    pub fn check_extend(&mut self) {
        while self.state.score >= self.state.next_extend {
            self.state.lives = self.state.lives.saturating_add(1);
            self.state.next_extend = self
                .state
                .next_extend
                .saturating_add(self.tuning.extend_every);
            log::info!("Extend! {} lives", self.state.lives);
            self.events.push(GameEvent::Extend {
                lives: self.state.lives,
            });
            if self.state.next_extend == u64::MAX {
                break;
            }
        }
    }

    fn lose_life(&mut self) {
        self.state.lives = self.state.lives.saturating_sub(1);
        self.combo.miss();
        log::info!("Life lost, {} left", self.state.lives);
        self.events.push(GameEvent::Missed {
            lives: self.state.lives,
        });
        self.enter_phase(GamePhase::Losing);
    }

    fn level_up(&mut self) {
        self.state.level = self.state.level.saturating_add(1);
        self.state.difficulty.escalate(&self.tuning);
        self.level_config =
            next_level_config(self.state.level, self.state.max_number(), &mut self.rng);
        let report = self.regenerate_grid();

        let criteria = self.criteria.describe();
        log::info!(
            "Level {}: '{}' in [{}, {}), {}/{} targets",
            self.state.level,
            criteria,
            self.level_config.range_min,
            self.level_config.range_max,
            report.targets,
            report.total
        );
        self.events.push(GameEvent::LevelUp {
            level: self.state.level,
            criteria,
        });
        self.enter_phase(GamePhase::Ready);
    }

    fn regenerate_grid(&mut self) -> RegenReport {
        let config = self.level_config;
        self.criteria = config.criteria();
        let mut ctx = GenContext {
            tuning: &self.tuning,
            deviation: self.state.expression_deviation(),
            rng: &mut self.rng,
        };
        let report = regenerate(
            &mut self.grid,
            &self.criteria,
            config.range_min,
            config.range_max,
            config.force_target,
            &mut ctx,
        );
        self.events.push(GameEvent::GridRegenerated);
        report
    }

    fn enter_phase(&mut self, phase: GamePhase) {
        self.state.phase = phase;
        self.phase_timer = match phase {
            GamePhase::Ready => Some(Timer::once(self.tuning.ready_delay)),
            GamePhase::Losing => Some(Timer::once(self.tuning.losing_delay)),
            GamePhase::Playing | GamePhase::GameOver => None,
        };
        self.events.push(GameEvent::PhaseChanged(phase));
    }

    fn game_over(&mut self) {
        if self.report.is_some() {
            return;
        }
        let outcome = self.best.submit(self.state.score, self.state.level);
        let report = GameOverReport {
            score: self.state.score,
            level: self.state.level,
            high_score: self.best.high_score,
            high_level: self.best.high_level,
            outcome,
        };
        log::info!(
            "Game over: score {}, level {} (new high score: {}, new high level: {})",
            report.score,
            report.level,
            outcome.new_high_score,
            outcome.new_high_level
        );
        self.report = Some(report);
        self.enter_phase(GamePhase::GameOver);
        self.events.push(GameEvent::GameOver(report));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(tuning: Tuning) -> GameSession {
        GameSession::new(tuning, 42, HighScoreRecord::default()).unwrap()
    }

    fn playing(tuning: Tuning) -> GameSession {
        let mut session = session_with(tuning);
        let delay = session.tuning.ready_delay;
        session.update(delay);
        assert_eq!(session.phase(), GamePhase::Playing);
        session.drain_events();
        session
    }

    fn first_cell(session: &GameSession, want_target: bool) -> (usize, usize) {
        session
            .grid
            .iter()
            .find(|(_, cell)| cell.is_target == want_target && !cell.absorbed)
            .map(|(pos, _)| pos)
            .unwrap()
    }

    fn stand_on(session: &mut GameSession, (gx, gy): (usize, usize)) {
        session.player = Player { gx, gy };
    }

    /// Make sure the grid has at least one non-target
    fn ensure_non_target(session: &mut GameSession) -> (usize, usize) {
        if session.grid.target_count() == session.grid.len() {
            let cell = session.grid.get_mut(0, 0).unwrap();
            cell.is_target = false;
        }
        first_cell(session, false)
    }

    #[test]
    fn test_new_rejects_invalid_tuning() {
        let tuning = Tuning {
            grid_width: 0,
            ..Tuning::default()
        };
        assert!(GameSession::new(tuning, 1, HighScoreRecord::default()).is_err());
    }

    #[test]
    fn test_starts_in_ready_then_plays() {
        let mut session = session_with(Tuning::default());
        assert_eq!(session.phase(), GamePhase::Ready);
        assert_eq!(session.state().level, 1);
        assert_eq!(session.state().lives, 3);
        assert_eq!(session.player(), Player { gx: 2, gy: 2 });
        assert!(session.grid().target_density() >= session.tuning.min_grid_threshold);

        let events = session.drain_events();
        assert!(events.contains(&GameEvent::GridRegenerated));
        assert!(events.contains(&GameEvent::PhaseChanged(GamePhase::Ready)));

        session.update(0.5);
        assert_eq!(session.phase(), GamePhase::Ready);
        session.update(0.5);
        assert_eq!(session.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_input_ignored_outside_playing() {
        let mut session = session_with(Tuning::default());
        assert!(!session.move_player(Direction::Left));
        assert_eq!(session.absorb(), AbsorbOutcome::Ignored);
        assert!(!session.hit());
        assert_eq!(session.state().lives, 3);
    }

    #[test]
    fn test_move_clamps_and_reports() {
        let mut session = playing(Tuning::default());
        stand_on(&mut session, (0, 0));
        assert!(!session.move_player(Direction::Up));
        assert!(session.move_player(Direction::Right));
        assert_eq!(
            session.drain_events(),
            vec![GameEvent::Moved {
                from: (0, 0),
                to: (1, 0)
            }]
        );
    }

    #[test]
    fn test_combo_scoring() {
        let mut session = playing(Tuning::default());
        session.combo.hit();
        session.combo.hit();
        assert_eq!(session.combo().count(), 3);

        // Keep a second target around so the level does not end
        let pos = first_cell(&session, true);
        if session.grid.remaining_targets() == 1 {
            let spare = first_cell(&session, false);
            session.grid.get_mut(spare.0, spare.1).unwrap().is_target = true;
        }
        stand_on(&mut session, pos);
        let score_before = session.state().score;

        assert_eq!(session.absorb(), AbsorbOutcome::Hit { points: 30 });
        assert_eq!(session.state().score, score_before + 30);
        assert_eq!(session.combo().count(), 4);
        assert_eq!(session.combo().timer(), session.tuning.combo_timer_max);
        assert!(session.grid().get(pos.0, pos.1).unwrap().absorbed);

        assert_eq!(session.absorb(), AbsorbOutcome::AlreadyAbsorbed);
        assert_eq!(session.state().score, score_before + 30);
    }

    #[test]
    fn test_last_life_ends_in_single_game_over() {
        let tuning = Tuning {
            starting_lives: 1,
            ..Tuning::default()
        };
        let mut session = playing(tuning);
        session.state.score = 120;
        let wrong = ensure_non_target(&mut session);
        stand_on(&mut session, wrong);

        assert_eq!(session.absorb(), AbsorbOutcome::Miss);
        assert_eq!(session.state().lives, 0);
        assert_eq!(session.phase(), GamePhase::Losing);
        assert_eq!(session.combo().count(), 1);

        for _ in 0..120 {
            session.update(crate::consts::SIM_DT);
        }
        assert_eq!(session.phase(), GamePhase::GameOver);

        let game_overs: Vec<_> = session
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::GameOver(report) => Some(report),
                _ => None,
            })
            .collect();
        assert_eq!(game_overs.len(), 1);
        let report = game_overs[0];
        assert_eq!(report.score, 120);
        assert!(report.outcome.new_high_score);
        assert!(!report.outcome.new_high_level);
        assert_eq!(session.best().high_score, 120);
        assert_eq!(session.report(), Some(&report));

        // Terminal: nothing moves the session anymore
        session.update(10.0);
        assert!(!session.hit());
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_miss_returns_to_ready_with_same_grid() {
        let mut session = playing(Tuning::default());
        let before = session.grid.clone();
        assert!(session.hit());
        assert_eq!(session.state().lives, 2);
        assert_eq!(session.phase(), GamePhase::Losing);

        session.update(session.tuning.losing_delay);
        assert_eq!(session.phase(), GamePhase::Ready);
        session.update(session.tuning.ready_delay);
        assert_eq!(session.phase(), GamePhase::Playing);
        assert_eq!(session.grid, before);
    }

    #[test]
    fn test_clearing_grid_levels_up() {
        let mut session = playing(Tuning::default());
        let old_max = session.state().max_number();
        while let Some(pos) = session.grid.first_pending_target() {
            stand_on(&mut session, pos);
            let outcome = session.absorb();
            assert!(matches!(
                outcome,
                AbsorbOutcome::Hit { .. } | AbsorbOutcome::LevelComplete { .. }
            ));
            if matches!(outcome, AbsorbOutcome::LevelComplete { .. }) {
                break;
            }
        }

        assert_eq!(session.state().level, 2);
        assert_eq!(session.phase(), GamePhase::Ready);
        assert!(session.state().max_number() > old_max);
        assert!(session.grid().cells().iter().all(|c| !c.absorbed));
        assert!(session.grid().target_density() >= session.tuning.min_grid_threshold);

        let events = session.drain_events();
        assert!(
            events
                .iter()
                .any(|e| matches!(e, GameEvent::LevelUp { level: 2, .. }))
        );
        assert!(events.contains(&GameEvent::GridRegenerated));
    }

    #[test]
    fn test_extend_grants_lives_per_threshold() {
        let mut session = playing(Tuning::default());
        session.state.score = 2500;
        session.check_extend();
        assert_eq!(session.state().lives, 5);
        assert_eq!(session.state().next_extend, 3000);
        let extends = session
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::Extend { .. }))
            .count();
        assert_eq!(extends, 2);

        session.check_extend();
        assert_eq!(session.state().lives, 5);
    }

    #[test]
    fn test_combo_only_decays_while_playing() {
        let mut session = playing(Tuning::default());
        session.combo.hit();
        session.combo.hit();
        session.hit();
        assert_eq!(session.combo().count(), 1);

        session.update(session.tuning.losing_delay);
        session.combo.hit();
        let timer = session.combo().timer();
        session.update(0.25);
        assert_eq!(session.combo().timer(), timer);
    }

    #[test]
    fn test_huge_step_during_combo_decay() {
        let mut session = playing(Tuning::default());
        session.combo.hit();
        session.combo.hit();
        session.update(5.0);
        assert_eq!(session.phase(), GamePhase::Playing);

        session.update(1.0e8);
        assert_eq!(session.combo().count(), 1);
        assert_eq!(session.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_same_seed_same_session() {
        let a = session_with(Tuning::default());
        let b = session_with(Tuning::default());
        assert_eq!(a.grid, b.grid);
        assert_eq!(a.level_config(), b.level_config());
    }

    #[test]
    fn test_restart_keeps_best_and_resets_state() {
        let mut session = playing(Tuning {
            starting_lives: 1,
            ..Tuning::default()
        });
        session.state.score = 500;
        session.hit();
        session.update(session.tuning.losing_delay);
        assert!(session.is_over());

        session.restart(7);
        assert_eq!(session.phase(), GamePhase::Ready);
        assert_eq!(session.state().score, 0);
        assert_eq!(session.state().lives, 1);
        assert_eq!(session.best().high_score, 500);
        assert!(session.report().is_none());
        assert_eq!(session.seed(), 7);
    }

    #[test]
    fn test_handle_input_routes_actions() {
        let mut session = playing(Tuning::default());
        stand_on(&mut session, (2, 2));
        session.handle_input(InputEvent::Move(Direction::Down));
        assert_eq!(session.player(), Player { gx: 2, gy: 3 });
        session.handle_input(InputEvent::Absorb);
        let cell = session.grid().get(2, 3).unwrap();
        if cell.is_target {
            assert!(cell.absorbed);
        } else {
            assert_eq!(session.phase(), GamePhase::Losing);
        }
    }
}
