//! Session shell
//!
//! Owns the collaborators and routes drained session events to them: the
//! presenter redraws, the audio sink plays, improved high scores are saved
//! and game over requests the summary scene.

use super::{FixedStep, GridPresenter, SceneDirector, SceneId, SpriteLayer};
use crate::audio::{AudioSink, SoundEffect};
use crate::consts::SIM_DT;
use crate::highscores::HighScoreRecord;
use crate::persistence::KeyValueStore;
use crate::settings::Settings;
use crate::sim::{Autopilot, GameEvent, GameOverReport, GameSession, InputEvent};

pub struct Shell<L, A, D> {
    pub layer: L,
    pub audio: A,
    pub director: D,
    store: Box<dyn KeyValueStore>,
    settings: Settings,
    presenter: Option<GridPresenter>,
    clock: FixedStep,
}

impl<L: SpriteLayer, A: AudioSink, D: SceneDirector> Shell<L, A, D> {
    pub fn new(layer: L, mut audio: A, director: D, store: Box<dyn KeyValueStore>) -> Self {
        let settings = Settings::load(store.as_ref());
        audio.configure(&settings);
        Self {
            layer,
            audio,
            director,
            store,
            settings,
            presenter: None,
            clock: FixedStep::new(),
        }
    }

    /// High scores from the store (defaults written back on first run)
    pub fn load_best(&mut self) -> HighScoreRecord {
        HighScoreRecord::load(self.store.as_mut())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Change settings, reconfigure audio and persist
    pub fn update_settings(&mut self, change: impl FnOnce(&mut Settings)) {
        change(&mut self.settings);
        self.audio.configure(&self.settings);
        if let Err(e) = self.settings.save(self.store.as_mut()) {
            log::warn!("Could not save settings: {e}");
        }
    }

    pub fn presenter(&self) -> Option<&GridPresenter> {
        self.presenter.as_ref()
    }

    /// Show a fresh (or restarted) session
    pub fn begin(&mut self, session: &mut GameSession) {
        if let Some(old) = self.presenter.take() {
            old.detach(&mut self.layer);
        }
        session.drain_events();
        self.presenter = Some(GridPresenter::attach(&mut self.layer, session));
        self.clock.reset();
        self.audio.play(SoundEffect::Ui);
        self.director.request_transition(SceneId::Main);
    }

    /// Tear down the grid visuals
    pub fn end(&mut self) {
        if let Some(presenter) = self.presenter.take() {
            presenter.detach(&mut self.layer);
        }
    }

    /// Apply one input immediately
    pub fn input(&mut self, session: &mut GameSession, input: InputEvent) -> Vec<GameEvent> {
        session.handle_input(input);
        self.dispatch(session)
    }

    /// Run the fixed steps owed for `frame_dt` seconds, returning the events
    pub fn frame(
        &mut self,
        session: &mut GameSession,
        frame_dt: f32,
        mut pilot: Option<&mut Autopilot>,
    ) -> Vec<GameEvent> {
        let steps = self.clock.advance(frame_dt);
        for _ in 0..steps {
            if let Some(input) = pilot
                .as_deref_mut()
                .and_then(|p| p.next_input(session, SIM_DT))
            {
                session.handle_input(input);
            }
            session.update(SIM_DT);
        }
        self.dispatch(session)
    }

    /// Drain the session and route every event
    pub fn dispatch(&mut self, session: &mut GameSession) -> Vec<GameEvent> {
        let events = session.drain_events();
        if events.is_empty() {
            return events;
        }
        if let Some(presenter) = &self.presenter {
            presenter.apply(&mut self.layer, session, &events);
        }
        for event in &events {
            if let Some(effect) = SoundEffect::for_event(event) {
                self.audio.play(effect);
            }
            if let GameEvent::GameOver(report) = event {
                self.record(report, session.best());
                self.director.request_transition(SceneId::GameOver);
            }
        }
        events
    }

    fn record(&mut self, report: &GameOverReport, best: HighScoreRecord) {
        if !report.outcome.any() {
            return;
        }
        if let Err(e) = best.save(self.store.as_mut()) {
            log::warn!("Could not save high scores: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RecordingSink;
    use crate::persistence::MemoryStore;
    use crate::platform::{HeadlessLayer, RecordingDirector};
    use crate::sim::{Direction, GamePhase};
    use crate::tuning::Tuning;

    type TestShell = Shell<HeadlessLayer, RecordingSink, RecordingDirector>;

    fn shell() -> TestShell {
        Shell::new(
            HeadlessLayer::new(),
            RecordingSink::default(),
            RecordingDirector::default(),
            Box::new(MemoryStore::new()),
        )
    }

    fn session(shell: &mut TestShell, lives: u32) -> GameSession {
        let best = shell.load_best();
        let tuning = Tuning {
            starting_lives: lives,
            ..Tuning::default()
        };
        let mut session = GameSession::new(tuning, 11, best).unwrap();
        shell.begin(&mut session);
        session
    }

    #[test]
    fn test_begin_attaches_and_enters_main() {
        let mut shell = shell();
        let session = session(&mut shell, 3);
        assert!(shell.presenter().is_some());
        assert_eq!(shell.layer.len(), session.grid().len() + 3);
        assert_eq!(shell.director.requested, vec![SceneId::Main]);
        assert_eq!(shell.audio.played, vec![SoundEffect::Ui]);
    }

    #[test]
    fn test_frames_advance_session() {
        let mut shell = shell();
        let mut session = session(&mut shell, 3);
        let mut events = Vec::new();
        for _ in 0..70 {
            events.extend(shell.frame(&mut session, SIM_DT, None));
        }
        assert_eq!(session.phase(), GamePhase::Playing);
        assert!(events.contains(&GameEvent::PhaseChanged(GamePhase::Playing)));
    }

    #[test]
    fn test_game_over_saves_and_transitions() {
        let mut shell = shell();
        let mut session = session(&mut shell, 1);
        session.update(session.tuning().ready_delay);
        shell.dispatch(&mut session);

        // Score something first so the record improves
        let pos = session.grid().first_pending_target().unwrap();
        let start = session.player();
        for _ in 0..pos.0.abs_diff(start.gx) {
            let dir = if pos.0 > start.gx { Direction::Right } else { Direction::Left };
            shell.input(&mut session, InputEvent::Move(dir));
        }
        for _ in 0..pos.1.abs_diff(start.gy) {
            let dir = if pos.1 > start.gy { Direction::Down } else { Direction::Up };
            shell.input(&mut session, InputEvent::Move(dir));
        }
        shell.input(&mut session, InputEvent::Absorb);
        assert!(session.state().score >= 10);

        while !session.phase().accepts_input() {
            session.update(SIM_DT);
        }
        session.hit();
        session.update(session.tuning().losing_delay);
        shell.dispatch(&mut session);

        assert_eq!(shell.director.requested.last(), Some(&SceneId::GameOver));
        assert!(shell.audio.played.contains(&SoundEffect::Miss));
        let report = session.report().unwrap();
        // Default high level is 5, so only the score can improve here
        assert_eq!(report.outcome.new_high_score, report.score > 10);
        assert_eq!(shell.load_best(), session.best());
    }

    #[test]
    fn test_mute_silences_audio() {
        let mut shell = shell();
        shell.update_settings(|s| s.muted = true);
        let mut session = session(&mut shell, 3);
        session.update(session.tuning().ready_delay);
        shell.input(&mut session, InputEvent::Move(Direction::Left));
        assert!(shell.audio.played.is_empty());
        // Mute survives a reload
        assert!(Settings::load(shell.store.as_ref()).muted);
    }
}
