//! Platform abstraction layer
//!
//! The session only emits events. Everything that touches a screen, a
//! speaker or a scene manager sits behind the traits in this module:
//! - `SpriteLayer`: cell/player visuals and text
//! - `SceneDirector`: scene transitions
//! - `AudioSink` (in `crate::audio`) and `KeyValueStore` (in `crate::persistence`)

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub mod clock;
pub mod headless;
pub mod presenter;
pub mod shell;

#[cfg(target_arch = "wasm32")]
pub mod dom;

pub use clock::FixedStep;
pub use headless::HeadlessLayer;
pub use presenter::GridPresenter;
pub use shell::Shell;

/// Opaque id for a visual owned by a sprite layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VisualHandle(pub u32);

/// Color roles, resolved to RGB by the layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tint {
    /// Untouched cell
    Cell,
    /// Cell already absorbed
    Absorbed,
    Player,
    /// Player during the Losing pause
    Hurt,
    /// Criteria line and other HUD text
    Hud,
}

impl Tint {
    /// 0xRRGGBB
    pub fn rgb(self) -> u32 {
        match self {
            Tint::Cell => 0x000000,
            Tint::Absorbed => 0x3a3a5a,
            Tint::Player => 0x00ff00,
            Tint::Hurt => 0xff006e,
            Tint::Hud => 0x00ffff,
        }
    }

    /// CSS hex color
    pub fn css(self) -> String {
        format!("#{:06x}", self.rgb())
    }
}

/// Retained-mode sprite/text surface
pub trait SpriteLayer {
    /// New visual centered on `pos` (screen pixels)
    fn create_cell_visual(&mut self, pos: Vec2) -> VisualHandle;
    fn destroy_visual(&mut self, handle: VisualHandle);
    fn set_text(&mut self, handle: VisualHandle, text: &str);
    fn set_tint(&mut self, handle: VisualHandle, tint: Tint);
    fn move_visual(&mut self, handle: VisualHandle, pos: Vec2);
}

/// Scenes of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SceneId {
    /// Title screen and tutorial
    Start,
    /// The grid
    Main,
    /// Score summary, play again
    GameOver,
}

pub trait SceneDirector {
    fn request_transition(&mut self, scene: SceneId);
}

/// Director that records every requested transition in order
#[derive(Debug, Default, Clone)]
pub struct RecordingDirector {
    pub requested: Vec<SceneId>,
}

impl SceneDirector for RecordingDirector {
    fn request_transition(&mut self, scene: SceneId) {
        log::info!("Scene transition requested: {scene:?}");
        self.requested.push(scene);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tint_css() {
        assert_eq!(Tint::Hud.css(), "#00ffff");
        assert_eq!(Tint::Cell.css(), "#000000");
    }

    #[test]
    fn test_recording_director_keeps_every_request() {
        let mut director = RecordingDirector::default();
        director.request_transition(SceneId::Main);
        director.request_transition(SceneId::GameOver);
        assert_eq!(director.requested, vec![SceneId::Main, SceneId::GameOver]);
    }
}
