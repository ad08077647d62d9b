//! In-memory sprite layer for the native demo and tests

use std::collections::BTreeMap;

use glam::Vec2;

use super::{SpriteLayer, Tint, VisualHandle};

#[derive(Debug, Clone, PartialEq)]
pub struct Visual {
    pub pos: Vec2,
    pub text: String,
    pub tint: Option<Tint>,
}

#[derive(Debug, Default)]
pub struct HeadlessLayer {
    next_id: u32,
    visuals: BTreeMap<VisualHandle, Visual>,
}

impl HeadlessLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.visuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visuals.is_empty()
    }

    pub fn visual(&self, handle: VisualHandle) -> Option<&Visual> {
        self.visuals.get(&handle)
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.visuals.values().map(|v| v.text.as_str())
    }

    /// Text dump, one line per screen row, player cell in brackets
    pub fn render_ascii(&self) -> String {
        let is_player = |v: &Visual| matches!(v.tint, Some(Tint::Player | Tint::Hurt));
        let players: Vec<Vec2> = self
            .visuals
            .values()
            .filter(|v| is_player(v))
            .map(|v| v.pos)
            .collect();

        let mut rows: BTreeMap<i64, Vec<(i64, String)>> = BTreeMap::new();
        for visual in self.visuals.values().filter(|v| !is_player(v)) {
            let label = if visual.text.is_empty() {
                ".".to_string()
            } else {
                visual.text.clone()
            };
            let label = if players.contains(&visual.pos) {
                format!("[{label}]")
            } else {
                label
            };
            rows.entry(visual.pos.y.round() as i64)
                .or_default()
                .push((visual.pos.x.round() as i64, label));
        }

        let mut out = String::new();
        for (_, mut row) in rows {
            row.sort_by_key(|(x, _)| *x);
            let line: Vec<String> = row.into_iter().map(|(_, label)| format!("{label:>12}")).collect();
            out.push_str(line.join("").trim_end());
            out.push('\n');
        }
        out
    }
}

impl SpriteLayer for HeadlessLayer {
    fn create_cell_visual(&mut self, pos: Vec2) -> VisualHandle {
        let handle = VisualHandle(self.next_id);
        self.next_id += 1;
        self.visuals.insert(
            handle,
            Visual {
                pos,
                text: String::new(),
                tint: None,
            },
        );
        handle
    }

    fn destroy_visual(&mut self, handle: VisualHandle) {
        if self.visuals.remove(&handle).is_none() {
            log::warn!("Destroying unknown visual {handle:?}");
        }
    }

    fn set_text(&mut self, handle: VisualHandle, text: &str) {
        if let Some(v) = self.visuals.get_mut(&handle) {
            v.text.clear();
            v.text.push_str(text);
        }
    }

    fn set_tint(&mut self, handle: VisualHandle, tint: Tint) {
        if let Some(v) = self.visuals.get_mut(&handle) {
            v.tint = Some(tint);
        }
    }

    fn move_visual(&mut self, handle: VisualHandle, pos: Vec2) {
        if let Some(v) = self.visuals.get_mut(&handle) {
            v.pos = pos;
        }
    }
}
