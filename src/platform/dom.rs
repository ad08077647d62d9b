//! DOM-backed sprite layer and scene director (wasm32)

use std::collections::HashMap;

use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use super::{SceneDirector, SceneId, SpriteLayer, Tint, VisualHandle};
use crate::consts::CELL_DIMS;

/// Absolutely positioned `div`s inside a container element
pub struct DomLayer {
    document: Document,
    root: Element,
    next_id: u32,
    nodes: HashMap<VisualHandle, HtmlElement>,
}

impl DomLayer {
    /// Attach to the element with id `root_id`
    pub fn new(document: Document, root_id: &str) -> Option<Self> {
        let root = document.get_element_by_id(root_id)?;
        Some(Self {
            document,
            root,
            next_id: 0,
            nodes: HashMap::new(),
        })
    }

    fn place(node: &HtmlElement, pos: Vec2) {
        let style = node.style();
        let _ = style.set_property("left", &format!("{}px", pos.x - CELL_DIMS / 2.0));
        let _ = style.set_property("top", &format!("{}px", pos.y - CELL_DIMS / 2.0));
    }
}

impl SpriteLayer for DomLayer {
    fn create_cell_visual(&mut self, pos: Vec2) -> VisualHandle {
        let handle = VisualHandle(self.next_id);
        self.next_id += 1;

        let node = self
            .document
            .create_element("div")
            .ok()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());
        let Some(node) = node else {
            log::warn!("Could not create element for {handle:?}");
            return handle;
        };
        let _ = node.set_attribute("class", "cell");
        let _ = node.style().set_property("position", "absolute");
        Self::place(&node, pos);
        let _ = self.root.append_child(&node);
        self.nodes.insert(handle, node);
        handle
    }

    fn destroy_visual(&mut self, handle: VisualHandle) {
        if let Some(node) = self.nodes.remove(&handle) {
            node.remove();
        }
    }

    fn set_text(&mut self, handle: VisualHandle, text: &str) {
        if let Some(node) = self.nodes.get(&handle) {
            node.set_text_content(Some(text));
        }
    }

    fn set_tint(&mut self, handle: VisualHandle, tint: Tint) {
        if let Some(node) = self.nodes.get(&handle) {
            let _ = node.style().set_property("color", &tint.css());
            if matches!(tint, Tint::Player | Tint::Hurt) {
                let _ = node.set_attribute("class", "cell player");
            }
        }
    }

    fn move_visual(&mut self, handle: VisualHandle, pos: Vec2) {
        if let Some(node) = self.nodes.get(&handle) {
            Self::place(node, pos);
        }
    }
}

/// Shows one scene container at a time by toggling the `hidden` class
pub struct DomDirector {
    document: Document,
}

impl DomDirector {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    fn element_id(scene: SceneId) -> &'static str {
        match scene {
            SceneId::Start => "start-screen",
            SceneId::Main => "board-screen",
            SceneId::GameOver => "game-over",
        }
    }
}

impl SceneDirector for DomDirector {
    fn request_transition(&mut self, scene: SceneId) {
        for other in [SceneId::Start, SceneId::Main, SceneId::GameOver] {
            if let Some(el) = self.document.get_element_by_id(Self::element_id(other)) {
                let class = if other == scene { "" } else { "hidden" };
                let _ = el.set_attribute("class", class);
            }
        }
        log::info!("Scene: {scene:?}");
    }
}
