//! Per-frame mouse snapshot and hover hints for the panel widgets

use super::Rect;
use macroquad::prelude::*;

const HINT_FONT_SIZE: f32 = 13.0;
const HINT_PADDING: f32 = 6.0;

/// Left-button mouse state sampled once per frame
#[derive(Debug, Clone, Copy, Default)]
pub struct MouseState {
    pub x: f32,
    pub y: f32,
    pub left_down: bool,
    /// Went down this frame
    pub left_pressed: bool,
}

impl MouseState {
    /// Sample macroquad's mouse; `was_down` is last frame's `left_down`
    pub fn capture(was_down: bool) -> Self {
        let (x, y) = mouse_position();
        let left_down = is_mouse_button_down(MouseButton::Left);
        Self { x, y, left_down, left_pressed: left_down && !was_down }
    }

    pub fn hovers(&self, rect: &Rect) -> bool {
        rect.contains(self.x, self.y)
    }

    pub fn holds(&self, rect: &Rect) -> bool {
        self.left_down && self.hovers(rect)
    }

    pub fn clicked(&self, rect: &Rect) -> bool {
        self.left_pressed && self.hovers(rect)
    }
}

/// Frame state shared by widgets: the mouse and at most one hover hint
#[derive(Default)]
pub struct UiContext {
    pub mouse: MouseState,
    hint: Option<String>,
}

impl UiContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_frame(&mut self, mouse: MouseState) {
        self.mouse = mouse;
        self.hint = None;
    }

    /// Show `text` next to the cursor this frame; the last caller wins
    pub fn hint(&mut self, text: &str) {
        self.hint = Some(text.to_string());
    }

    /// Draw the hint last so it sits above every widget
    pub fn draw_hint(&self) {
        let Some(text) = &self.hint else {
            return;
        };
        let dims = measure_text(text, None, HINT_FONT_SIZE as u16, 1.0);
        let w = dims.width + HINT_PADDING * 2.0;
        let h = dims.height + HINT_PADDING * 2.0;

        // Below-right of the cursor, flipped when it would leave the window
        let x = (self.mouse.x + 12.0).min(screen_width() - w - 4.0);
        let mut y = self.mouse.y + 20.0;
        if y + h > screen_height() {
            y = self.mouse.y - h - 4.0;
        }

        draw_rectangle(x, y, w, h, Color::from_rgba(30, 30, 35, 240));
        draw_rectangle_lines(x, y, w, h, 1.0, Color::from_rgba(80, 80, 90, 255));
        draw_text(text, x + HINT_PADDING, y + HINT_PADDING + dims.height - 2.0, HINT_FONT_SIZE, Color::from_rgba(220, 220, 220, 255));
    }
}
