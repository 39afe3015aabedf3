//! Basic UI widgets

use macroquad::prelude::*;
use super::{Rect, UiContext};

/// Accent color (cyan)
pub const ACCENT_COLOR: Color = Color::new(0.0, 0.75, 0.9, 1.0);
pub const LABEL_COLOR: Color = Color::new(0.6, 0.6, 0.65, 1.0);
pub const TEXT_COLOR: Color = Color::new(0.9, 0.9, 0.9, 1.0);

const FONT_SIZE: f32 = 14.0;
const ROW_HEIGHT: f32 = 24.0;

/// Vertical layout helper for a side panel
pub struct Panel {
    rect: Rect,
    cursor_y: f32,
    spacing: f32,
}

impl Panel {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            cursor_y: rect.y + 8.0,
            spacing: 6.0,
        }
    }

    fn next_row(&mut self, h: f32) -> Rect {
        let row = Rect::new(self.rect.x + 8.0, self.cursor_y.round(), self.rect.w - 16.0, h);
        self.cursor_y += h + self.spacing;
        row
    }

    /// Section heading
    pub fn heading(&mut self, text: &str) {
        let row = self.next_row(ROW_HEIGHT);
        draw_text(text, row.x, row.bottom() - 6.0, 16.0, ACCENT_COLOR);
    }

    /// Plain text line
    pub fn label(&mut self, text: &str) {
        let row = self.next_row(16.0);
        draw_text(text, row.x, row.bottom() - 3.0, FONT_SIZE, LABEL_COLOR);
    }

    /// `label  [-] value [+]`, returns -1, 0 or +1
    pub fn stepper(&mut self, ctx: &mut UiContext, label: &str, value: &str) -> i32 {
        let row = self.next_row(ROW_HEIGHT);
        draw_text(label, row.x, row.bottom() - 7.0, FONT_SIZE, LABEL_COLOR);

        let btn = ROW_HEIGHT;
        let plus = Rect::new(row.right() - btn, row.y, btn, btn);
        let value_rect = Rect::new(plus.x - 64.0, row.y, 64.0, btn);
        let minus = Rect::new(value_rect.x - btn, row.y, btn, btn);

        let dims = measure_text(value, None, FONT_SIZE as u16, 1.0);
        draw_text(
            value,
            (value_rect.x + (value_rect.w - dims.width) / 2.0).round(),
            row.bottom() - 7.0,
            FONT_SIZE,
            TEXT_COLOR,
        );

        let dec = text_button(ctx, minus, "-", "", false);
        let inc = text_button(ctx, plus, "+", "", false);
        inc as i32 - dec as i32
    }

    /// Row of mutually exclusive options, returns the clicked index
    pub fn options(&mut self, ctx: &mut UiContext, label: &str, options: &[String], selected: usize) -> Option<usize> {
        self.label(label);
        let row = self.next_row(ROW_HEIGHT);
        let count = options.len().max(1) as f32;
        let w = ((row.w - (count - 1.0) * 4.0) / count).floor();

        let mut clicked = None;
        for (i, option) in options.iter().enumerate() {
            let r = Rect::new(row.x + i as f32 * (w + 4.0), row.y, w, row.h);
            if text_button(ctx, r, option, "", i == selected) {
                clicked = Some(i);
            }
        }
        clicked
    }

    /// Full-width button
    pub fn button(&mut self, ctx: &mut UiContext, text: &str, tooltip: &str) -> bool {
        let row = self.next_row(ROW_HEIGHT + 4.0);
        text_button(ctx, row, text, tooltip, false)
    }
}

/// Draw a flat text button, returns true if clicked
pub fn text_button(ctx: &mut UiContext, rect: Rect, text: &str, tooltip: &str, is_active: bool) -> bool {
    let hovered = ctx.mouse.hovers(&rect);
    let pressed = ctx.mouse.holds(&rect);
    let clicked = ctx.mouse.clicked(&rect);

    if hovered && !tooltip.is_empty() {
        ctx.hint(tooltip);
    }

    let corner_radius = 4.0;
    let bg = if is_active {
        ACCENT_COLOR
    } else if pressed {
        Color::from_rgba(60, 60, 70, 255)
    } else if hovered {
        Color::from_rgba(50, 50, 60, 255)
    } else {
        Color::from_rgba(38, 38, 44, 255)
    };
    draw_rounded_rect(rect.x, rect.y, rect.w, rect.h, corner_radius, bg);

    let text_color = if is_active { WHITE } else { TEXT_COLOR };
    let dims = measure_text(text, None, FONT_SIZE as u16, 1.0);
    // Round to integer pixels for crisp text
    draw_text(
        text,
        (rect.x + (rect.w - dims.width) / 2.0).round(),
        (rect.y + (rect.h + dims.height) / 2.0).round(),
        FONT_SIZE,
        text_color,
    );

    clicked
}

/// Draw a rounded rectangle (simple approximation using overlapping rects)
fn draw_rounded_rect(x: f32, y: f32, w: f32, h: f32, r: f32, color: Color) {
    draw_rectangle(x + r, y, w - r * 2.0, h, color);
    draw_rectangle(x, y + r, w, h - r * 2.0, color);
    draw_circle(x + r, y + r, r, color);
    draw_circle(x + w - r, y + r, r, color);
    draw_circle(x + r, y + h - r, r, color);
    draw_circle(x + w - r, y + h - r, r, color);
}
