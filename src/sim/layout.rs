//! Layout metrics derived from the surface size
//!
//! Nothing here is a fixed pixel constant except the frame border: every size
//! scales with the host surface so a resize re-derives the whole playfield.

use std::ops::RangeInclusive;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::FRAME_WIDTH;

/// Axis-aligned rectangle in surface pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Grow by `amount` on every side
    pub fn inflate(&self, amount: f32) -> Self {
        Self::new(
            self.x - amount,
            self.y - amount,
            self.w + amount * 2.0,
            self.h + amount * 2.0,
        )
    }
}

/// Playfield metrics for one surface size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub width: f32,
    pub height: f32,
    pub cols: usize,
    pub rows: usize,
    pub ball_radius: f32,
    pub paddle_width: f32,
    pub paddle_height: f32,
    pub initial_speed: f32,
    pub brick_width: f32,
    pub brick_height: f32,
    pub brick_padding: f32,
    pub brick_offset_left: f32,
    pub brick_offset_top: f32,
}

impl Layout {
    /// Derive all metrics for a `width` x `height` surface and a `cols` x `rows` grid
    pub fn new(width: f32, height: f32, cols: usize, rows: usize) -> Self {
        let cols_f = cols.max(1) as f32;
        let rows_f = rows.max(1) as f32;

        let brick_padding = width / 100.0;
        let brick_area_height = height * 0.5;
        let usable_width = width - FRAME_WIDTH * 2.0;

        let brick_width = (usable_width - (cols_f - 1.0) * brick_padding) / cols_f;
        let brick_height = (brick_area_height - (rows_f - 1.0) * brick_padding) / rows_f;
        let grid_width = cols_f * brick_width + (cols_f - 1.0) * brick_padding;

        Self {
            width,
            height,
            cols,
            rows,
            ball_radius: width / 45.0,
            paddle_width: width / 7.0,
            paddle_height: height / 35.0,
            initial_speed: width / 130.0,
            brick_width,
            brick_height,
            brick_padding,
            brick_offset_left: (width - grid_width) / 2.0,
            brick_offset_top: height / 25.0,
        }
    }

    /// Layout for a surface that has not been sized yet
    pub fn pending(cols: usize, rows: usize) -> Self {
        Self::new(0.0, 0.0, cols, rows)
    }

    /// Whether the surface has a usable size
    pub fn is_ready(&self) -> bool {
        self.width > FRAME_WIDTH * 2.0 && self.height > FRAME_WIDTH * 2.0 && self.brick_width > 0.0
    }

    /// Horizontal distance between neighbouring brick origins
    pub fn pitch_x(&self) -> f32 {
        self.brick_width + self.brick_padding
    }

    /// Vertical distance between neighbouring brick origins
    pub fn pitch_y(&self) -> f32 {
        self.brick_height + self.brick_padding
    }

    /// World rectangle of brick cell `(c, r)`
    pub fn brick_rect(&self, c: usize, r: usize) -> Rect {
        Rect::new(
            c as f32 * self.pitch_x() + self.brick_offset_left,
            r as f32 * self.pitch_y() + self.brick_offset_top,
            self.brick_width,
            self.brick_height,
        )
    }

    /// Inclusive cell ranges overlapped by `bounds`, or `None` if it misses the grid
    pub fn cells_overlapping(
        &self,
        bounds: Rect,
    ) -> Option<(RangeInclusive<usize>, RangeInclusive<usize>)> {
        if self.cols == 0 || self.rows == 0 || self.pitch_x() <= 0.0 || self.pitch_y() <= 0.0 {
            return None;
        }
        let start_col = ((bounds.x - self.brick_offset_left) / self.pitch_x()).floor().max(0.0);
        let end_col = ((bounds.right() - self.brick_offset_left) / self.pitch_x())
            .ceil()
            .min((self.cols - 1) as f32);
        let start_row = ((bounds.y - self.brick_offset_top) / self.pitch_y()).floor().max(0.0);
        let end_row = ((bounds.bottom() - self.brick_offset_top) / self.pitch_y())
            .ceil()
            .min((self.rows - 1) as f32);

        if end_col < start_col || end_row < start_row {
            return None;
        }
        Some((
            start_col as usize..=end_col as usize,
            start_row as usize..=end_row as usize,
        ))
    }

    /// Left edge a ball may touch
    pub fn wall_left(&self) -> f32 {
        FRAME_WIDTH
    }

    /// Right edge a ball may touch
    pub fn wall_right(&self) -> f32 {
        self.width - FRAME_WIDTH
    }

    /// Ceiling a ball may touch
    pub fn wall_top(&self) -> f32 {
        FRAME_WIDTH
    }

    /// Top edge of the paddle band
    pub fn paddle_top(&self, paddle_height: f32) -> f32 {
        self.height - paddle_height
    }

    /// Legal range of the paddle's left edge
    pub fn paddle_x_range(&self, paddle_width: f32) -> (f32, f32) {
        let usable_width = self.width - FRAME_WIDTH * 2.0;
        (FRAME_WIDTH, usable_width - paddle_width + FRAME_WIDTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_scale_with_surface() {
        let small = Layout::new(650.0, 700.0, 12, 10);
        let big = Layout::new(1300.0, 1400.0, 12, 10);
        assert!((big.ball_radius - small.ball_radius * 2.0).abs() < 1e-4);
        assert!((big.paddle_width - small.paddle_width * 2.0).abs() < 1e-4);
        assert!((small.initial_speed - 5.0).abs() < 1e-4);
        assert!((small.paddle_height - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_grid_is_centered() {
        let layout = Layout::new(800.0, 600.0, 12, 10);
        let first = layout.brick_rect(0, 0);
        let last = layout.brick_rect(11, 0);
        let left_gap = first.x;
        let right_gap = layout.width - last.right();
        assert!((left_gap - right_gap).abs() < 1e-3);
        assert!((left_gap - FRAME_WIDTH).abs() < 1e-3);
    }

    #[test]
    fn test_cells_overlapping_is_local() {
        let layout = Layout::new(800.0, 600.0, 12, 10);
        let cell = layout.brick_rect(4, 3);
        let probe = Rect::new(cell.center().x - 2.0, cell.center().y - 2.0, 4.0, 4.0);
        let (cols, rows) = layout.cells_overlapping(probe).unwrap();
        assert!(cols.contains(&4) && rows.contains(&3));
        assert!(cols.count() <= 2);
        assert!(rows.count() <= 2);
    }

    #[test]
    fn test_cells_overlapping_misses_above_grid() {
        let layout = Layout::new(800.0, 600.0, 12, 10);
        let above = Rect::new(300.0, -80.0, 10.0, 10.0);
        assert!(layout.cells_overlapping(above).is_none());
    }

    #[test]
    fn test_pending_is_not_ready() {
        assert!(!Layout::pending(12, 10).is_ready());
        assert!(Layout::new(640.0, 480.0, 12, 10).is_ready());
    }
}
