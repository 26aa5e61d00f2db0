//! Signed distance helpers for the rasterizer
//!
//! Negative inside, zero on the edge, positive outside.

use glam::Vec2;

use crate::sim::Rect;

/// Signed distance to a circle
#[inline]
pub fn sd_circle(p: Vec2, center: Vec2, radius: f32) -> f32 {
    (p - center).length() - radius
}

/// Signed distance to an axis-aligned box
#[inline]
pub fn sd_box(p: Vec2, rect: &Rect) -> f32 {
    sd_round_rect(p, rect, 0.0)
}

/// Signed distance to a rounded rectangle
///
/// `radius` is clamped to half the shorter side, matching how canvas
/// `roundRect` shrinks oversized corners.
pub fn sd_round_rect(p: Vec2, rect: &Rect, radius: f32) -> f32 {
    let half = Vec2::new(rect.w, rect.h) * 0.5;
    let r = radius.clamp(0.0, half.x.min(half.y));
    let q = (p - rect.center()).abs() - half + Vec2::splat(r);
    q.max(Vec2::ZERO).length() + q.x.max(q.y).min(0.0) - r
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sd_circle() {
        assert_eq!(sd_circle(Vec2::new(3.0, 4.0), Vec2::ZERO, 5.0), 0.0);
        assert!(sd_circle(Vec2::ZERO, Vec2::ZERO, 5.0) < 0.0);
    }

    #[test]
    fn test_round_rect_corners_are_cut() {
        let rect = Rect::new(0.0, 0.0, 40.0, 20.0);
        assert!(sd_box(Vec2::new(0.5, 0.5), &rect) < 0.0);
        assert!(sd_round_rect(Vec2::new(0.5, 0.5), &rect, 5.0) > 0.0);
        assert!(sd_round_rect(Vec2::new(20.0, 10.0), &rect, 5.0) < 0.0);
        assert!((sd_round_rect(Vec2::new(20.0, -3.0), &rect, 5.0) - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_oversized_radius_is_clamped() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let d = sd_round_rect(Vec2::new(5.0, 5.0), &rect, 50.0);
        assert!((d + 5.0).abs() < 1e-5);
    }
}
