//! Pixel-to-time mapping and snap policy for grid surfaces.

use serde::{Deserialize, Serialize};

/// Fixed geometry of a day/week grid surface.
///
/// Vertical pixels map to minutes through `pixels_per_hour`; horizontal
/// pixels map to day columns through `day_column_width`. All time deltas
/// snap to `snap_minutes`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GridMetrics {
    pub pixels_per_hour: f64,
    pub day_column_width: f64,
    pub snap_minutes: i64,
    pub min_duration_minutes: i64,
}

impl Default for GridMetrics {
    fn default() -> Self {
        Self {
            pixels_per_hour: 60.0,
            day_column_width: 120.0,
            snap_minutes: 15,
            min_duration_minutes: 15,
        }
    }
}

impl GridMetrics {
    /// Raw minute delta for a vertical pixel delta, truncated toward zero
    /// so a snapped boundary can never pass the pointer. Non-finite input
    /// maps to zero; malformed samples must never break an interaction.
    pub fn minutes_for_pixels(&self, dy: f64) -> i64 {
        if !dy.is_finite() || self.pixels_per_hour <= 0.0 {
            return 0;
        }
        (dy / self.pixels_per_hour * 60.0).trunc() as i64
    }

    /// Whole day-column delta for a horizontal pixel delta.
    pub fn days_for_pixels(&self, dx: f64) -> i64 {
        if !dx.is_finite() || self.day_column_width <= 0.0 {
            return 0;
        }
        (dx / self.day_column_width).round() as i64
    }

    /// Snap a minute delta with the snap-toward-finger policy.
    ///
    /// Expanding (the boundary moves away from the event body): round the
    /// magnitude *down*, toward the original boundary -- the visual edge
    /// never overshoots the finger. Shrinking: round to the nearest snap,
    /// chasing the pointer; the minimum-duration clamp downstream keeps the
    /// boundary from crossing the opposite edge.
    pub fn snap_delta(&self, raw_minutes: i64, expanding: bool) -> i64 {
        if expanding {
            self.snap_toward_zero(raw_minutes)
        } else {
            self.snap_nearest(raw_minutes)
        }
    }

    /// Round toward zero to the snap grid.
    pub fn snap_toward_zero(&self, raw_minutes: i64) -> i64 {
        let step = self.snap_minutes.max(1);
        (raw_minutes / step) * step
    }

    /// Round to the nearest snap multiple (ties away from zero).
    pub fn snap_nearest(&self, raw_minutes: i64) -> i64 {
        let step = self.snap_minutes.max(1);
        let rem = raw_minutes.rem_euclid(step);
        let down = raw_minutes - rem;
        if rem * 2 >= step {
            down + step
        } else {
            down
        }
    }

    /// Floor an absolute minute-of-day onto the snap grid (used to anchor
    /// a create drag at the pressed slot).
    pub fn snap_floor(&self, raw_minutes: i64) -> i64 {
        let step = self.snap_minutes.max(1);
        raw_minutes.div_euclid(step) * step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_mapping_at_sixty_per_hour() {
        let grid = GridMetrics::default();
        assert_eq!(grid.minutes_for_pixels(60.0), 60);
        assert_eq!(grid.minutes_for_pixels(-22.0), -22);
        assert_eq!(grid.minutes_for_pixels(f64::NAN), 0);
    }

    #[test]
    fn day_mapping_rounds_to_columns() {
        let grid = GridMetrics::default();
        assert_eq!(grid.days_for_pixels(130.0), 1);
        assert_eq!(grid.days_for_pixels(-250.0), -2);
        assert_eq!(grid.days_for_pixels(40.0), 0);
    }

    #[test]
    fn expanding_rounds_toward_original_boundary() {
        let grid = GridMetrics::default();
        // -22px at 60px/hour on a top handle: raw -22min snaps to -15min.
        assert_eq!(grid.snap_delta(-22, true), -15);
        assert_eq!(grid.snap_delta(22, true), 15);
        assert_eq!(grid.snap_delta(14, true), 0);
    }

    #[test]
    fn shrinking_rounds_to_nearest() {
        let grid = GridMetrics::default();
        assert_eq!(grid.snap_delta(22, false), 15);
        assert_eq!(grid.snap_delta(23, false), 30);
        assert_eq!(grid.snap_delta(-8, false), -15);
        assert_eq!(grid.snap_delta(-7, false), 0);
    }

    #[test]
    fn floor_anchors_to_slot() {
        let grid = GridMetrics::default();
        assert_eq!(grid.snap_floor(9 * 60 + 13), 9 * 60);
        assert_eq!(grid.snap_floor(9 * 60 + 16), 9 * 60 + 15);
    }
}
