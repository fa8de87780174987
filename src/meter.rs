//! Meter math: dB clamping, normalization, and track geometry.
//! Both layouts share the same normalization so the meters stay consistent
//! when the user flips orientation.

/// Bottom of the displayed gain range (dB).
pub const GAIN_MIN_DB: f32 = -60.0;

/// Top of the displayed gain range (dB).
pub const GAIN_MAX_DB: f32 = 12.0;

/// Meter arrangement. Vertical is a row of upright bars with labels below,
/// horizontal is a stack of left-to-right bars with labels on the right.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

impl Orientation {
    pub fn flipped(self) -> Self {
        match self {
            Orientation::Vertical => Orientation::Horizontal,
            Orientation::Horizontal => Orientation::Vertical,
        }
    }
}

/// Clamp a raw gain reading into the displayable range.
pub fn clamp_gain(db: f32) -> f32 {
    db.clamp(GAIN_MIN_DB, GAIN_MAX_DB)
}

/// Map a gain value onto [0, 1] across the displayed range.
pub fn normalize_gain(db: f32) -> f32 {
    ((db - GAIN_MIN_DB) / (GAIN_MAX_DB - GAIN_MIN_DB)).clamp(0.0, 1.0)
}

/// Normalized position of the 0.0 dB reference marker. Fixed at 60/72,
/// independent of the current readings.
pub fn zero_marker_norm() -> f32 {
    normalize_gain(0.0)
}

/// Offset of a normalized position along a track span, in pixels from the
/// track origin. Horizontal tracks grow left to right; vertical tracks grow
/// bottom to top, so callers subtract this from the track bottom edge there.
pub fn track_offset(norm: f32, span: f32) -> f32 {
    norm.clamp(0.0, 1.0) * span
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_pins_out_of_range() {
        assert_eq!(clamp_gain(-120.0), GAIN_MIN_DB);
        assert_eq!(clamp_gain(99.0), GAIN_MAX_DB);
        assert_eq!(clamp_gain(-3.5), -3.5);
    }

    #[test]
    fn test_clamp_idempotent() {
        for raw in [-200.0f32, -60.0, -24.0, 0.0, 12.0, 40.0] {
            let once = clamp_gain(raw);
            assert_eq!(clamp_gain(once), once);
        }
    }

    #[test]
    fn test_normalize_endpoints_and_midpoint() {
        assert_eq!(normalize_gain(-60.0), 0.0);
        assert_eq!(normalize_gain(12.0), 1.0);
        assert!((normalize_gain(-24.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_clamps_out_of_range() {
        assert_eq!(normalize_gain(-90.0), 0.0);
        assert_eq!(normalize_gain(30.0), 1.0);
    }

    #[test]
    fn test_zero_marker_is_fixed() {
        let expected = 60.0 / 72.0;
        assert!((zero_marker_norm() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_orientation_flip_roundtrip() {
        assert_eq!(Orientation::Vertical.flipped(), Orientation::Horizontal);
        assert_eq!(Orientation::Vertical.flipped().flipped(), Orientation::Vertical);
    }

    #[test]
    fn test_track_offset_spans() {
        assert_eq!(track_offset(0.0, 250.0), 0.0);
        assert_eq!(track_offset(1.0, 250.0), 250.0);
        assert_eq!(track_offset(0.5, 100.0), 50.0);
        // Out-of-range norms are clamped, matching the normalization contract.
        assert_eq!(track_offset(1.5, 100.0), 100.0);
    }
}
