use crate::shared_state::Color32 as StateColor32;

// === Overlay design tokens ===

/// Meter track fill (faint white over the transparent card).
pub const TRACK_FILL_ALPHA: u8 = 24;

/// Zero-dB reference marker stroke.
pub const ZERO_MARKER_ALPHA: u8 = 90;

pub const CARD_PADDING: f32 = 16.0;
pub const TAB_ROW_HEIGHT: f32 = 30.0;

/// Convert our Color32 to egui::Color32
pub fn to_egui_color(color: StateColor32) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

/// Converts egui colors back to our internal Color32 type
pub fn from_egui_color(c: egui::Color32) -> StateColor32 {
    StateColor32 {
        r: c.r(),
        g: c.g(),
        b: c.b(),
        a: c.a(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_conversion_roundtrip() {
        let ours = StateColor32::from_rgba(135, 206, 250, 255);
        assert_eq!(from_egui_color(to_egui_color(ours)), ours);
    }
}
