use egui::{Align2, FontId, Pos2, Rect, Stroke};

use crate::gui::theme::{to_egui_color, TRACK_FILL_ALPHA, ZERO_MARKER_ALPHA};
use crate::meter::{normalize_gain, track_offset, zero_marker_norm, Orientation};
use crate::shared_state::{AppConfig, ChannelReading};

const LABEL_FONT: f32 = 12.0;

/// Draw the three gain meters inside the card area, dispatching on the
/// configured orientation. Both layouts run the readings through the same
/// normalization, so flipping orientation never changes a meter's position.
pub fn draw_meters(
    painter: &egui::Painter,
    card: Rect,
    readings: &[ChannelReading],
    config: &AppConfig,
) {
    match config.orientation {
        Orientation::Vertical => draw_vertical(painter, card, readings, config),
        Orientation::Horizontal => draw_horizontal(painter, card, readings, config),
    }
}

/// Horizontal stack: one left-to-right track per channel, labels and values
/// on the right edge of the card.
fn draw_horizontal(
    painter: &egui::Painter,
    card: Rect,
    readings: &[ChannelReading],
    config: &AppConfig,
) {
    let accent = to_egui_color(config.meter_color);
    let track_fill = egui::Color32::from_white_alpha(TRACK_FILL_ALPHA);
    let zero_stroke = Stroke::new(2.0, egui::Color32::from_white_alpha(ZERO_MARKER_ALPHA));

    let label_width = 170.0;
    let bar_height = 22.0;
    let spacing = 14.0;
    let track_width = (card.width() - label_width - 32.0).max(40.0);
    let rounding = bar_height / 2.0;

    for (i, reading) in readings.iter().enumerate() {
        let y = card.top() + 16.0 + i as f32 * (bar_height + spacing);
        let track = Rect::from_min_size(
            Pos2::new(card.left() + 16.0, y),
            egui::vec2(track_width, bar_height),
        );

        painter.rect_filled(track, rounding, track_fill);

        // Fixed 0 dB reference, independent of the reading
        let zero_x = track.left() + track_offset(zero_marker_norm(), track.width());
        painter.line_segment(
            [
                Pos2::new(zero_x, track.top() + 2.0),
                Pos2::new(zero_x, track.bottom() - 2.0),
            ],
            zero_stroke,
        );

        // Position indicator (thin bar at the normalized gain)
        let norm = normalize_gain(reading.gain_db);
        let pos_x = track.left() + track_offset(norm, track.width());
        let indicator = Rect::from_min_size(
            Pos2::new(pos_x - 2.0, track.top() + 2.0),
            egui::vec2(4.0, track.height() - 4.0),
        );
        painter.rect_filled(indicator, 1.0, accent);

        painter.rect_stroke(track, rounding, Stroke::new(1.0, accent));

        // Label + value on the right side of the card
        let text_x = track.right() + 16.0;
        painter.text(
            Pos2::new(text_x, track.center().y),
            Align2::LEFT_CENTER,
            reading.display_name,
            FontId::proportional(LABEL_FONT),
            egui::Color32::WHITE,
        );
        painter.text(
            Pos2::new(text_x + 90.0, track.center().y),
            Align2::LEFT_CENTER,
            format!("{:.1} dB", reading.gain_db),
            FontId::monospace(LABEL_FONT),
            egui::Color32::WHITE,
        );
    }
}

/// Vertical stack: upright tracks side by side, labels and values below.
fn draw_vertical(
    painter: &egui::Painter,
    card: Rect,
    readings: &[ChannelReading],
    config: &AppConfig,
) {
    let accent = to_egui_color(config.meter_color);
    let track_fill = egui::Color32::from_white_alpha(TRACK_FILL_ALPHA);
    let zero_stroke = Stroke::new(2.0, egui::Color32::from_white_alpha(ZERO_MARKER_ALPHA));

    let bar_width = 25.0;
    let bottom_margin = 60.0;
    let track_height = (card.height() - 90.0).max(60.0);
    let rounding = bar_width / 2.0;

    // Center the three columns in the card
    let spacing = (card.width() / 3.0 - bar_width).clamp(30.0, 90.0);
    let total = 3.0 * bar_width + 2.0 * spacing;
    let left = card.left() + (card.width() - total).max(0.0) / 2.0;
    let base_y = card.bottom() - bottom_margin;

    for (i, reading) in readings.iter().enumerate() {
        let x = left + i as f32 * (bar_width + spacing);
        let track = Rect::from_min_size(
            Pos2::new(x, base_y - track_height),
            egui::vec2(bar_width, track_height),
        );

        painter.rect_filled(track, rounding, track_fill);

        // 0 dB marker, measured up from the track bottom
        let zero_y = track.bottom() - track_offset(zero_marker_norm(), track.height());
        painter.line_segment(
            [
                Pos2::new(track.left() + 2.0, zero_y),
                Pos2::new(track.right() - 2.0, zero_y),
            ],
            zero_stroke,
        );

        let norm = normalize_gain(reading.gain_db);
        let pos_y = track.bottom() - track_offset(norm, track.height());
        let indicator = Rect::from_min_size(
            Pos2::new(track.left() + 2.0, pos_y - 2.0),
            egui::vec2(track.width() - 4.0, 4.0),
        );
        painter.rect_filled(indicator, 1.0, accent);

        painter.rect_stroke(track, rounding, Stroke::new(1.0, accent));

        painter.text(
            Pos2::new(track.center().x, track.bottom() + 8.0),
            Align2::CENTER_TOP,
            reading.display_name,
            FontId::proportional(LABEL_FONT),
            egui::Color32::WHITE,
        );
        painter.text(
            Pos2::new(track.center().x, track.bottom() + 26.0),
            Align2::CENTER_TOP,
            format!("{:.1} dB", reading.gain_db),
            FontId::monospace(LABEL_FONT),
            egui::Color32::WHITE,
        );
    }
}
