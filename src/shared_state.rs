use crate::hotkeys::KeyBind;
use crate::meter::{self, Orientation};

/// Strip indices on the Voicemeeter side for the three monitored channels.
pub const MONITORED_STRIPS: [usize; 3] = [5, 6, 7];

/// Main shared state container -- wrapped in Arc<Mutex<>> for thread safety
///
///  This struct is shared between:
///  - Poller thread (writes readings, reads nothing else)
///  - GUI thread (reads readings, writes config)
pub struct SharedState {
    /// Last-known-good gain readings, one per monitored strip
    pub readings: [ChannelReading; 3],

    /// Application configuration (user settings, runtime-only)
    pub config: AppConfig,

    /// Informational message for the GUI banner (login failure, first-run hint)
    pub notice: Option<String>,

    /// Set once the user dismisses the banner
    pub notice_dismissed: bool,
}

impl SharedState {
    /// Create new shared state with default values
    pub fn new() -> Self {
        Self {
            readings: [
                ChannelReading::new(MONITORED_STRIPS[0], "Channel 1"),
                ChannelReading::new(MONITORED_STRIPS[1], "Channel 2"),
                ChannelReading::new(MONITORED_STRIPS[2], "Channel 3"),
            ],
            config: AppConfig::default(),
            notice: None,
            notice_dismissed: false,
        }
    }

    /// Store a clamped reading for one channel slot. The array is allocated
    /// once at startup and only ever overwritten in place.
    pub fn store_gain(&mut self, slot: usize, raw_db: f32) {
        if let Some(reading) = self.readings.get_mut(slot) {
            reading.gain_db = meter::clamp_gain(raw_db);
        }
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

/// One monitored channel. Written by the poller, read by the renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChannelReading {
    /// Voicemeeter strip index this channel maps to (5..7)
    pub strip_index: usize,

    /// Last stored gain, always inside [GAIN_MIN_DB, GAIN_MAX_DB]
    pub gain_db: f32,

    /// Label shown next to the meter
    pub display_name: &'static str,
}

impl ChannelReading {
    pub fn new(strip_index: usize, display_name: &'static str) -> Self {
        Self {
            strip_index,
            gain_db: 0.0,
            display_name,
        }
    }
}

/// Application configuration (user settings)
///
/// GUI writes these values; nothing is persisted, everything resets to the
/// defaults below on restart.
#[derive(Clone, PartialEq)]
pub struct AppConfig {
    // === Visual Settings ===
    /// Meter arrangement (vertical bars vs horizontal bars)
    pub orientation: Orientation,

    /// Indicator / track accent color
    pub meter_color: Color32,

    // === Window Settings ===
    /// Pass mouse events to whatever is beneath the overlay
    pub click_through: bool,

    // === Hotkeys (None = unbound) ===
    pub show_hide_key: Option<KeyBind>,
    pub click_through_key: Option<KeyBind>,
    pub layout_key: Option<KeyBind>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::Vertical,
            // LightSkyBlue
            meter_color: Color32::from_rgb(135, 206, 250),

            // Start interactive so the user can reach the settings panel
            click_through: false,

            show_hide_key: Some(KeyBind::F8),
            click_through_key: Some(KeyBind::F9),
            layout_key: Some(KeyBind::F10),
        }
    }
}

impl AppConfig {
    /// Click-through needs a bound hotkey, otherwise the user has no way to
    /// make the overlay interactive again.
    pub fn can_enable_click_through(&self) -> bool {
        self.click_through_key.is_some()
    }
}

/// Simple RGBA Color (compatible with egui)
///
/// We define our own to avoid depending on egui in SharedState
/// (can convert to egui::Color32 in GUI code)
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Color32 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color32 {
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const WHITE: Self = Self::from_rgb(255, 255, 255);

    /// Multiply color by opacity (for transparent tracks / markers)
    pub fn with_opacity(self, opacity: f32) -> Self {
        Self {
            r: self.r,
            g: self.g,
            b: self.b,
            a: (self.a as f32 * opacity.clamp(0.0, 1.0)) as u8,
        }
    }
}

// === Tests ====
#[cfg(test)]
mod tests {
    use super::*;
    use crate::meter::{GAIN_MAX_DB, GAIN_MIN_DB};

    #[test]
    fn test_default_readings_map_to_strips() {
        let state = SharedState::new();
        assert_eq!(state.readings.len(), 3);
        for (i, reading) in state.readings.iter().enumerate() {
            assert_eq!(reading.strip_index, MONITORED_STRIPS[i]);
            assert_eq!(reading.gain_db, 0.0);
        }
        assert_eq!(state.readings[0].display_name, "Channel 1");
    }

    #[test]
    fn test_store_gain_clamps() {
        let mut state = SharedState::new();

        state.store_gain(0, -999.0);
        assert_eq!(state.readings[0].gain_db, GAIN_MIN_DB);

        state.store_gain(1, 999.0);
        assert_eq!(state.readings[1].gain_db, GAIN_MAX_DB);

        state.store_gain(2, -12.5);
        assert_eq!(state.readings[2].gain_db, -12.5);

        // Out-of-range slot is a no-op, not a panic
        state.store_gain(7, 3.0);
    }

    #[test]
    fn test_orientation_toggle_does_not_touch_readings() {
        let mut state = SharedState::new();
        state.store_gain(0, -6.0);
        state.store_gain(1, 3.0);
        let before = state.readings;

        state.config.orientation = state.config.orientation.flipped();
        state.config.orientation = state.config.orientation.flipped();

        assert_eq!(state.readings, before);
        assert_eq!(state.config.orientation, Orientation::Vertical);
    }

    #[test]
    fn test_click_through_guard() {
        let mut config = AppConfig::default();
        assert!(config.can_enable_click_through());

        config.click_through_key = None;
        assert!(!config.can_enable_click_through());
    }

    #[test]
    fn test_color_opacity() {
        let c = Color32::from_rgb(10, 20, 30).with_opacity(0.5);
        assert_eq!((c.r, c.g, c.b), (10, 20, 30));
        assert_eq!(c.a, 127);

        // Clamped above 1.0
        assert_eq!(Color32::WHITE.with_opacity(2.0).a, 255);
    }
}
