use egui::{RichText, Ui};

use crate::gui::theme::{from_egui_color, to_egui_color};
use crate::hotkeys::{HotkeyAction, HotkeyHandle, KeyBind};
use crate::meter::Orientation;
use crate::shared_state::SharedState;

/// Which keybind box is currently waiting for a key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureTarget {
    ShowHide,
    ClickThrough,
    Layout,
}

impl CaptureTarget {
    fn action(self) -> HotkeyAction {
        match self {
            CaptureTarget::ShowHide => HotkeyAction::ToggleVisibility,
            CaptureTarget::ClickThrough => HotkeyAction::ToggleClickThrough,
            CaptureTarget::Layout => HotkeyAction::ToggleLayout,
        }
    }

    fn label(self) -> &'static str {
        match self {
            CaptureTarget::ShowHide => "Show / Hide overlay",
            CaptureTarget::ClickThrough => "Toggle click-through",
            CaptureTarget::Layout => "Toggle layout",
        }
    }
}

/// The in-window settings panel: layout, click-through, meter color,
/// keybinds, and restore-defaults. Mutates config only; the frame loop
/// applies window-level effects when it sees the config change.
pub fn show_settings_panel(
    ui: &mut Ui,
    state: &mut SharedState,
    capture: &mut Option<CaptureTarget>,
    hotkeys: &HotkeyHandle,
) {
    // A pending capture consumes the next key press before anything else.
    if let Some(target) = *capture {
        if let Some(new_bind) = poll_key_capture(ui) {
            set_binding(state, target, new_bind);
            hotkeys.rebind(target.action(), new_bind);
            *capture = None;
        }
    }

    ui.add_space(6.0);

    // Layout
    ui.horizontal(|ui| {
        ui.label("Layout:");
        let orientation = &mut state.config.orientation;
        ui.radio_value(orientation, Orientation::Vertical, "Vertical");
        ui.radio_value(orientation, Orientation::Horizontal, "Horizontal");
    });

    ui.add_space(8.0);

    // Click-through. Refuse to enable without a bound hotkey -- it's the only
    // way back into the window.
    let mut click_through = state.config.click_through;
    if ui
        .checkbox(
            &mut click_through,
            "Click-through mode (overlay ignores mouse)",
        )
        .changed()
    {
        if click_through && !state.config.can_enable_click_through() {
            state.notice = Some("Set a keybind for click-through first!".to_string());
            state.notice_dismissed = false;
        } else {
            state.config.click_through = click_through;
        }
    }

    ui.add_space(8.0);

    // Meter color
    ui.horizontal(|ui| {
        ui.label("Meter color:");
        let mut color = to_egui_color(state.config.meter_color);
        if ui.color_edit_button_srgba(&mut color).changed() {
            state.config.meter_color = from_egui_color(color);
        }
    });

    ui.add_space(12.0);
    ui.label(RichText::new("Keybinds (click a box, then press a key; Esc unbinds):").strong());
    ui.add_space(4.0);

    for target in [
        CaptureTarget::ShowHide,
        CaptureTarget::ClickThrough,
        CaptureTarget::Layout,
    ] {
        keybind_row(ui, state, capture, target);
    }

    ui.add_space(12.0);

    if ui.button("Restore defaults").clicked() {
        state.config = Default::default();
        *capture = None;
        for target in [
            CaptureTarget::ShowHide,
            CaptureTarget::ClickThrough,
            CaptureTarget::Layout,
        ] {
            hotkeys.rebind(target.action(), get_binding(state, target));
        }
    }
}

/// One "label + current key" row. Clicking the key box arms capture.
fn keybind_row(
    ui: &mut Ui,
    state: &mut SharedState,
    capture: &mut Option<CaptureTarget>,
    target: CaptureTarget,
) {
    ui.horizontal(|ui| {
        ui.label(target.label());

        let text = if *capture == Some(target) {
            "Press key...".to_string()
        } else {
            match get_binding(state, target) {
                Some(bind) => bind.label(),
                None => "<None>".to_string(),
            }
        };

        // Right-align the key boxes so the rows line up
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui
                .add(egui::Button::new(text).min_size(egui::vec2(90.0, 22.0)))
                .clicked()
            {
                *capture = Some(target);
            }
        });
    });
}

/// Pick up the next key press while capturing. Returns `Some(None)` for
/// Escape (unbind), `Some(Some(bind))` for a bindable key, `None` while
/// nothing usable has been pressed yet.
fn poll_key_capture(ui: &Ui) -> Option<Option<KeyBind>> {
    let events = ui.input(|i| i.events.clone());
    for event in events {
        if let egui::Event::Key { key, pressed: true, .. } = event {
            if key == egui::Key::Escape {
                return Some(None);
            }
            if let Some(bind) = KeyBind::from_egui_key(key) {
                return Some(Some(bind));
            }
        }
    }
    None
}

fn get_binding(state: &SharedState, target: CaptureTarget) -> Option<KeyBind> {
    match target {
        CaptureTarget::ShowHide => state.config.show_hide_key,
        CaptureTarget::ClickThrough => state.config.click_through_key,
        CaptureTarget::Layout => state.config.layout_key,
    }
}

fn set_binding(state: &mut SharedState, target: CaptureTarget, bind: Option<KeyBind>) {
    match target {
        CaptureTarget::ShowHide => state.config.show_hide_key = bind,
        CaptureTarget::ClickThrough => state.config.click_through_key = bind,
        CaptureTarget::Layout => state.config.layout_key = bind,
    }
    // Unbinding the click-through key while click-through is active would
    // strand the user outside the window.
    if target == CaptureTarget::ClickThrough && bind.is_none() {
        state.config.click_through = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_targets_map_to_actions() {
        assert_eq!(
            CaptureTarget::ShowHide.action(),
            HotkeyAction::ToggleVisibility
        );
        assert_eq!(
            CaptureTarget::ClickThrough.action(),
            HotkeyAction::ToggleClickThrough
        );
        assert_eq!(CaptureTarget::Layout.action(), HotkeyAction::ToggleLayout);
    }

    #[test]
    fn test_unbinding_click_through_disables_mode() {
        let mut state = SharedState::new();
        state.config.click_through = true;

        set_binding(&mut state, CaptureTarget::ClickThrough, None);

        assert!(state.config.click_through_key.is_none());
        assert!(!state.config.click_through);
    }

    #[test]
    fn test_rebinding_other_keys_keeps_mode() {
        let mut state = SharedState::new();
        state.config.click_through = true;

        set_binding(&mut state, CaptureTarget::Layout, None);
        assert!(state.config.click_through);
    }
}
