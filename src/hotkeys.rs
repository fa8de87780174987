//! Global hotkey layer.
//!
//! On Windows a dedicated thread owns the three RegisterHotKey registrations
//! and pumps its own message queue, forwarding WM_HOTKEY hits to the GUI over
//! a channel. Rebinds travel the other way on a command channel. Elsewhere
//! the bindings degrade to in-app egui shortcuts (window must be focused).

use crossbeam_channel::{unbounded, Receiver, Sender};

/// What a hotkey does. Each action owns one opaque OS-side id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HotkeyAction {
    ToggleVisibility,
    ToggleClickThrough,
    ToggleLayout,
}

impl HotkeyAction {
    pub const ALL: [HotkeyAction; 3] = [
        HotkeyAction::ToggleVisibility,
        HotkeyAction::ToggleClickThrough,
        HotkeyAction::ToggleLayout,
    ];

    /// Numeric id used with RegisterHotKey / WM_HOTKEY.
    pub fn id(self) -> i32 {
        match self {
            HotkeyAction::ToggleVisibility => 1,
            HotkeyAction::ToggleClickThrough => 2,
            HotkeyAction::ToggleLayout => 3,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(HotkeyAction::ToggleVisibility),
            2 => Some(HotkeyAction::ToggleClickThrough),
            3 => Some(HotkeyAction::ToggleLayout),
            _ => None,
        }
    }
}

/// A bindable key, stored as its Win32 virtual-key code. The settings panel
/// captures keys through egui, the OS layer wants VK codes; this type is the
/// bridge. Supported binds: F1-F12, A-Z, 0-9.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyBind(pub u32);

impl KeyBind {
    pub const F8: KeyBind = KeyBind(0x77);
    pub const F9: KeyBind = KeyBind(0x78);
    pub const F10: KeyBind = KeyBind(0x79);

    /// Map an egui key event to a bindable VK code.
    pub fn from_egui_key(key: egui::Key) -> Option<Self> {
        use egui::Key;
        let vk = match key {
            Key::F1 => 0x70,
            Key::F2 => 0x71,
            Key::F3 => 0x72,
            Key::F4 => 0x73,
            Key::F5 => 0x74,
            Key::F6 => 0x75,
            Key::F7 => 0x76,
            Key::F8 => 0x77,
            Key::F9 => 0x78,
            Key::F10 => 0x79,
            Key::F11 => 0x7A,
            Key::F12 => 0x7B,
            // VK codes for 0-9 and A-Z match ASCII.
            Key::Num0 => 0x30,
            Key::Num1 => 0x31,
            Key::Num2 => 0x32,
            Key::Num3 => 0x33,
            Key::Num4 => 0x34,
            Key::Num5 => 0x35,
            Key::Num6 => 0x36,
            Key::Num7 => 0x37,
            Key::Num8 => 0x38,
            Key::Num9 => 0x39,
            Key::A => 0x41,
            Key::B => 0x42,
            Key::C => 0x43,
            Key::D => 0x44,
            Key::E => 0x45,
            Key::F => 0x46,
            Key::G => 0x47,
            Key::H => 0x48,
            Key::I => 0x49,
            Key::J => 0x4A,
            Key::K => 0x4B,
            Key::L => 0x4C,
            Key::M => 0x4D,
            Key::N => 0x4E,
            Key::O => 0x4F,
            Key::P => 0x50,
            Key::Q => 0x51,
            Key::R => 0x52,
            Key::S => 0x53,
            Key::T => 0x54,
            Key::U => 0x55,
            Key::V => 0x56,
            Key::W => 0x57,
            Key::X => 0x58,
            Key::Y => 0x59,
            Key::Z => 0x5A,
            _ => return None,
        };
        Some(KeyBind(vk))
    }

    /// The egui key for this bind, used by the non-Windows in-app fallback.
    pub fn to_egui_key(self) -> Option<egui::Key> {
        use egui::Key;
        Some(match self.0 {
            0x70 => Key::F1,
            0x71 => Key::F2,
            0x72 => Key::F3,
            0x73 => Key::F4,
            0x74 => Key::F5,
            0x75 => Key::F6,
            0x76 => Key::F7,
            0x77 => Key::F8,
            0x78 => Key::F9,
            0x79 => Key::F10,
            0x7A => Key::F11,
            0x7B => Key::F12,
            0x30 => Key::Num0,
            0x31 => Key::Num1,
            0x32 => Key::Num2,
            0x33 => Key::Num3,
            0x34 => Key::Num4,
            0x35 => Key::Num5,
            0x36 => Key::Num6,
            0x37 => Key::Num7,
            0x38 => Key::Num8,
            0x39 => Key::Num9,
            0x41 => Key::A,
            0x42 => Key::B,
            0x43 => Key::C,
            0x44 => Key::D,
            0x45 => Key::E,
            0x46 => Key::F,
            0x47 => Key::G,
            0x48 => Key::H,
            0x49 => Key::I,
            0x4A => Key::J,
            0x4B => Key::K,
            0x4C => Key::L,
            0x4D => Key::M,
            0x4E => Key::N,
            0x4F => Key::O,
            0x50 => Key::P,
            0x51 => Key::Q,
            0x52 => Key::R,
            0x53 => Key::S,
            0x54 => Key::T,
            0x55 => Key::U,
            0x56 => Key::V,
            0x57 => Key::W,
            0x58 => Key::X,
            0x59 => Key::Y,
            0x5A => Key::Z,
            _ => return None,
        })
    }

    /// Display label for the settings panel keybind boxes.
    pub fn label(self) -> String {
        match self.0 {
            0x70..=0x7B => format!("F{}", self.0 - 0x70 + 1),
            0x30..=0x39 | 0x41..=0x5A => (self.0 as u8 as char).to_string(),
            other => format!("VK 0x{other:02X}"),
        }
    }
}

/// Rebind/teardown commands flowing GUI -> listener thread.
pub enum HotkeyCommand {
    Rebind(HotkeyAction, Option<KeyBind>),
    Shutdown,
}

/// Handle held by the GUI. Hotkey hits arrive on `events`; rebinds are
/// fire-and-forget.
pub struct HotkeyHandle {
    pub events: Receiver<HotkeyAction>,
    commands: Sender<HotkeyCommand>,
    // Keeps the event channel open on platforms without a listener thread.
    #[allow(dead_code)]
    events_tx: Sender<HotkeyAction>,
}

impl HotkeyHandle {
    pub fn rebind(&self, action: HotkeyAction, bind: Option<KeyBind>) {
        let _ = self.commands.send(HotkeyCommand::Rebind(action, bind));
    }

    pub fn shutdown(&self) {
        let _ = self.commands.send(HotkeyCommand::Shutdown);
    }
}

/// Start the global hotkey listener with the given initial bindings.
///
/// The listener thread handle is returned alongside so the caller can join
/// it after the GUI exits; the hotkeys unregister on the way out. On
/// non-Windows platforms there is no thread and the handle is inert (the
/// event channel never fires; the GUI falls back to in-app shortcuts).
pub fn spawn_hotkey_listener(
    bindings: Vec<(HotkeyAction, Option<KeyBind>)>,
) -> (HotkeyHandle, Option<std::thread::JoinHandle<()>>) {
    let (events_tx, events_rx) = unbounded();
    let (commands_tx, commands_rx) = unbounded();

    #[cfg(target_os = "windows")]
    let listener = {
        let tx = events_tx.clone();
        Some(std::thread::spawn(move || {
            win32::run_listener(bindings, tx, commands_rx)
        }))
    };
    #[cfg(not(target_os = "windows"))]
    let listener = {
        let _ = (bindings, commands_rx);
        tracing::warn!("[Hotkeys] No global hotkey backend; using in-app shortcuts");
        None
    };

    let handle = HotkeyHandle {
        events: events_rx,
        commands: commands_tx,
        events_tx,
    };
    (handle, listener)
}

#[cfg(target_os = "windows")]
mod win32 {
    use super::{HotkeyAction, HotkeyCommand, KeyBind};
    use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
    use std::time::Duration;
    use windows::Win32::Foundation::HWND;
    use windows::Win32::UI::Input::KeyboardAndMouse::{
        RegisterHotKey, UnregisterHotKey, HOT_KEY_MODIFIERS,
    };
    use windows::Win32::UI::WindowsAndMessaging::{PeekMessageW, MSG, PM_REMOVE, WM_HOTKEY};

    // RegisterHotKey binds to the calling thread, so registration, the
    // message pump, and rebinds all have to happen on this one thread.
    pub fn run_listener(
        bindings: Vec<(HotkeyAction, Option<KeyBind>)>,
        events: Sender<HotkeyAction>,
        commands: Receiver<HotkeyCommand>,
    ) {
        tracing::info!("[Hotkeys] Win32 listener started");

        for (action, bind) in bindings {
            apply_binding(action, bind);
        }

        loop {
            pump_messages(&events);

            match commands.recv_timeout(Duration::from_millis(15)) {
                Ok(HotkeyCommand::Rebind(action, bind)) => apply_binding(action, bind),
                Ok(HotkeyCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {}
            }
        }

        for action in HotkeyAction::ALL {
            unsafe {
                let _ = UnregisterHotKey(HWND(0), action.id());
            }
        }
        tracing::info!("[Hotkeys] Win32 listener stopped");
    }

    fn pump_messages(events: &Sender<HotkeyAction>) {
        let mut msg = MSG::default();
        // Hotkeys registered against a null HWND land in the thread queue.
        while unsafe { PeekMessageW(&mut msg, HWND(0), 0, 0, PM_REMOVE) }.as_bool() {
            if msg.message == WM_HOTKEY {
                if let Some(action) = HotkeyAction::from_id(msg.wParam.0 as i32) {
                    tracing::debug!("[Hotkeys] {:?}", action);
                    let _ = events.send(action);
                }
            }
        }
    }

    fn apply_binding(action: HotkeyAction, bind: Option<KeyBind>) {
        unsafe {
            let _ = UnregisterHotKey(HWND(0), action.id());
        }
        if let Some(bind) = bind {
            let result = unsafe {
                RegisterHotKey(HWND(0), action.id(), HOT_KEY_MODIFIERS(0), bind.0)
            };
            match result {
                Ok(()) => tracing::info!("[Hotkeys] {:?} bound to {}", action, bind.label()),
                Err(e) => {
                    // Most likely taken by another application; the key just
                    // stays unbound until the user picks a different one.
                    tracing::warn!("[Hotkeys] Failed to bind {:?}: {}", action, e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_ids_roundtrip() {
        for action in HotkeyAction::ALL {
            assert_eq!(HotkeyAction::from_id(action.id()), Some(action));
        }
        assert_eq!(HotkeyAction::from_id(0), None);
        assert_eq!(HotkeyAction::from_id(4), None);
    }

    #[test]
    fn test_default_function_keys() {
        assert_eq!(KeyBind::F8.label(), "F8");
        assert_eq!(KeyBind::F9.label(), "F9");
        assert_eq!(KeyBind::F10.label(), "F10");
    }

    #[test]
    fn test_egui_key_mapping_roundtrip() {
        for key in [
            egui::Key::F1,
            egui::Key::F12,
            egui::Key::A,
            egui::Key::Z,
            egui::Key::Num0,
            egui::Key::Num9,
        ] {
            let bind = KeyBind::from_egui_key(key).expect("bindable key");
            assert_eq!(bind.to_egui_key(), Some(key));
        }
    }

    #[test]
    fn test_unbindable_keys_rejected() {
        assert_eq!(KeyBind::from_egui_key(egui::Key::Escape), None);
        assert_eq!(KeyBind::from_egui_key(egui::Key::Space), None);
    }

    #[test]
    fn test_labels_match_keys() {
        assert_eq!(KeyBind::from_egui_key(egui::Key::A).unwrap().label(), "A");
        assert_eq!(KeyBind::from_egui_key(egui::Key::Num5).unwrap().label(), "5");
        assert_eq!(KeyBind::from_egui_key(egui::Key::F1).unwrap().label(), "F1");
    }

    #[test]
    fn test_inert_handle_never_fires() {
        // Off Windows there is no listener; the channel must stay open and
        // empty rather than erroring out.
        let (handle, _listener) = spawn_hotkey_listener(vec![(
            HotkeyAction::ToggleVisibility,
            Some(KeyBind::F8),
        )]);
        assert!(handle.events.try_recv().is_err());
        handle.rebind(HotkeyAction::ToggleLayout, None);
        handle.shutdown();
    }

    #[test]
    fn test_listener_joins_after_shutdown() {
        // Shutdown must let the listener run its unregister teardown to
        // completion instead of leaving a detached thread behind.
        let (handle, listener) = spawn_hotkey_listener(vec![]);
        handle.shutdown();
        if let Some(listener) = listener {
            listener.join().unwrap();
        }
    }
}
