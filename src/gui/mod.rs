// src/gui/mod.rs
pub mod meters;
pub mod settings;
pub mod theme;

use std::sync::{Arc, Mutex};

use eframe::egui;

use crate::gui::settings::CaptureTarget;
use crate::gui::theme::{CARD_PADDING, TAB_ROW_HEIGHT};
use crate::hotkeys::{HotkeyAction, HotkeyHandle};
use crate::poller::POLL_INTERVAL;
use crate::shared_state::SharedState;
use crate::window_control::{ViewportControl, WindowControl};

/// Which view fills the card area.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Tab {
    Meters,
    Settings,
}

/// Main overlay application -- rendering and user interaction.
pub struct OverlayApp {
    /// Shared state between poller and GUI threads
    shared_state: Arc<Mutex<SharedState>>,

    /// Global hotkey events + rebind commands
    hotkeys: HotkeyHandle,

    /// Current view; starts on Settings so the first run explains itself
    active_tab: Tab,

    /// Hotkey-driven whole-window visibility
    overlay_visible: bool,

    /// Keybind box currently waiting for a key press
    capture: Option<CaptureTarget>,

    /// Track passthrough so we only poke the OS window manager on change
    last_passthrough_state: bool,
}

impl OverlayApp {
    pub fn new(shared_state: Arc<Mutex<SharedState>>, hotkeys: HotkeyHandle) -> Self {
        Self {
            shared_state,
            hotkeys,
            active_tab: Tab::Settings,
            overlay_visible: true,
            capture: None,
            last_passthrough_state: false,
        }
    }

    fn apply_action(&mut self, action: HotkeyAction, ctx: &egui::Context) {
        let control = ViewportControl::new(ctx);
        match action {
            HotkeyAction::ToggleVisibility => {
                self.overlay_visible = !self.overlay_visible;
                control.set_visible(self.overlay_visible);
            }
            HotkeyAction::ToggleClickThrough => {
                if let Ok(mut state) = self.shared_state.lock() {
                    state.config.click_through = !state.config.click_through;
                }
            }
            HotkeyAction::ToggleLayout => {
                if let Ok(mut state) = self.shared_state.lock() {
                    state.config.orientation = state.config.orientation.flipped();
                }
            }
        }
    }

    /// In-app shortcut fallback for platforms without a global hotkey
    /// backend. Only fires while the overlay has focus.
    #[cfg(not(target_os = "windows"))]
    fn consume_fallback_shortcuts(&mut self, ctx: &egui::Context) {
        let bindings = match self.shared_state.lock() {
            Ok(state) => [
                (HotkeyAction::ToggleVisibility, state.config.show_hide_key),
                (
                    HotkeyAction::ToggleClickThrough,
                    state.config.click_through_key,
                ),
                (HotkeyAction::ToggleLayout, state.config.layout_key),
            ],
            Err(_) => return,
        };

        for (action, bind) in bindings {
            let Some(key) = bind.and_then(|b| b.to_egui_key()) else {
                continue;
            };
            // Keybind capture gets first claim on key presses.
            if self.capture.is_some() {
                continue;
            }
            let shortcut = egui::KeyboardShortcut::new(egui::Modifiers::NONE, key);
            if ctx.input_mut(|i| i.consume_shortcut(&shortcut)) {
                self.apply_action(action, ctx);
            }
        }
    }

    fn draw_notice_banner(&mut self, ui: &mut egui::Ui, banner: egui::Rect, text: &str) {
        let mut dismissed = false;

        ui.painter()
            .rect_filled(banner, 0.0, egui::Color32::from_rgb(0, 90, 160));
        ui.painter().line_segment(
            [banner.left_bottom(), banner.right_bottom()],
            egui::Stroke::new(1.0, egui::Color32::from_rgb(0, 120, 200)),
        );

        ui.allocate_new_ui(egui::UiBuilder::new().max_rect(banner), |ui| {
            ui.horizontal_centered(|ui| {
                ui.add_space(8.0);
                ui.label(
                    egui::RichText::new(text)
                        .color(egui::Color32::WHITE)
                        .strong(),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.add_space(8.0);
                    if ui
                        .add(
                            egui::Button::new(
                                egui::RichText::new(" x ").color(egui::Color32::WHITE).strong(),
                            )
                            .frame(false),
                        )
                        .on_hover_text("Dismiss")
                        .clicked()
                    {
                        dismissed = true;
                    }
                });
            });
        });

        if dismissed {
            if let Ok(mut state) = self.shared_state.lock() {
                state.notice_dismissed = true;
            }
        }
    }

    /// "Pill" style tab button (selected tab gets the accent fill).
    fn tab_button(
        ui: &mut egui::Ui,
        label: &str,
        tab: Tab,
        active_tab: &mut Tab,
        accent: egui::Color32,
    ) {
        let is_selected = *active_tab == tab;
        let text_color = if is_selected {
            egui::Color32::BLACK
        } else {
            egui::Color32::WHITE
        };

        let response = ui.add(
            egui::Button::new(egui::RichText::new(label).size(13.0).color(text_color))
                .fill(if is_selected {
                    accent
                } else {
                    egui::Color32::from_black_alpha(120)
                })
                .rounding(12.0)
                .min_size(egui::vec2(80.0, 24.0)),
        );
        if response.clicked() {
            *active_tab = tab;
        }
    }
}

impl eframe::App for OverlayApp {
    /// Fully transparent clear so the desktop shows through around the card.
    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        [0.0, 0.0, 0.0, 0.0]
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.hotkeys.shutdown();
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // New readings land every poll tick; repaint on that cadence even
        // without input events.
        ctx.request_repaint_after(POLL_INTERVAL);

        // --- Global hotkeys ---
        while let Ok(action) = self.hotkeys.events.try_recv() {
            self.apply_action(action, ctx);
        }
        #[cfg(not(target_os = "windows"))]
        self.consume_fallback_shortcuts(ctx);

        // --- Snapshot shared state for this frame ---
        let (readings, config, notice) = match self.shared_state.lock() {
            Ok(state) => (
                state.readings,
                state.config.clone(),
                if state.notice_dismissed {
                    None
                } else {
                    state.notice.clone()
                },
            ),
            Err(_) => return,
        };

        // --- Click-through (only poke the OS when the state changed) ---
        if config.click_through != self.last_passthrough_state {
            let status = if config.click_through {
                "CLICK-THROUGH"
            } else {
                "INTERACTIVE"
            };
            tracing::info!("[GUI] Window state: {}", status);
            ViewportControl::new(ctx).set_click_through(config.click_through);
            self.last_passthrough_state = config.click_through;
        }

        let accent = theme::to_egui_color(config.meter_color);

        let frame = egui::Frame::central_panel(&ctx.style())
            .fill(egui::Color32::from_black_alpha(40))
            .inner_margin(0.0);

        egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
            let window_rect = ui.available_rect_before_wrap();
            let mut card = window_rect.shrink(CARD_PADDING / 2.0);

            // Notice banner (login failure / first-run hint) at the top
            if let Some(text) = &notice {
                let split = card.split_top_bottom_at_y(card.top() + 28.0);
                self.draw_notice_banner(ui, split.0, text);
                card = split.1;
            }

            // Tab row hidden while click-through: the overlay is untouchable
            // anyway and the pills would just clutter the meters.
            if !config.click_through {
                let tab_row = card.split_top_bottom_at_y(card.top() + TAB_ROW_HEIGHT);
                ui.allocate_new_ui(egui::UiBuilder::new().max_rect(tab_row.0), |ui| {
                    ui.horizontal(|ui| {
                        Self::tab_button(ui, "Meters", Tab::Meters, &mut self.active_tab, accent);
                        Self::tab_button(
                            ui,
                            "Settings",
                            Tab::Settings,
                            &mut self.active_tab,
                            accent,
                        );
                    });
                });
                card = tab_row.1;
            }

            match self.active_tab {
                Tab::Meters => {
                    // Drag the borderless window by grabbing the meters area
                    // (interactive mode only).
                    if !config.click_through {
                        let interaction =
                            ui.interact(card, ui.id().with("overlay_drag"), egui::Sense::click());
                        if interaction.hovered()
                            && ui.input(|i| i.pointer.button_pressed(egui::PointerButton::Primary))
                        {
                            ViewportControl::new(ctx).drag_start();
                        }
                        // Double-click jumps to the color picker, like the
                        // old double-click-for-color-dialog gesture.
                        if interaction.double_clicked() {
                            self.active_tab = Tab::Settings;
                        }
                    }

                    meters::draw_meters(ui.painter(), card, &readings, &config);
                }
                Tab::Settings => {
                    ui.allocate_new_ui(egui::UiBuilder::new().max_rect(card), |ui| {
                        if let Ok(mut state) = self.shared_state.lock() {
                            settings::show_settings_panel(
                                ui,
                                &mut state,
                                &mut self.capture,
                                &self.hotkeys,
                            );
                        }
                    });
                }
            }
        });
    }
}
