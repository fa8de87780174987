//! Window capability interface: click-through, visibility, and drag-start,
//! decoupled from any concrete OS binding so the overlay logic stays
//! testable.

/// WS_EX_TRANSPARENT: mouse input passes to whatever is beneath the window.
pub const WS_EX_TRANSPARENT: u32 = 0x0000_0020;

/// WS_EX_LAYERED: required for a transparent overlay window.
pub const WS_EX_LAYERED: u32 = 0x0008_0000;

/// Apply or remove the click-through style bits on an extended-style mask.
/// Layered is always kept on; only the transparent bit toggles.
pub fn with_click_through(style: u32, enable: bool) -> u32 {
    let style = style | WS_EX_LAYERED;
    if enable {
        style | WS_EX_TRANSPARENT
    } else {
        style & !WS_EX_TRANSPARENT
    }
}

/// What the overlay needs from its host window.
pub trait WindowControl {
    /// Mouse events pass through to whatever is beneath the overlay.
    fn set_click_through(&self, enable: bool);

    /// Show or hide the whole window (hotkey-driven).
    fn set_visible(&self, visible: bool);

    /// Begin an OS window drag (borderless windows have no caption to grab).
    fn drag_start(&self);
}

/// egui-viewport-backed implementation. The viewport commands map one-to-one
/// onto the capability surface, so this stays a thin shim.
pub struct ViewportControl<'a> {
    ctx: &'a egui::Context,
}

impl<'a> ViewportControl<'a> {
    pub fn new(ctx: &'a egui::Context) -> Self {
        Self { ctx }
    }
}

impl WindowControl for ViewportControl<'_> {
    fn set_click_through(&self, enable: bool) {
        self.ctx
            .send_viewport_cmd(egui::ViewportCommand::MousePassthrough(enable));
    }

    fn set_visible(&self, visible: bool) {
        self.ctx
            .send_viewport_cmd(egui::ViewportCommand::Visible(visible));
    }

    fn drag_start(&self) {
        self.ctx.send_viewport_cmd(egui::ViewportCommand::StartDrag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable_sets_both_bits() {
        let style = with_click_through(0, true);
        assert_ne!(style & WS_EX_TRANSPARENT, 0);
        assert_ne!(style & WS_EX_LAYERED, 0);
    }

    #[test]
    fn test_disable_clears_only_transparent() {
        let style = with_click_through(WS_EX_LAYERED | WS_EX_TRANSPARENT, false);
        assert_eq!(style & WS_EX_TRANSPARENT, 0);
        assert_ne!(style & WS_EX_LAYERED, 0);
    }

    #[test]
    fn test_double_toggle_restores_original() {
        // The overlay window always carries the layered bit, so "original"
        // here is any style that already has it.
        let original = WS_EX_LAYERED | 0x0000_0100;
        let toggled = with_click_through(original, true);
        let restored = with_click_through(toggled, false);
        assert_eq!(restored, original);
    }

    #[test]
    fn test_unrelated_bits_untouched() {
        let original = 0x0004_0000 | 0x0000_0008;
        let styled = with_click_through(original, true);
        assert_eq!(styled & original, original);
    }
}
