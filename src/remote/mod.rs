use thiserror::Error;

/// Errors from the Voicemeeter Remote API boundary.
///
/// Nothing here is fatal: the poller collapses every variant into
/// "keep the previous reading" and the GUI only ever surfaces the
/// login failure as an informational banner.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("VoicemeeterRemote library not available: {0}")]
    LibraryUnavailable(String),

    #[error("Voicemeeter login rejected (code {0})")]
    LoginRejected(i32),

    #[error("parameter '{name}' query failed (code {code})")]
    ParameterQuery { name: String, code: i32 },

    #[error("Voicemeeter engine not running")]
    EngineUnavailable,
}

/// Trait for querying the external mixing engine (Commands are read-only).
///
/// The real implementation wraps synchronous FFI calls into
/// VoicemeeterRemote64.dll; tests use a mock so the poller semantics are
/// checkable without the real process.
pub trait VoicemeeterRemote {
    /// Has any mixer parameter changed since the last check?
    fn is_dirty(&self) -> Result<bool, RemoteError>;

    /// Current value of a named float parameter (e.g. "Strip[5].Gain").
    fn parameter_float(&self, name: &str) -> Result<f32, RemoteError>;
}

/// Parameter name for a strip's gain, following the engine's textual pattern.
pub fn strip_gain_param(strip_index: usize) -> String {
    format!("Strip[{strip_index}].Gain")
}

// ==============================================================
// OS SELECTION FACTORY
// ==============================================================

#[cfg(target_os = "windows")]
mod windows;
#[cfg(target_os = "windows")]
pub type PlatformRemote = windows::VoicemeeterLink;

// Fallback for everything else: the overlay runs but shows the defaults.
#[cfg(not(target_os = "windows"))]
mod dummy;
#[cfg(not(target_os = "windows"))]
pub type PlatformRemote = dummy::DummyRemote;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_gain_param_format() {
        assert_eq!(strip_gain_param(5), "Strip[5].Gain");
        assert_eq!(strip_gain_param(7), "Strip[7].Gain");
    }

    #[test]
    fn test_error_messages_name_the_parameter() {
        let err = RemoteError::ParameterQuery {
            name: "Strip[6].Gain".to_string(),
            code: -2,
        };
        let msg = err.to_string();
        assert!(msg.contains("Strip[6].Gain"));
        assert!(msg.contains("-2"));
    }
}
