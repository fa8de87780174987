use super::{RemoteError, VoicemeeterRemote};

/// Placeholder remote for platforms without Voicemeeter. Never reports a
/// change, so the overlay keeps showing its startup values.
pub struct DummyRemote;

impl DummyRemote {
    pub fn open() -> Result<Self, RemoteError> {
        tracing::warn!("[Remote] Voicemeeter is Windows-only; using dummy remote");
        Ok(Self)
    }
}

impl VoicemeeterRemote for DummyRemote {
    fn is_dirty(&self) -> Result<bool, RemoteError> {
        Ok(false)
    }

    fn parameter_float(&self, _name: &str) -> Result<f32, RemoteError> {
        Err(RemoteError::EngineUnavailable)
    }
}
