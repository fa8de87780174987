use std::ffi::CString;
use std::os::raw::c_char;

use libloading::Library;

use super::{RemoteError, VoicemeeterRemote};

type StatusFn = unsafe extern "system" fn() -> i32;
type GetParamFloatFn = unsafe extern "system" fn(*const c_char, *mut f32) -> i32;

/// The DLL ships with Voicemeeter, not with us, so look next to PATH first
/// and then in the default install location.
const DLL_CANDIDATES: [&str; 2] = [
    "VoicemeeterRemote64.dll",
    r"C:\Program Files (x86)\VB\Voicemeeter\VoicemeeterRemote64.dll",
];

/// Runtime binding to VoicemeeterRemote64.dll.
///
/// Logs in on open and logs out on drop. All calls are synchronous FFI;
/// they run on the poller thread, never on the GUI thread.
pub struct VoicemeeterLink {
    login: StatusFn,
    logout: StatusFn,
    is_dirty: StatusFn,
    get_param_float: GetParamFloatFn,
    // Keeps the symbols above valid for the lifetime of the link.
    _lib: Library,
}

impl VoicemeeterLink {
    pub fn open() -> Result<Self, RemoteError> {
        let lib = Self::load_library()?;

        // SAFETY: symbol names and signatures match the published
        // VoicemeeterRemote C API; the copied fn pointers never outlive
        // `_lib` because both live and die with this struct.
        let link = unsafe {
            let login = *lib
                .get::<StatusFn>(b"VBVMR_Login\0")
                .map_err(|e| RemoteError::LibraryUnavailable(e.to_string()))?;
            let logout = *lib
                .get::<StatusFn>(b"VBVMR_Logout\0")
                .map_err(|e| RemoteError::LibraryUnavailable(e.to_string()))?;
            let is_dirty = *lib
                .get::<StatusFn>(b"VBVMR_IsParametersDirty\0")
                .map_err(|e| RemoteError::LibraryUnavailable(e.to_string()))?;
            let get_param_float = *lib
                .get::<GetParamFloatFn>(b"VBVMR_GetParameterFloat\0")
                .map_err(|e| RemoteError::LibraryUnavailable(e.to_string()))?;

            Self {
                login,
                logout,
                is_dirty,
                get_param_float,
                _lib: lib,
            }
        };

        // 0 = logged in, 1 = logged in but Voicemeeter itself isn't running
        // yet (it may come up later; readings stay at their defaults until
        // the dirty flag fires).
        let code = unsafe { (link.login)() };
        if code < 0 {
            return Err(RemoteError::LoginRejected(code));
        }
        tracing::info!("[Remote] Voicemeeter login ok (code {})", code);

        Ok(link)
    }

    fn load_library() -> Result<Library, RemoteError> {
        let mut last_err = String::new();
        for candidate in DLL_CANDIDATES {
            match unsafe { Library::new(candidate) } {
                Ok(lib) => {
                    tracing::debug!("[Remote] Loaded {}", candidate);
                    return Ok(lib);
                }
                Err(e) => last_err = e.to_string(),
            }
        }
        Err(RemoteError::LibraryUnavailable(last_err))
    }
}

impl VoicemeeterRemote for VoicemeeterLink {
    fn is_dirty(&self) -> Result<bool, RemoteError> {
        // 1 = changed, 0 = unchanged, negative = engine unavailable
        let code = unsafe { (self.is_dirty)() };
        if code < 0 {
            return Err(RemoteError::EngineUnavailable);
        }
        Ok(code != 0)
    }

    fn parameter_float(&self, name: &str) -> Result<f32, RemoteError> {
        let c_name = CString::new(name).map_err(|_| RemoteError::ParameterQuery {
            name: name.to_string(),
            code: -1,
        })?;

        let mut value = 0.0f32;
        let code = unsafe { (self.get_param_float)(c_name.as_ptr(), &mut value) };
        if code != 0 {
            return Err(RemoteError::ParameterQuery {
                name: name.to_string(),
                code,
            });
        }
        Ok(value)
    }
}

impl Drop for VoicemeeterLink {
    fn drop(&mut self) {
        // Logout failure is swallowed; there is nothing useful to do with it
        // during shutdown.
        let code = unsafe { (self.logout)() };
        if code != 0 {
            tracing::warn!("[Remote] Voicemeeter logout returned {}", code);
        }
    }
}
