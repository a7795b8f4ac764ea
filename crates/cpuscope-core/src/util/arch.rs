//! Machine architecture from `uname(2)`.

use std::ffi::CStr;
use std::io;

use tracing::warn;

use crate::collector::{Diagnostic, Reading};

/// Pseudo-path recorded in diagnostics for the `uname` syscall.
pub const UNAME_SOURCE: &str = "uname(2)";

/// Returns the `machine` field of `uname(2)`, e.g. "x86_64" or "aarch64".
pub fn machine_architecture() -> Reading<String> {
    let mut uname = std::mem::MaybeUninit::<libc::utsname>::uninit();
    // SAFETY: uname only writes into the provided struct.
    let rc = unsafe { libc::uname(uname.as_mut_ptr()) };
    if rc != 0 {
        let err = io::Error::last_os_error();
        warn!(error = %err, "uname failed");
        return Reading::degraded(String::new(), Diagnostic::unavailable(UNAME_SOURCE, &err));
    }

    // SAFETY: uname returned 0, so the struct is initialized and every field
    // is a NUL-terminated C string.
    let machine = unsafe {
        let uname = uname.assume_init();
        CStr::from_ptr(uname.machine.as_ptr())
            .to_string_lossy()
            .into_owned()
    };
    Reading::ok(machine)
}
