//! FFI contract for driver entry points.
//!
//! A compiled unit is runnable when it exports the fixed `job_main` symbol.
//! The entry point receives its arguments as a C string array and reports
//! completion through an exit status, with zero meaning success.

use std::ffi::CString;
use std::os::raw::c_char;

use libloading::{Library, Symbol};

use crate::error::{Error, Result};

/// Exported symbol marking a unit as a runnable driver.
pub const ENTRY_SYMBOL: &str = "job_main";

/// Driver entry point: `job_main(argc, argv) -> status`.
pub type EntryFn = unsafe extern "C" fn(argc: usize, argv: *const *const c_char) -> i32;

/// Whether a loaded library exports the driver entry symbol.
pub fn has_entry_signature(library: &Library) -> bool {
    unsafe { library.get::<EntryFn>(ENTRY_SYMBOL.as_bytes()) }.is_ok()
}

/// Invoke a driver entry point with the given argument list.
///
/// `unit` is only used for error context. A missing entry symbol and a
/// nonzero exit status are both surfaced as [`Error::Execution`].
pub fn invoke(library: &Library, unit: &str, args: &[String]) -> Result<()> {
    let entry: Symbol<EntryFn> = unsafe { library.get(ENTRY_SYMBOL.as_bytes()) }
        .map_err(|e| Error::Execution(format!("unit {unit} has no {ENTRY_SYMBOL} symbol: {e}")))?;

    let owned: Vec<CString> = args
        .iter()
        .map(|arg| CString::new(arg.as_str()))
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| Error::InvalidArguments("argument contains a NUL byte".to_string()))?;
    let argv: Vec<*const c_char> = owned.iter().map(|arg| arg.as_ptr()).collect();

    // Safety: the symbol was exported under the fixed entry contract and the
    // argv pointers stay alive across the call via `owned`.
    let status = unsafe { entry(argv.len(), argv.as_ptr()) };
    if status == 0 {
        Ok(())
    } else {
        Err(Error::Execution(format!(
            "driver {unit} exited with status {status}"
        )))
    }
}
