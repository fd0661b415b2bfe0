//! Panic handling for the Aria runtime

use std::slice;
use std::process;

/// Panic with a message and terminate the program.
///
/// # Safety
/// This function never returns. The msg pointer must point to valid UTF-8 data
/// of at least `len` bytes, or can be null (in which case a generic panic message is used).
#[no_mangle]
pub unsafe extern "C" fn aria_panic(msg: *const u8, len: usize) -> ! {
    eprintln!();
    eprintln!("==========================================");
    eprintln!("ARIA RUNTIME PANIC");
    eprintln!("==========================================");
    eprintln!();

    if msg.is_null() || len == 0 {
        eprintln!("Error: Unknown panic");
    } else {
        let bytes = slice::from_raw_parts(msg, len);
        match std::str::from_utf8(bytes) {
            Ok(text) => eprintln!("Error: {}", text),
            Err(_) => eprintln!("Error: <invalid UTF-8 message>"),
        }
    }

    eprintln!();
    eprintln!("The program has encountered a fatal error");
    eprintln!("and cannot continue execution.");
    eprintln!("==========================================");

    process::exit(1)
}
