//! Signal handling for minish
//!
//! In an interactive session the terminal delivers SIGINT/SIGQUIT to the
//! whole foreground process group, which includes the shell while a child
//! runs. The shell catches them with a flag-setting handler so only the
//! child dies. Caught dispositions reset to default across `exec`, so
//! launched programs see normal signal behaviour.

use std::sync::atomic::{AtomicBool, Ordering};

/// Flag indicating SIGINT or SIGQUIT was received (set by signal handler)
pub static INTERRUPT_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Set up signal handlers for an interactive shell
#[cfg(unix)]
pub fn setup_signal_handlers() {
    use signal_hook::consts::{SIGINT, SIGQUIT};
    use signal_hook::low_level;

    for signal in [SIGINT, SIGQUIT] {
        // SAFETY: the handler only touches an atomic
        let registered = unsafe {
            low_level::register(signal, || {
                INTERRUPT_RECEIVED.store(true, Ordering::SeqCst);
            })
        };
        if let Err(e) = registered {
            tracing::warn!(signal, error = %e, "cannot install signal handler");
        }
    }
}

/// Set up signal handlers (no-op on non-Unix)
#[cfg(not(unix))]
pub fn setup_signal_handlers() {}

/// Check if an interrupt was received and clear the flag
pub fn take_interrupt() -> bool {
    INTERRUPT_RECEIVED.swap(false, Ordering::SeqCst)
}
