use std::sync::atomic::{AtomicBool, Ordering};

/// Global shutdown flag, set by the signal handler.
pub static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Route SIGTERM and SIGINT to [`SHUTDOWN`].
///
/// The first signal asks for a graceful stop (drain, flush, close). A second
/// one exits immediately with status 130.
pub fn setup_signal_handler() {
    for sig in [libc::SIGTERM, libc::SIGINT] {
        unsafe {
            libc::signal(sig, signal_handler as libc::sighandler_t);
        }
    }
}

extern "C" fn signal_handler(_sig: libc::c_int) {
    if SHUTDOWN.swap(true, Ordering::SeqCst) {
        unsafe { libc::_exit(130) };
    }
}

pub fn shutdown_requested() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}
