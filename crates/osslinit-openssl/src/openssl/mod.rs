pub(crate) mod ffi;
pub(crate) mod safe;

use once_cell::sync::OnceCell;
use osslinit_core::{InitOptions, InitState, LockingBridge, Sequencer};

use crate::OpenSsl;

/// Process-wide setup. The first caller's options win.
static SEQUENCER: OnceCell<Sequencer<OpenSsl>> = OnceCell::new();

pub(crate) fn init_with(options: InitOptions) -> &'static LockingBridge {
    let seq = SEQUENCER.get_or_init(|| Sequencer::new(OpenSsl, options.clone()));
    if seq.options() != &options {
        tracing::warn!(
            requested = ?options,
            active = ?seq.options(),
            "OpenSSL already configured, ignoring new options"
        );
    }
    seq.ensure_initialized()
}

/// Initialized bridge, using defaults only if nobody has configured OpenSSL yet.
pub(crate) fn ensure() -> &'static LockingBridge {
    match SEQUENCER.get() {
        Some(seq) => seq.ensure_initialized(),
        None => init_with(InitOptions::default()),
    }
}

pub(crate) fn state() -> InitState {
    SEQUENCER.get().map_or(InitState::NotStarted, |s| s.state())
}
