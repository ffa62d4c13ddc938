use std::sync::atomic::{AtomicU8, Ordering};

use once_cell::sync::OnceCell;

use crate::fatal::{abort_with, FatalError};
use crate::init::{InitOptions, InitState, InitStep, NativeLibrary};
use crate::locks::{LockingBridge, MutexBank};

/// Runs the native library's setup exactly once.
///
/// Concurrent first callers block until the winning caller has finished all
/// seven steps; later callers return immediately. The bank and bridge it
/// creates are leaked and live until the process exits.
pub struct Sequencer<L> {
    library: L,
    options: InitOptions,
    state: AtomicU8,
    bridge: OnceCell<&'static LockingBridge>,
}

impl<L: NativeLibrary> Sequencer<L> {
    pub fn new(library: L, options: InitOptions) -> Self {
        Self {
            library,
            options,
            state: AtomicU8::new(InitState::NotStarted.tag()),
            bridge: OnceCell::new(),
        }
    }

    pub fn ensure_initialized(&self) -> &'static LockingBridge {
        self.bridge.get_or_init(|| self.run())
    }

    pub fn state(&self) -> InitState {
        InitState::from_tag(self.state.load(Ordering::Acquire))
    }

    pub fn library(&self) -> &L {
        &self.library
    }

    pub fn options(&self) -> &InitOptions {
        &self.options
    }

    // Only ever entered once, from inside `get_or_init`.
    fn run(&self) -> &'static LockingBridge {
        self.set_state(InitState::InProgress);
        let lib = &self.library;
        let mut guard = SetupGuard::new(&self.state);

        guard.step(lib, InitStep::LoadConfig, || lib.load_config(self.options.config_appname.as_deref()));
        guard.step(lib, InitStep::LoadBuiltinEngines, || lib.load_builtin_engines());
        guard.step(lib, InitStep::LoadErrorStrings, || lib.load_error_strings());
        guard.step(lib, InitStep::LibraryInit, || lib.library_init());
        guard.step(lib, InitStep::AddAllAlgorithms, || lib.add_all_algorithms());

        let requested = guard.step(lib, InitStep::AllocateLocks, || lib.lock_slots());
        let bank = match MutexBank::allocate(requested, self.options.max_lock_slots) {
            Ok(bank) => bank,
            Err(e) => {
                self.set_state(InitState::Failed);
                abort_with(FatalError::LockBank(e));
            }
        };

        let bridge: &'static LockingBridge = Box::leak(Box::new(LockingBridge::new(bank)));
        guard.step(lib, InitStep::InstallLockingCallback, || lib.install_locking_callback(bridge));
        guard.disarm();

        self.set_state(InitState::Done);
        tracing::info!(library = lib.name(), lock_slots = bridge.bank().len(), "native library initialized");

        bridge
    }

    fn set_state(&self, state: InitState) {
        self.state.store(state.tag(), Ordering::Release);
    }
}

// A panic inside any setup step aborts; the steps never run a second time.
struct SetupGuard<'a> {
    state: &'a AtomicU8,
    current: InitStep,
    armed: bool,
}

impl<'a> SetupGuard<'a> {
    fn new(state: &'a AtomicU8) -> Self {
        Self {
            state,
            current: InitStep::LoadConfig,
            armed: true,
        }
    }

    fn step<L: NativeLibrary, T>(&mut self, lib: &L, which: InitStep, f: impl FnOnce() -> T) -> T {
        self.current = which;
        tracing::debug!(library = lib.name(), step = %which, "init step");
        f()
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for SetupGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state.store(InitState::Failed.tag(), Ordering::Release);
            abort_with(FatalError::SetupPanicked { step: self.current });
        }
    }
}
