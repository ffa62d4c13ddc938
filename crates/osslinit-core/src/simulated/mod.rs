/*
    In-process stand-in for a native crypto library.
      - Records each setup call so tests can check order and count.
      - Keeps a per-thread error queue and string tables that only answer
        once `load_error_strings` has run.
      - Drives the installed LockingBridge the way native code would.
*/
pub mod tables;

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::errqueue::{ErrorCode, ErrorQueue};
use crate::init::{InitStep, NativeLibrary};
use crate::locks::{LockOp, LockingBridge};

pub use tables::codes;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    // Keyed by library id so instances sharing a thread never see each other's codes.
    static QUEUES: RefCell<HashMap<u64, VecDeque<ErrorCode>>> = RefCell::new(HashMap::new());
}

pub struct SimLibrary {
    id: u64,
    lock_slots: i64,
    step_delay: Duration,
    steps: Mutex<Vec<InitStep>>,
    config_appname: Mutex<Option<String>>,
    strings_loaded: AtomicBool,
    bridge: OnceCell<&'static LockingBridge>,
}

impl Default for SimLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl SimLibrary {
    // Same count OpenSSL 1.0.2 reports from CRYPTO_num_locks().
    pub const DEFAULT_LOCK_SLOTS: i64 = 41;

    pub fn new() -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            lock_slots: Self::DEFAULT_LOCK_SLOTS,
            step_delay: Duration::ZERO,
            steps: Mutex::new(Vec::new()),
            config_appname: Mutex::new(None),
            strings_loaded: AtomicBool::new(false),
            bridge: OnceCell::new(),
        }
    }

    pub fn with_lock_slots(mut self, n: i64) -> Self {
        self.lock_slots = n;
        self
    }

    // Sleep inside every setup call, to widen race windows in tests.
    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    pub fn steps(&self) -> Vec<InitStep> {
        self.steps.lock().clone()
    }

    pub fn config_appname(&self) -> Option<String> {
        self.config_appname.lock().clone()
    }

    pub fn error_strings_loaded(&self) -> bool {
        self.strings_loaded.load(Ordering::Acquire)
    }

    pub fn installed_bridge(&self) -> Option<&'static LockingBridge> {
        self.bridge.get().copied()
    }

    /// Queue `code` on the calling thread, as a failing native call would.
    pub fn push_error(&self, code: ErrorCode) {
        QUEUES.with(|q| q.borrow_mut().entry(self.id).or_default().push_back(code));
    }

    /// A native call that fails: queues `codes` and returns the C-style failure value 0.
    pub fn failing_call(&self, codes: &[ErrorCode]) -> i32 {
        for &code in codes {
            self.push_error(code);
        }
        0
    }

    /// Run `f` while holding `slot`, locking through the installed bridge.
    /// Before a bridge is installed the call runs unlocked, as the native library would.
    pub fn with_native_lock<T>(&self, slot: i32, f: impl FnOnce() -> T) -> T {
        let Some(bridge) = self.installed_bridge() else {
            return f();
        };

        bridge.on_native_event(LockOp::CRYPTO_LOCK | LockOp::CRYPTO_WRITE, slot, file!(), line!() as i32);
        let out = f();
        bridge.on_native_event(LockOp::CRYPTO_UNLOCK | LockOp::CRYPTO_WRITE, slot, file!(), line!() as i32);
        out
    }

    fn record(&self, step: InitStep) {
        if !self.step_delay.is_zero() {
            thread::sleep(self.step_delay);
        }
        self.steps.lock().push(step);
    }

    fn tables_loaded(&self) -> bool {
        self.strings_loaded.load(Ordering::Acquire)
    }
}

impl NativeLibrary for SimLibrary {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn load_config(&self, appname: Option<&str>) {
        *self.config_appname.lock() = appname.map(str::to_owned);
        self.record(InitStep::LoadConfig);
    }

    fn load_builtin_engines(&self) {
        self.record(InitStep::LoadBuiltinEngines);
    }

    fn load_error_strings(&self) {
        self.strings_loaded.store(true, Ordering::Release);
        self.record(InitStep::LoadErrorStrings);
    }

    fn library_init(&self) {
        self.record(InitStep::LibraryInit);
    }

    fn add_all_algorithms(&self) {
        self.record(InitStep::AddAllAlgorithms);
    }

    fn lock_slots(&self) -> i64 {
        self.record(InitStep::AllocateLocks);
        self.lock_slots
    }

    fn install_locking_callback(&self, bridge: &'static LockingBridge) {
        if self.bridge.set(bridge).is_err() {
            tracing::warn!(library = self.name(), "locking callback already installed, keeping the first");
        }
        self.record(InitStep::InstallLockingCallback);
    }
}

impl ErrorQueue for SimLibrary {
    fn pop_error(&self) -> ErrorCode {
        QUEUES.with(|q| {
            let mut queues = q.borrow_mut();
            let Some(queue) = queues.get_mut(&self.id) else {
                return ErrorCode::NONE;
            };
            let code = queue.pop_front().unwrap_or(ErrorCode::NONE);
            if queue.is_empty() {
                queues.remove(&self.id);
            }
            code
        })
    }

    fn library_string(&self, code: ErrorCode) -> Option<String> {
        self.tables_loaded()
            .then(|| tables::library_name(self.unpack(code).library))
            .flatten()
            .map(str::to_owned)
    }

    fn function_string(&self, code: ErrorCode) -> Option<String> {
        let parts = self.unpack(code);
        self.tables_loaded()
            .then(|| tables::function_name(parts.library, parts.function))
            .flatten()
            .map(str::to_owned)
    }

    fn reason_string(&self, code: ErrorCode) -> Option<String> {
        let parts = self.unpack(code);
        self.tables_loaded()
            .then(|| tables::reason_text(parts.library, parts.reason))
            .flatten()
            .map(str::to_owned)
    }
}
