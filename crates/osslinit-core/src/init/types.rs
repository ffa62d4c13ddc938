use std::env;
use std::fmt;

use crate::init::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    NotStarted,
    InProgress,
    Done,
    // Terminal; the process aborts right after entering it.
    Failed,
}

impl InitState {
    pub(crate) fn tag(self) -> u8 {
        match self {
            InitState::NotStarted => 0,
            InitState::InProgress => 1,
            InitState::Done => 2,
            InitState::Failed => 3,
        }
    }

    pub(crate) fn from_tag(tag: u8) -> Self {
        match tag {
            0 => InitState::NotStarted,
            1 => InitState::InProgress,
            2 => InitState::Done,
            _ => InitState::Failed,
        }
    }
}

/// The setup calls, in the order the sequencer makes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InitStep {
    LoadConfig,
    LoadBuiltinEngines,
    LoadErrorStrings,
    LibraryInit,
    AddAllAlgorithms,
    AllocateLocks,
    InstallLockingCallback,
}

impl InitStep {
    pub const ORDER: [InitStep; 7] = [
        InitStep::LoadConfig,
        InitStep::LoadBuiltinEngines,
        InitStep::LoadErrorStrings,
        InitStep::LibraryInit,
        InitStep::AddAllAlgorithms,
        InitStep::AllocateLocks,
        InitStep::InstallLockingCallback,
    ];
}

impl fmt::Display for InitStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InitStep::LoadConfig => "load config",
            InitStep::LoadBuiltinEngines => "load builtin engines",
            InitStep::LoadErrorStrings => "load error strings",
            InitStep::LibraryInit => "library init",
            InitStep::AddAllAlgorithms => "add all algorithms",
            InitStep::AllocateLocks => "allocate locks",
            InitStep::InstallLockingCallback => "install locking callback",
        };
        f.write_str(s)
    }
}

pub const ENV_CONF_APPNAME: &str = "OSSLINIT_CONF_APPNAME";
pub const ENV_MAX_LOCK_SLOTS: &str = "OSSLINIT_MAX_LOCK_SLOTS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitOptions {
    // Section of the native config file to apply; None uses the library default.
    pub config_appname: Option<String>,
    // Upper bound on the lock count the library may ask for.
    pub max_lock_slots: usize,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            config_appname: None,
            max_lock_slots: Self::DEFAULT_MAX_LOCK_SLOTS,
        }
    }
}

impl InitOptions {
    pub const DEFAULT_MAX_LOCK_SLOTS: usize = 4096;

    pub fn with_config_appname(mut self, name: impl Into<String>) -> Result<Self, ConfigError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ConfigError::EmptyAppname);
        }
        if let Some(pos) = name.bytes().position(|b| b == 0) {
            return Err(ConfigError::NulInAppname(pos));
        }
        self.config_appname = Some(name);
        Ok(self)
    }

    pub fn with_max_lock_slots(mut self, max: usize) -> Result<Self, ConfigError> {
        if max == 0 {
            return Err(ConfigError::ZeroLockSlots);
        }
        self.max_lock_slots = max;
        Ok(self)
    }

    /// Defaults overridden by `OSSLINIT_CONF_APPNAME` and `OSSLINIT_MAX_LOCK_SLOTS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&'static str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut opts = Self::default();

        if let Some(name) = lookup(ENV_CONF_APPNAME) {
            opts = opts.with_config_appname(name)?;
        }

        if let Some(raw) = lookup(ENV_MAX_LOCK_SLOTS) {
            let max = raw.trim().parse::<usize>().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_MAX_LOCK_SLOTS,
                value: raw.clone(),
            })?;
            opts = opts.with_max_lock_slots(max)?;
        }

        Ok(opts)
    }
}
