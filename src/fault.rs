//! Critical (non-recoverable) errors.
//!
//! Everything reachable in steady state is recovered locally: dropped and
//! counted, or reported on the console and reset. Only resource
//! exhaustion while starting the subsystem ends up here, and the handler
//! does not return.

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

/// Critical error codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum CritCode {
    /// No fault recorded.
    None = 0,
    /// Task, queue or lock could not be created.
    MallocError = 1,
    /// Start-time configuration rejected.
    ConfigError = 2,
    /// Serial peripheral could not be set up.
    HardwareFault = 3,
}

impl CritCode {
    /// Convert from raw u8 value.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => CritCode::MallocError,
            2 => CritCode::ConfigError,
            3 => CritCode::HardwareFault,
            _ => CritCode::None,
        }
    }
}

/// Last critical error, kept for post-mortem inspection.
pub struct FaultState {
    active: AtomicBool,
    code: AtomicU8,
    /// Additional data (e.g. OS error number).
    data: AtomicU32,
}

impl FaultState {
    pub const fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
            code: AtomicU8::new(0),
            data: AtomicU32::new(0),
        }
    }

    #[inline]
    pub fn set(&self, code: CritCode, data: u32) {
        self.code.store(code as u8, Ordering::Release);
        self.data.store(data, Ordering::Release);
        self.active.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    #[inline]
    pub fn code(&self) -> CritCode {
        CritCode::from_u8(self.code.load(Ordering::Acquire))
    }

    #[inline]
    pub fn data(&self) -> u32 {
        self.data.load(Ordering::Acquire)
    }
}

impl Default for FaultState {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide critical fault record.
pub static CRIT_FAULT: FaultState = FaultState::new();

/// Record a critical error and stop.
///
/// On the chip this restarts the SoC; on a host it aborts the process.
pub fn critical_exit(code: CritCode, data: u32) -> ! {
    CRIT_FAULT.set(code, data);
    log::error!("critical error {:?} ({})", code, data);

    #[cfg(target_os = "espidf")]
    {
        esp_idf_svc::hal::reset::restart();
    }

    #[cfg(not(target_os = "espidf"))]
    {
        eprintln!("critical error {:?} ({})", code, data);
        std::process::abort();
    }
}
