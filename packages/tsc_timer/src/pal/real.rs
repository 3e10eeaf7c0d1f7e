#[cfg(target_arch = "aarch64")]
use std::arch::asm;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::{__rdtscp, _rdtsc};
use std::time::Instant;

use crate::CounterRead;
use crate::pal::Bindings;

/// Bindings that target the real processor and operating system that the build is targeting.
///
/// You would only use different bindings in PAL unit tests that need to use mock bindings.
/// Even then, whenever possible, unit tests should use real bindings for maximum realism.
#[derive(Debug, Default)]
pub(crate) struct BuildTargetBindings;

impl Bindings for BuildTargetBindings {
    #[inline]
    fn read_counter(&self, strategy: CounterRead) -> u64 {
        match strategy {
            CounterRead::Serialized => read_counter_serialized(),
            CounterRead::Light => read_counter_light(),
        }
    }

    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[cfg(target_arch = "x86_64")]
#[inline]
fn read_counter_light() -> u64 {
    // SAFETY: RDTSC is available on every x86_64 processor and has no memory effects.
    unsafe { _rdtsc() }
}

/// RDTSCP waits for all preceding instructions to execute before reading the counter.
#[cfg(target_arch = "x86_64")]
#[inline]
fn read_counter_serialized() -> u64 {
    let mut processor_signature = 0_u32;

    // SAFETY: The only memory written is the processor signature, which points to a valid local.
    unsafe { __rdtscp(&raw mut processor_signature) }
}

#[cfg(target_arch = "aarch64")]
#[inline]
fn read_counter_light() -> u64 {
    let ticks: u64;

    // SAFETY: CNTVCT_EL0 is readable from user mode on every supported operating system
    // and reading it has no side effects.
    unsafe {
        asm!("mrs {}, cntvct_el0", out(reg) ticks, options(nomem, nostack, preserves_flags));
    }

    ticks
}

/// The instruction barrier keeps the counter read from being hoisted above earlier instructions.
#[cfg(target_arch = "aarch64")]
#[inline]
fn read_counter_serialized() -> u64 {
    let ticks: u64;

    // SAFETY: See `read_counter_light()`. ISB only affects the instruction pipeline.
    unsafe {
        asm!("isb", "mrs {}, cntvct_el0", out(reg) ticks, options(nostack, preserves_flags));
    }

    ticks
}
