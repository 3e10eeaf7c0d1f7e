/// How the timer reads the hardware cycle counter.
///
/// A serialized read waits for in-flight instructions to retire before sampling the counter,
/// which keeps work from leaking across a measurement boundary at a slightly higher cost per
/// read. A light read samples the counter immediately.
///
/// On `x86_64` these map to RDTSCP and RDTSC. On `aarch64` both read CNTVCT, the serialized
/// variant preceded by an instruction barrier.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum CounterRead {
    /// Waits for preceding instructions to complete before reading the counter.
    #[default]
    Serialized,

    /// Reads the counter without waiting for preceding instructions.
    Light,
}
