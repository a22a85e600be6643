//! Peak resident-memory observation for the running process.
//!
//! The numbers are process-wide high-water marks, so a [`PeakDelta`] only
//! grows when a workload pushes the peak beyond everything that ran before.

use log::warn;

pub trait MemoryProbe {
    /// Peak resident set size of the current process in KiB, if known.
    fn peak_resident_kib(&self) -> Option<u64>;
}

/// Reads `VmHWM` from `/proc/self/status`.
#[cfg(target_os = "linux")]
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcfsProbe;

#[cfg(target_os = "linux")]
impl MemoryProbe for ProcfsProbe {
    fn peak_resident_kib(&self) -> Option<u64> {
        let status = procfs::process::Process::myself()
            .and_then(|p| p.status())
            .map_err(|e| warn!("reading /proc/self/status failed: {}", e))
            .ok()?;
        status.vmhwm
    }
}

/// Probe for platforms without a supported source of peak RSS.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProbe;

impl MemoryProbe for NullProbe {
    fn peak_resident_kib(&self) -> Option<u64> {
        None
    }
}

/// Best probe available on this platform.
pub fn default_probe() -> Box<dyn MemoryProbe> {
    #[cfg(target_os = "linux")]
    {
        Box::new(ProcfsProbe)
    }
    #[cfg(not(target_os = "linux"))]
    {
        Box::new(NullProbe)
    }
}

/// Peak RSS before and after one labelled workload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeakDelta {
    pub label: &'static str,
    pub before_kib: Option<u64>,
    pub after_kib: Option<u64>,
}

impl PeakDelta {
    /// Growth of the high-water mark, `None` when either side is unknown.
    pub fn growth_kib(&self) -> Option<u64> {
        Some(self.after_kib?.saturating_sub(self.before_kib?))
    }
}

/// Run `work` and record how far it moved the peak RSS.
pub fn observe<P, F, R>(probe: &P, label: &'static str, work: F) -> (R, PeakDelta)
where
    P: MemoryProbe + ?Sized,
    F: FnOnce() -> R,
{
    let before_kib = probe.peak_resident_kib();
    let out = work();
    let after_kib = probe.peak_resident_kib();
    (
        out,
        PeakDelta {
            label,
            before_kib,
            after_kib,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Scripted(Cell<u64>);

    impl MemoryProbe for Scripted {
        fn peak_resident_kib(&self) -> Option<u64> {
            let v = self.0.get();
            self.0.set(v + 100);
            Some(v)
        }
    }

    #[test]
    fn observe_reports_growth() {
        let probe = Scripted(Cell::new(1_000));
        let (value, delta) = observe(&probe, "work", || 7);
        assert_eq!(value, 7);
        assert_eq!(delta.growth_kib(), Some(100));
        assert_eq!(delta.label, "work");
    }

    #[test]
    fn null_probe_has_no_growth() {
        let (_, delta) = observe(&NullProbe, "noop", || ());
        assert_eq!(delta.growth_kib(), None);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn procfs_probe_reads_a_peak() {
        let peak = ProcfsProbe.peak_resident_kib();
        assert!(peak.is_some_and(|kib| kib > 0));
    }
}
