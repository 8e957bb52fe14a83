/// Source of the machine's CPU count, used to resolve `--threads -1`.
pub trait CpuInfo {
    fn cpu_count(&self) -> usize;
}

pub struct SystemCpuInfo;

impl CpuInfo for SystemCpuInfo {
    fn cpu_count(&self) -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}

/// Reports a fixed CPU count. Handy when a run must not depend on the host.
pub struct FixedCpuInfo(pub usize);

impl CpuInfo for FixedCpuInfo {
    fn cpu_count(&self) -> usize {
        self.0
    }
}
