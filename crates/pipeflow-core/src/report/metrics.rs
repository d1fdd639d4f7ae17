//! Métricas de recursos tomadas del entorno host.
//!
//! El motor no mide recursos por sí mismo: el reporte incorpora lo que
//! devuelva el `ResourceProbe` configurado en el orquestador.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceUsage {
    /// Memoria residente del proceso, si el host la expone.
    pub resident_memory_bytes: Option<u64>,
    pub available_parallelism: Option<usize>,
}

pub trait ResourceProbe: Send + Sync {
    fn sample(&self) -> ResourceUsage;
}

/// No reporta nada. Útil en tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProbe;

impl ResourceProbe for NoopProbe {
    fn sample(&self) -> ResourceUsage {
        ResourceUsage::default()
    }
}

/// Lee `VmRSS` de `/proc/self/status` (sólo Linux) y el paralelismo
/// disponible. Cualquier fallo de lectura deja el campo en `None`.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostProbe;

impl ResourceProbe for HostProbe {
    fn sample(&self) -> ResourceUsage {
        ResourceUsage { resident_memory_bytes: resident_memory_bytes(),
                        available_parallelism: std::thread::available_parallelism().ok().map(|n| n.get()) }
    }
}

fn resident_memory_bytes() -> Option<u64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    parse_vm_rss(&status)
}

fn parse_vm_rss(status: &str) -> Option<u64> {
    let line = status.lines().find(|l| l.starts_with("VmRSS:"))?;
    let kib: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(kib * 1024)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_vm_rss_in_kib() {
        let status = "Name:\tpipeflow\nVmPeak:\t  9000 kB\nVmRSS:\t  1234 kB\n";
        assert_eq!(parse_vm_rss(status), Some(1234 * 1024));
        assert_eq!(parse_vm_rss("Name:\tx\n"), None);
    }

    #[test]
    fn host_probe_reports_parallelism() {
        assert!(HostProbe.sample().available_parallelism.is_some());
    }
}
