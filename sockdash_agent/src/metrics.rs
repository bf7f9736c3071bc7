//! Sample collection using sysinfo for sockdash_agent.

use std::path::Path;

use crate::state::AppState;
use crate::types::Sample;

/// Refresh every handle and build one sample. Network counters accumulate
/// into the shared totals, so repeated calls are monotonic.
pub async fn collect_sample(state: &AppState) -> Sample {
    let (cpu_percent, memory_total, memory_used) = {
        let mut sys = state.sys.lock().await;
        sys.refresh_cpu_usage();
        sys.refresh_memory();
        (sys.global_cpu_usage(), sys.total_memory(), sys.used_memory())
    };

    let (disk_total, disk_free) = {
        let mut disks = state.disks.lock().await;
        disks.refresh(true);
        disk_figures(
            disks
                .list()
                .iter()
                .map(|d| (d.mount_point(), d.total_space(), d.available_space())),
        )
    };

    let (net_recv, net_sent) = {
        let mut nets = state.nets.lock().await;
        nets.refresh(true);
        // received()/transmitted() are deltas since the last refresh
        let (drx, dtx) = nets
            .iter()
            .fold((0u64, 0u64), |(rx, tx), (_, data)| {
                (rx.saturating_add(data.received()), tx.saturating_add(data.transmitted()))
            });
        let mut totals = state.net_totals.lock().await;
        totals.0 = totals.0.saturating_add(drx);
        totals.1 = totals.1.saturating_add(dtx);
        *totals
    };

    Sample {
        cpu_percent: if cpu_percent.is_finite() { cpu_percent.clamp(0.0, 100.0) } else { 0.0 },
        disk_free,
        disk_total,
        disk_used: disk_total.saturating_sub(disk_free),
        memory_total,
        memory_used,
        net_recv,
        net_sent,
    }
}

/// (total, available) of the root mount, or the sum over all disks when no
/// root mount is listed. Disks reporting no free space (overlays, squashfs)
/// are skipped in the sum.
pub fn disk_figures<'a, I>(disks: I) -> (u64, u64)
where
    I: IntoIterator<Item = (&'a Path, u64, u64)>,
{
    let mut sum = (0u64, 0u64);
    for (mount, total, available) in disks {
        if mount == Path::new("/") {
            return (total, available);
        }
        if available > 0 {
            sum.0 = sum.0.saturating_add(total);
            sum.1 = sum.1.saturating_add(available);
        }
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn root_mount_wins() {
        let disks = [
            (Path::new("/boot"), 100, 50),
            (Path::new("/"), 1000, 400),
            (Path::new("/home"), 5000, 10),
        ];
        assert_eq!(disk_figures(disks), (1000, 400));
    }

    #[test]
    fn sums_when_no_root() {
        let disks = [
            (Path::new("C:\\"), 1000, 400),
            (Path::new("D:\\"), 500, 100),
            (Path::new("/snap/core"), 64, 0),
        ];
        assert_eq!(disk_figures(disks), (1500, 500));
        assert_eq!(disk_figures(std::iter::empty()), (0, 0));
    }

    #[tokio::test]
    async fn samples_are_sane_and_counters_monotonic() {
        let state = AppState::new(Duration::from_secs(3));
        let a = collect_sample(&state).await;
        tokio::time::sleep(Duration::from_millis(250)).await;
        let b = collect_sample(&state).await;
        assert!((0.0..=100.0).contains(&b.cpu_percent));
        assert!(b.memory_used <= b.memory_total);
        assert_eq!(b.disk_used + b.disk_free, b.disk_total);
        assert!(b.net_recv >= a.net_recv);
        assert!(b.net_sent >= a.net_sent);
    }
}
