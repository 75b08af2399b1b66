//! Per-stage resource sampling for `dsa-kg build --monitor`.

#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessesToUpdate, System};

const BYTES_PER_MB: u64 = 1024 * 1024;

/// One sample taken at the end of a build stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageSample {
    pub stage: String,
    pub cpu_usage: f32,
    pub memory_mb: u64,
    pub memory_percent: f32,
    pub since_previous: std::time::Duration,
}

fn memory_percent(process_bytes: u64, total_bytes: u64) -> f32 {
    if total_bytes == 0 {
        0.0
    } else {
        process_bytes as f32 / total_bytes as f32 * 100.0
    }
}

/// Stage with the longest duration, used in the closing summary.
pub fn slowest_stage(samples: &[StageSample]) -> Option<&StageSample> {
    samples.iter().max_by_key(|sample| sample.since_previous)
}

#[cfg(feature = "cli")]
struct MonitorState {
    system: System,
    last_sample_at: Instant,
    peak_memory_mb: u64,
    samples: Vec<StageSample>,
}

/// 建圖過程中的資源使用監控（CPU、記憶體、各階段耗時）
#[cfg(feature = "cli")]
pub struct SystemMonitor {
    pid: Option<Pid>,
    started_at: Instant,
    state: Mutex<MonitorState>,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let pid = if enabled {
            sysinfo::get_current_pid()
                .map_err(|e| tracing::warn!("⚠️ Cannot resolve own PID, monitoring off: {}", e))
                .ok()
        } else {
            None
        };

        let now = Instant::now();
        Self {
            pid,
            started_at: now,
            state: Mutex::new(MonitorState {
                system: System::new(),
                last_sample_at: now,
                peak_memory_mb: 0,
                samples: Vec::new(),
            }),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.pid.is_some()
    }

    /// Samples this process and records the result under `stage`.
    pub fn sample(&self, stage: &str) -> Option<StageSample> {
        let pid = self.pid?;
        let mut state = self.state.lock().ok()?;

        state.system.refresh_memory();
        state
            .system
            .refresh_processes(ProcessesToUpdate::Some(&[pid]), true);

        let process = state.system.process(pid)?;
        let process_bytes = process.memory();
        let cpu_usage = process.cpu_usage();
        let total_bytes = state.system.total_memory();

        let now = Instant::now();
        let sample = StageSample {
            stage: stage.to_string(),
            cpu_usage,
            memory_mb: process_bytes / BYTES_PER_MB,
            memory_percent: memory_percent(process_bytes, total_bytes),
            since_previous: now.duration_since(state.last_sample_at),
        };

        state.last_sample_at = now;
        state.peak_memory_mb = state.peak_memory_mb.max(sample.memory_mb);
        state.samples.push(sample.clone());
        Some(sample)
    }

    pub fn log_stats(&self, stage: &str) {
        if let Some(sample) = self.sample(stage) {
            tracing::info!(
                "📊 {} - CPU: {:.1}%, Memory: {}MB ({:.1}%), Stage time: {:?}",
                sample.stage,
                sample.cpu_usage,
                sample.memory_mb,
                sample.memory_percent,
                sample.since_previous
            );
        }
    }

    pub fn log_final_stats(&self) {
        if !self.is_enabled() {
            return;
        }
        let Ok(state) = self.state.lock() else {
            return;
        };

        let total: Duration = self.started_at.elapsed();
        match slowest_stage(&state.samples) {
            Some(slowest) => tracing::info!(
                "📊 Build finished in {:?}, peak memory {}MB, slowest stage: {} ({:?})",
                total,
                state.peak_memory_mb,
                slowest.stage,
                slowest.since_previous
            ),
            None => tracing::info!("📊 Build finished in {:?}", total),
        }
    }
}

#[cfg(feature = "cli")]
impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// 非 CLI 建置時提供空實現
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn is_enabled(&self) -> bool {
        false
    }

    pub fn sample(&self, _stage: &str) -> Option<StageSample> {
        None
    }

    pub fn log_stats(&self, _stage: &str) {}

    pub fn log_final_stats(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sample(stage: &str, millis: u64) -> StageSample {
        StageSample {
            stage: stage.to_string(),
            cpu_usage: 0.0,
            memory_mb: 10,
            memory_percent: 0.1,
            since_previous: Duration::from_millis(millis),
        }
    }

    #[test]
    fn test_memory_percent() {
        assert_eq!(memory_percent(50, 200), 25.0);
        assert_eq!(memory_percent(50, 0), 0.0);
    }

    #[test]
    fn test_slowest_stage() {
        let samples = vec![sample("Extract", 5), sample("Transform", 900), sample("Load", 40)];
        assert_eq!(slowest_stage(&samples).unwrap().stage, "Transform");
        assert!(slowest_stage(&[]).is_none());
    }

    #[test]
    fn test_disabled_monitor_records_nothing() {
        let monitor = SystemMonitor::new(false);
        assert!(!monitor.is_enabled());
        assert!(monitor.sample("Extract").is_none());
        monitor.log_final_stats();
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_enabled_monitor_samples_current_process() {
        let monitor = SystemMonitor::new(true);
        if !monitor.is_enabled() {
            return;
        }
        let first = monitor.sample("Extract").unwrap();
        assert_eq!(first.stage, "Extract");
        assert!(monitor.sample("Load").is_some());
    }
}
