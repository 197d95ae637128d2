//! Station runtime: acquisition threads and the fixed-rate sampling loop.
//!
//! Each adapter runs on its own thread and publishes into a [`SampleSlot`].
//! The sampling loop wakes every `tick_interval_ms`, takes the latest fresh
//! sample from each slot and runs one fusion tick. Samples older than
//! `stale_timeout_s` count as missing, which the engine turns into a
//! fail-safe tick.

use crate::clock::MonotonicClock;
use crate::handoff::SampleSlot;
use crate::sinks::RecordWriter;
use crate::stats::TickStats;
use guard_common::config::{ConfigError, GuardConfig};
use guard_common::sensor::{ActuationSink, AdapterError, AdapterStatus, RangeAdapter, VisionAdapter};
use guard_common::types::{RangeSample, VisionSample};
use guard_core::fusion::FusionEngine;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Fatal runtime errors.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Configuration rejected while building the engine.
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    /// Record file could not be created.
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),

    /// Adapter failed to close cleanly.
    #[error("adapter: {0}")]
    Adapter(#[from] AdapterError),

    /// An acquisition thread panicked.
    #[error("acquisition thread '{0}' panicked")]
    Thread(&'static str),
}

/// What happened during one `run`.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Ticks executed.
    pub ticks: u64,
    /// Ticks with a missing or rejected input.
    pub faulted_ticks: u64,
    /// Ticks with the output enabled.
    pub enabled_ticks: u64,
    /// Safety state transitions.
    pub transitions: u64,
    /// Failed actuation calls.
    pub sink_errors: u64,
    /// Records written.
    pub records: u64,
    /// Tick timing.
    pub stats: TickStats,
}

/// Owns the engine and drives it at a fixed rate.
pub struct GuardRuntime {
    config: GuardConfig,
    engine: FusionEngine,
    clock: MonotonicClock,
    running: Arc<AtomicBool>,
    tick_interval: Duration,
}

impl GuardRuntime {
    /// Build the engine from a validated configuration.
    pub fn new(config: GuardConfig, clock: MonotonicClock) -> Result<Self, RuntimeError> {
        let engine = FusionEngine::new(&config)?;
        let tick_interval = Duration::from_millis(config.runtime.tick_interval_ms);
        info!(
            service = %config.shared.service_name,
            tick_interval_ms = config.runtime.tick_interval_ms,
            stale_timeout_s = config.runtime.stale_timeout_s,
            on_line_policy = ?config.policy.on_line_policy,
            "guard runtime created"
        );
        Ok(Self {
            config,
            engine,
            clock,
            running: Arc::new(AtomicBool::new(false)),
            tick_interval,
        })
    }

    /// Get the running flag for signal handlers.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Run until the range adapter stops, `max_ticks` is reached or the
    /// running flag is cleared. Adapters are closed before returning.
    pub fn run(
        &mut self,
        range: Box<dyn RangeAdapter>,
        vision: Box<dyn VisionAdapter>,
        sink: &mut dyn ActuationSink,
        max_ticks: Option<u64>,
    ) -> Result<RunSummary, RuntimeError> {
        let mut recorder = match &self.config.runtime.record_path {
            Some(path) => Some(RecordWriter::create(path, self.config.runtime.record_format)?),
            None => None,
        };

        self.running.store(true, Ordering::SeqCst);
        let range_slot = SampleSlot::<RangeSample>::new();
        let vision_slot = SampleSlot::<VisionSample>::new();
        let range_thread = spawn_range(range, range_slot.clone(), Arc::clone(&self.running))?;
        let vision_thread =
            match spawn_vision(vision, vision_slot.clone(), Arc::clone(&self.running)) {
                Ok(handle) => handle,
                Err(e) => {
                    error!(error = %e, "vision thread spawn failed");
                    stop_range(range_thread, &self.running)?;
                    return Err(e.into());
                }
            };

        info!(
            tick_interval_ms = self.config.runtime.tick_interval_ms,
            max_ticks = ?max_ticks,
            "sampling loop started"
        );

        let stale_s = self.config.runtime.stale_timeout_s;
        let mut summary = RunSummary {
            ticks: 0,
            faulted_ticks: 0,
            enabled_ticks: 0,
            transitions: 0,
            sink_errors: 0,
            records: 0,
            stats: TickStats::new(),
        };
        let mut next_wake = Instant::now() + self.tick_interval;

        while self.running.load(Ordering::SeqCst) {
            if max_ticks.is_some_and(|max| summary.ticks >= max) {
                info!(ticks = summary.ticks, "tick limit reached");
                break;
            }
            if range_thread.is_finished() {
                info!("range adapter stopped, ending run");
                break;
            }

            let tick_start = Instant::now();
            let now = self.clock.now_s();
            let state = self.engine.tick(
                range_slot.fresh(now, stale_s),
                vision_slot.fresh(now, stale_s),
            );

            summary.ticks += 1;
            if state.fault.is_some() {
                summary.faulted_ticks += 1;
            }
            if state.output_enabled {
                summary.enabled_ticks += 1;
            }
            if state.state_changed() {
                summary.transitions += 1;
                let lamp = state.lamp();
                info!(
                    state = %state.safety_state,
                    ?lamp,
                    buzzer = lamp.buzzer_on(),
                    "signal lamp"
                );
            }

            if let Err(e) = sink.apply(state.output_enabled, &state.reason) {
                summary.sink_errors += 1;
                error!(error = %e, "actuation sink failed");
            }

            if let Some(writer) = recorder.as_mut() {
                match writer.write(&state.record()) {
                    Ok(()) => summary.records += 1,
                    Err(e) => {
                        error!(error = %e, "record write failed, recording disabled");
                        recorder = None;
                    }
                }
            }

            let elapsed = tick_start.elapsed();
            summary.stats.record(elapsed, self.tick_interval);
            if elapsed > self.tick_interval {
                let overruns = summary.stats.overruns;
                if overruns <= 10 || overruns % 1000 == 0 {
                    warn!(overruns, last_tick_ns = summary.stats.last_tick_ns, "tick overrun");
                }
            }

            // absolute deadlines keep the rate from drifting
            let now = Instant::now();
            if next_wake > now {
                std::thread::sleep(next_wake - now);
                next_wake += self.tick_interval;
            } else {
                next_wake = now + self.tick_interval;
            }
        }

        self.running.store(false, Ordering::SeqCst);
        let mut range = join(range_thread, "range")?;
        let _vision = join(vision_thread, "vision")?;
        range.close()?;

        if let Some(mut writer) = recorder {
            writer.flush()?;
        }

        info!(
            ticks = summary.ticks,
            faulted = summary.faulted_ticks,
            enabled = summary.enabled_ticks,
            transitions = summary.transitions,
            avg_tick_us = summary.stats.avg_tick_ns() / 1000,
            max_tick_us = summary.stats.max_tick_ns / 1000,
            overruns = summary.stats.overruns,
            "sampling loop stopped"
        );
        Ok(summary)
    }

    /// The engine, e.g. to inspect the final safety state.
    pub fn engine(&self) -> &FusionEngine {
        &self.engine
    }
}

fn spawn_range(
    mut adapter: Box<dyn RangeAdapter>,
    slot: SampleSlot<RangeSample>,
    running: Arc<AtomicBool>,
) -> std::io::Result<JoinHandle<Box<dyn RangeAdapter>>> {
    std::thread::Builder::new()
        .name("range-acq".into())
        .spawn(move || {
            let mut last_status = adapter.status();
            debug!(
                adapter = adapter.name(),
                max_range_m = adapter.max_range_m(),
                status = %last_status,
                "range acquisition started"
            );
            while running.load(Ordering::SeqCst) {
                let sample = adapter.read();
                let status = adapter.status();
                if status != last_status {
                    if status.is_ready() {
                        info!(adapter = adapter.name(), from = %last_status, "range adapter ready");
                    } else {
                        warn!(
                            adapter = adapter.name(),
                            from = %last_status,
                            to = %status,
                            "range adapter status changed"
                        );
                    }
                    last_status = status;
                }
                match (status, sample) {
                    (AdapterStatus::Stopped, _) => break,
                    (AdapterStatus::Ready, Some(s)) => slot.publish(s),
                    _ => {}
                }
            }
            adapter
        })
}

fn spawn_vision(
    mut adapter: Box<dyn VisionAdapter>,
    slot: SampleSlot<VisionSample>,
    running: Arc<AtomicBool>,
) -> std::io::Result<JoinHandle<Box<dyn VisionAdapter>>> {
    std::thread::Builder::new()
        .name("vision-acq".into())
        .spawn(move || {
            debug!(adapter = adapter.name(), "vision acquisition started");
            while running.load(Ordering::SeqCst) {
                if let Some(sample) = adapter.read() {
                    slot.publish(sample);
                }
            }
            adapter
        })
}

/// Stop the range thread, join it and close its adapter.
fn stop_range(
    handle: JoinHandle<Box<dyn RangeAdapter>>,
    running: &AtomicBool,
) -> Result<(), RuntimeError> {
    running.store(false, Ordering::SeqCst);
    let mut range = join(handle, "range")?;
    range.close()?;
    Ok(())
}

fn join<T>(handle: JoinHandle<T>, name: &'static str) -> Result<T, RuntimeError> {
    handle.join().map_err(|_| RuntimeError::Thread(name))
}
