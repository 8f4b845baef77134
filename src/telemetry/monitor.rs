use std::time::{Duration, Instant};

use chrono::{DateTime, Local, TimeDelta};
use log::{debug, info};

use crate::{LiveGraphError, schedule::PeriodicTask};

use super::{
    Retention, SeriesBuffer, SourceRead, TelemetryRecord, TelemetrySource, TimeAxis,
    parse_mission_time,
    summary::{WAITING_FOR_DATA, format_summary},
};

pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_millis(1000);
pub const DEFAULT_RENDER_PERIOD: Duration = Duration::from_millis(33);

/// What a successful refresh did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new sample was appended and the summary republished
    Updated,
    /// The source has no rows yet, nothing changed
    NoData,
}

/// Points the plot canvas should draw, oldest first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlotFrame {
    pub points: Vec<[f64; 2]>,
    /// Incremented on every render tick
    pub generation: u64,
}

/// What happened during a call to [`TelemetryMonitor::tick`].
#[derive(Debug, Default)]
pub struct TickReport {
    pub refresh: Option<Result<RefreshOutcome, LiveGraphError>>,
    pub rendered: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct MonitorSettings {
    pub refresh_period: Duration,
    pub render_period: Duration,
    pub retention: Retention,
    pub time_axis: TimeAxis,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            refresh_period: DEFAULT_REFRESH_PERIOD,
            render_period: DEFAULT_RENDER_PERIOD,
            retention: Retention::Unbounded,
            time_axis: TimeAxis::Elapsed,
        }
    }
}

/// Owns the telemetry source, the series buffer and the two periodic tasks that
/// refresh and render them.
///
/// The monitor is the only writer of the series and the summary. Every operation
/// takes `&mut self`, so a refresh runs to completion before another refresh or a
/// render can start.
pub struct TelemetryMonitor<S: TelemetrySource> {
    source: S,
    series: SeriesBuffer,
    time_axis: TimeAxis,
    refresh_task: PeriodicTask,
    render_task: PeriodicTask,
    summary: String,
    next_update: DateTime<Local>,
    first_refresh_at: Option<Instant>,
    mission_time_origin: Option<f64>,
    samples_taken: u64,
    frame: PlotFrame,
}

impl<S: TelemetrySource> TelemetryMonitor<S> {
    pub fn new(source: S, settings: MonitorSettings, wall_now: DateTime<Local>) -> Self {
        Self {
            source,
            series: SeriesBuffer::new(settings.retention),
            time_axis: settings.time_axis,
            refresh_task: PeriodicTask::new("refresh", settings.refresh_period),
            render_task: PeriodicTask::new("render", settings.render_period),
            summary: WAITING_FOR_DATA.to_string(),
            next_update: wall_now + period_delta(settings.refresh_period),
            first_refresh_at: None,
            mission_time_origin: None,
            samples_taken: 0,
            frame: PlotFrame::default(),
        }
    }

    /// Starts both periodic tasks, the first refresh and render are due right away.
    pub fn start(&mut self, now: Instant) {
        info!("Polling {}", self.source.describe());
        for task in [&mut self.refresh_task, &mut self.render_task] {
            info!("Starting {} task every {:?}", task.name(), task.period());
            task.start(now);
        }
    }

    pub fn stop(&mut self) {
        self.refresh_task.stop();
        self.render_task.stop();
    }

    /// Pauses or resumes polling the source. Rendering keeps going so the plot stays
    /// interactive.
    pub fn set_refresh_paused(&mut self, paused: bool, now: Instant) {
        if paused {
            info!("Pausing {} task", self.refresh_task.name());
            self.refresh_task.stop();
        } else {
            info!("Resuming {} task", self.refresh_task.name());
            self.refresh_task.start(now);
        }
    }

    pub fn is_refresh_paused(&self) -> bool {
        !self.refresh_task.is_running()
    }

    /// Runs whichever tasks are due at `now`. Refresh runs before render so a frame
    /// drawn in the same tick includes the new sample.
    pub fn tick(&mut self, now: Instant, wall_now: DateTime<Local>) -> TickReport {
        let mut report = TickReport::default();
        if self.refresh_task.poll(now) {
            report.refresh = Some(self.refresh(now, wall_now));
        }
        if self.render_task.poll(now) {
            self.render();
            report.rendered = true;
        }
        report
    }

    /// Reads the newest record and publishes it.
    ///
    /// On error nothing is modified: the series, the summary and the next update time
    /// keep their previous values.
    pub fn refresh(
        &mut self,
        now: Instant,
        wall_now: DateTime<Local>,
    ) -> Result<RefreshOutcome, LiveGraphError> {
        let record = match self.source.latest()? {
            SourceRead::Record(record) => record,
            SourceRead::NoData => return Ok(RefreshOutcome::NoData),
        };

        let time = self.sample_time(&record, now)?;
        self.series.push(time, record.altitude);
        self.samples_taken += 1;
        if self.samples_taken == 1 {
            info!("First telemetry packet from team {}", record.team_id);
        }
        debug!(
            "Packet {} at t={:.2}s, altitude {:.2} m",
            record.packet_count, time, record.altitude
        );

        self.summary = format_summary(&record, &self.next_update);
        self.next_update = wall_now + period_delta(self.refresh_task.period());
        Ok(RefreshOutcome::Updated)
    }

    /// Computes the x coordinate for a new sample, committing any time origin only
    /// once the sample is known to be valid.
    fn sample_time(
        &mut self,
        record: &TelemetryRecord,
        now: Instant,
    ) -> Result<f64, LiveGraphError> {
        match self.time_axis {
            TimeAxis::Elapsed => {
                let first = *self.first_refresh_at.get_or_insert(now);
                Ok(now.saturating_duration_since(first).as_secs_f64())
            }
            TimeAxis::Tick => Ok(self.samples_taken as f64),
            TimeAxis::MissionTime => {
                let seconds = parse_mission_time(&record.mission_time)?;
                let origin = *self.mission_time_origin.get_or_insert(seconds);
                let time = seconds - origin;
                let went_back = self.series.last().is_some_and(|[last, _]| time < last);
                if time < 0. || went_back {
                    info!(
                        "Mission time went back to {}, starting a new plot",
                        record.mission_time
                    );
                    self.series.clear();
                    self.mission_time_origin = Some(seconds);
                    return Ok(0.);
                }
                Ok(time)
            }
        }
    }

    /// Snapshots the series into the frame the plot canvas draws.
    pub fn render(&mut self) -> &PlotFrame {
        self.frame.points = self.series.points();
        self.frame.generation += 1;
        &self.frame
    }

    pub fn frame(&self) -> &PlotFrame {
        &self.frame
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn series(&self) -> &SeriesBuffer {
        &self.series
    }

    /// Instant shown on the next refresh's "Next update" line.
    pub fn next_update(&self) -> DateTime<Local> {
        self.next_update
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Time until either task is due, `None` when both are stopped.
    pub fn time_until_next_tick(&self, now: Instant) -> Option<Duration> {
        match (
            self.refresh_task.time_until_due(now),
            self.render_task.time_until_due(now),
        ) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

fn period_delta(period: Duration) -> TimeDelta {
    TimeDelta::milliseconds(period.as_millis() as i64)
}
