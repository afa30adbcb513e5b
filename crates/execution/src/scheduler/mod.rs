//! Timing for evaluation cycles.
//!
//! The scheduler only emits [`TaskEvent`]s on a channel; the receiver decides
//! what to run. A slow consumer delays events rather than overlapping them.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior, interval};
use tracing::{debug, info, warn};

/// Resolution of the scheduler's check loop.
const TICK: Duration = Duration::from_millis(250);

/// When a task fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schedule {
    /// Repeatedly, with a fixed pause between runs.
    Interval(Duration),
    /// Once, after a delay.
    Once(Duration),
}

impl Schedule {
    /// Every `secs` seconds.
    #[must_use]
    pub fn every_secs(secs: u64) -> Self {
        Self::Interval(Duration::from_secs(secs))
    }

    fn delay(&self) -> Duration {
        match self {
            Self::Interval(period) | Self::Once(period) => *period,
        }
    }
}

/// A scheduled task.
#[derive(Debug, Clone)]
pub struct ScheduledTask {
    /// Task name.
    pub name: String,
    /// Schedule.
    pub schedule: Schedule,
    /// Whether task is enabled.
    pub enabled: bool,
    /// Fire as soon as the scheduler starts instead of after the first delay.
    pub run_immediately: bool,
    /// Last run time.
    pub last_run: Option<Instant>,
    /// Next scheduled run.
    pub next_run: Option<Instant>,
}

impl ScheduledTask {
    /// Creates a new scheduled task.
    pub fn new(name: impl Into<String>, schedule: Schedule) -> Self {
        Self {
            name: name.into(),
            schedule,
            enabled: true,
            run_immediately: false,
            last_run: None,
            next_run: None,
        }
    }

    /// Fires the first run on start.
    #[must_use]
    pub fn immediately(mut self) -> Self {
        self.run_immediately = true;
        self
    }

    /// Disables the task.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Returns the event to emit if the task is due at `now`, and advances
    /// its next run.
    fn poll(&mut self, now: Instant) -> Option<TaskEvent> {
        if !self.enabled {
            return None;
        }
        let next_run = self.next_run?;
        if now < next_run {
            return None;
        }

        self.last_run = Some(now);
        match self.schedule {
            Schedule::Interval(period) => self.next_run = Some(now + period),
            Schedule::Once(_) => {
                self.next_run = None;
                self.enabled = false;
            }
        }

        Some(TaskEvent {
            task_name: self.name.clone(),
            scheduled_at: next_run,
            triggered_at: now,
        })
    }
}

/// Event sent when a task should run.
#[derive(Debug, Clone)]
pub struct TaskEvent {
    /// Task name.
    pub task_name: String,
    /// Scheduled time.
    pub scheduled_at: Instant,
    /// Actual trigger time.
    pub triggered_at: Instant,
}

/// Stops a running [`Scheduler`] from another task.
#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    running: Arc<AtomicBool>,
}

impl SchedulerHandle {
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Emits task events on their schedules.
pub struct Scheduler {
    /// Scheduled tasks.
    tasks: Vec<ScheduledTask>,
    /// Event sender.
    event_tx: mpsc::Sender<TaskEvent>,
    /// Event receiver.
    event_rx: Option<mpsc::Receiver<TaskEvent>>,
    /// Running flag.
    running: Arc<AtomicBool>,
}

impl Scheduler {
    /// Creates a new scheduler.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(100);
        Self {
            tasks: Vec::new(),
            event_tx: tx,
            event_rx: Some(rx),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Adds a task to the scheduler.
    pub fn add_task(&mut self, task: ScheduledTask) {
        info!(task = %task.name, schedule = ?task.schedule, "Adding task to scheduler");
        self.tasks.push(task);
    }

    /// Takes the event receiver for processing events.
    pub fn take_receiver(&mut self) -> Option<mpsc::Receiver<TaskEvent>> {
        self.event_rx.take()
    }

    /// Returns a handle that can stop the scheduler while it runs.
    #[must_use]
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            running: Arc::clone(&self.running),
        }
    }

    /// Runs until stopped, every task is finished, or the receiver is dropped.
    pub async fn start(&mut self) {
        self.running.store(true, Ordering::SeqCst);
        info!(tasks = self.tasks.len(), "Starting scheduler");

        let now = Instant::now();
        for task in &mut self.tasks {
            let first = if task.run_immediately {
                now
            } else {
                now + task.schedule.delay()
            };
            task.next_run = Some(first);
        }

        let mut check_interval = interval(TICK);
        check_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while self.running.load(Ordering::SeqCst) {
            check_interval.tick().await;
            let now = Instant::now();

            let events: Vec<TaskEvent> = self
                .tasks
                .iter_mut()
                .filter_map(|task| task.poll(now))
                .collect();

            for event in events {
                debug!(task = %event.task_name, "Task triggered");
                if let Err(e) = self.event_tx.send(event).await {
                    warn!(error = %e, "Event receiver dropped, stopping scheduler");
                    self.stop();
                    break;
                }
            }

            if self.tasks.iter().all(|task| !task.enabled) {
                debug!("No enabled tasks left");
                self.stop();
            }
        }

        info!("Scheduler stopped");
    }

    /// Stops the scheduler.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Gets all tasks.
    pub fn tasks(&self) -> &[ScheduledTask] {
        &self.tasks
    }

    /// Checks if the scheduler is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
