// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cron-driven scheduler
//!
//! One `ScheduledJob` per registered bot tracks when it is next due. Each
//! check queues every due job and immediately projects its next run, so a
//! slow cycle cannot fire the same occurrence twice. Queued runs are then
//! admitted only while fewer than `max_concurrent` are executing.

use crate::error::SchedulerError;
use crate::queue::{FailOutcome, QueueStatus, QueuedJob, RunQueue};
use crate::runner::BotRunner;
use botwork_core::{
    BotConfig, Clock, CronParser, ExecutionResult, ExecutionStatus, IdGen, ScheduleConfig,
    SchedulerSettings, SystemClock, TriggerType, UuidIdGen,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Called after every scheduled run that produced a result
pub type ExecutionHook = Arc<dyn Fn(&ScheduledJob, &ExecutionResult) + Send + Sync>;
/// Called whenever a queued run could not be started
pub type ErrorHook = Arc<dyn Fn(&QueuedJob, &SchedulerError) + Send + Sync>;

/// Compact record of a finished run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub run_id: String,
    pub status: ExecutionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl From<&ExecutionResult> for RunSummary {
    fn from(result: &ExecutionResult) -> Self {
        Self {
            run_id: result.run_id.clone(),
            status: result.status,
            duration_ms: result.duration_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledJob {
    pub id: String,
    pub bot_id: String,
    pub bot_name: String,
    pub schedule: ScheduleConfig,
    pub next_run_at: Option<DateTime<Utc>>,
    pub active: bool,
    /// Completed scheduled runs; manual triggers are not counted
    pub execution_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_run_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_run_result: Option<RunSummary>,
}

impl ScheduledJob {
    /// Whether `max_executions` leaves no room once `pending` runs finish
    fn limit_reached(&self, pending: usize) -> bool {
        self.schedule
            .max_executions
            .is_some_and(|max| self.execution_count + pending as u64 >= max)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingRun {
    pub bot_id: String,
    pub bot_name: String,
    pub run_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStats {
    pub jobs: usize,
    pub active_jobs: usize,
    pub queued: usize,
    pub executing: usize,
    pub running: bool,
}

#[derive(Default)]
struct State {
    /// Keyed by bot id; ordered so checks are deterministic
    jobs: BTreeMap<String, ScheduledJob>,
    bots: HashMap<String, BotConfig>,
    queue: RunQueue,
    /// Queue ids of runs in flight
    executing: HashSet<String>,
    shutdown: Option<CancellationToken>,
}

#[derive(Default)]
struct Hooks {
    execution: Vec<ExecutionHook>,
    error: Vec<ErrorHook>,
}

pub struct BotScheduler<R: BotRunner, C: Clock = SystemClock, I: IdGen = UuidIdGen> {
    runner: Arc<R>,
    settings: SchedulerSettings,
    state: Arc<Mutex<State>>,
    hooks: Arc<RwLock<Hooks>>,
    clock: C,
    ids: I,
}

impl<R: BotRunner, C: Clock, I: IdGen> Clone for BotScheduler<R, C, I> {
    fn clone(&self) -> Self {
        Self {
            runner: Arc::clone(&self.runner),
            settings: self.settings.clone(),
            state: Arc::clone(&self.state),
            hooks: Arc::clone(&self.hooks),
            clock: self.clock.clone(),
            ids: self.ids.clone(),
        }
    }
}

impl<R: BotRunner> BotScheduler<R> {
    pub fn new(runner: Arc<R>, settings: SchedulerSettings) -> Self {
        Self::with_deps(runner, settings, SystemClock, UuidIdGen)
    }
}

impl<R: BotRunner, C: Clock, I: IdGen> BotScheduler<R, C, I> {
    pub fn with_deps(runner: Arc<R>, settings: SchedulerSettings, clock: C, ids: I) -> Self {
        Self {
            runner,
            settings,
            state: Arc::new(Mutex::new(State::default())),
            hooks: Arc::new(RwLock::new(Hooks::default())),
            clock,
            ids,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    // -- registration --

    /// Track a bot with a schedule, replacing any earlier registration
    pub fn register_bot(&self, bot: BotConfig) -> Result<ScheduledJob, SchedulerError> {
        let schedule = bot
            .schedule
            .clone()
            .ok_or_else(|| SchedulerError::NoSchedule(bot.id.clone()))?;
        let next_run_at = first_run(&bot.id, &schedule, self.clock.now())?;

        let job = ScheduledJob {
            id: self.ids.next("job"),
            bot_id: bot.id.clone(),
            bot_name: bot.name.clone(),
            active: schedule.enabled,
            schedule,
            next_run_at: Some(next_run_at),
            execution_count: 0,
            last_run_at: None,
            last_run_result: None,
        };
        tracing::info!(
            bot_id = %job.bot_id,
            job_id = %job.id,
            next_run_at = %next_run_at,
            active = job.active,
            "bot scheduled"
        );

        let mut state = self.lock();
        state.jobs.insert(bot.id.clone(), job.clone());
        state.bots.insert(bot.id.clone(), bot);
        Ok(job)
    }

    /// Forget a bot and drop its waiting queue entries
    pub fn unregister_bot(&self, bot_id: &str) -> bool {
        let mut state = self.lock();
        let removed = state.jobs.remove(bot_id).is_some();
        state.bots.remove(bot_id);
        let dropped = state.queue.remove_bot(bot_id);
        if removed {
            tracing::info!(bot_id, dropped, "bot unscheduled");
        }
        removed
    }

    /// Pause or resume a job; resuming a cron job re-projects from now
    pub fn set_active(&self, bot_id: &str, active: bool) -> Result<(), SchedulerError> {
        let now = self.clock.now();
        let mut state = self.lock();
        let job = state
            .jobs
            .get_mut(bot_id)
            .ok_or_else(|| SchedulerError::UnknownBot(bot_id.to_string()))?;
        if active && !job.active && !job.schedule.is_one_time() {
            if let Some(expr) = job.schedule.cron_expression.as_deref() {
                job.next_run_at = Some(CronParser::next_run(expr, now).map_err(|source| {
                    SchedulerError::InvalidCron {
                        bot_id: bot_id.to_string(),
                        source,
                    }
                })?);
            }
        }
        job.active = active;
        tracing::info!(bot_id, active, "job availability changed");
        Ok(())
    }

    pub fn get_job(&self, bot_id: &str) -> Option<ScheduledJob> {
        self.lock().jobs.get(bot_id).cloned()
    }

    /// Every job, ordered by bot id
    pub fn list_jobs(&self) -> Vec<ScheduledJob> {
        self.lock().jobs.values().cloned().collect()
    }

    // -- hooks --

    pub fn on_execution(&self, hook: impl Fn(&ScheduledJob, &ExecutionResult) + Send + Sync + 'static) {
        let mut hooks = self.hooks.write().unwrap_or_else(|e| e.into_inner());
        hooks.execution.push(Arc::new(hook));
    }

    pub fn on_error(&self, hook: impl Fn(&QueuedJob, &SchedulerError) + Send + Sync + 'static) {
        let mut hooks = self.hooks.write().unwrap_or_else(|e| e.into_inner());
        hooks.error.push(Arc::new(hook));
    }

    // -- the cycle --

    /// Queue every due job; returns how many were queued
    pub fn check_and_queue(&self) -> usize {
        let now = self.clock.now();
        let mut guard = self.lock();
        let State { jobs, queue, .. } = &mut *guard;

        let mut queued = 0;
        for job in jobs.values_mut() {
            if !job.active {
                continue;
            }
            let Some(due) = job.next_run_at.filter(|at| *at <= now) else {
                continue;
            };
            if job.limit_reached(queue.pending_for(&job.id)) {
                tracing::info!(bot_id = %job.bot_id, "execution limit reached");
                job.active = false;
                continue;
            }

            let queue_id = self.ids.next("queue");
            tracing::debug!(bot_id = %job.bot_id, queue_id = %queue_id, due = %due, "queued");
            queue.push(QueuedJob {
                queue_id,
                job_id: job.id.clone(),
                bot_id: job.bot_id.clone(),
                scheduled_for: due,
                queued_at: now,
                priority: job.schedule.priority,
                attempts: 0,
                max_attempts: self.settings.max_attempts,
                status: QueueStatus::Queued,
                last_error: None,
            });
            queued += 1;
            advance(job, now);
        }
        queued
    }

    /// Start as many queued runs as free slots allow
    ///
    /// The returned handles finish when each run has been recorded.
    pub fn process_queue(&self) -> Vec<JoinHandle<()>> {
        let claimed = {
            let mut state = self.lock();
            let free = self
                .settings
                .max_concurrent
                .saturating_sub(state.executing.len());
            let claimed = state.queue.claim(free);
            for job in &claimed {
                state.executing.insert(job.queue_id.clone());
            }
            claimed
        };

        claimed
            .into_iter()
            .map(|job| {
                let scheduler = self.clone();
                tokio::spawn(async move { scheduler.run_queued(job).await })
            })
            .collect()
    }

    /// One scheduler cycle: queue what is due, then admit what fits
    pub fn tick(&self) -> Vec<JoinHandle<()>> {
        let queued = self.check_and_queue();
        let started = self.process_queue();
        if queued > 0 || !started.is_empty() {
            tracing::debug!(queued, started = started.len(), "scheduler tick");
        }
        started
    }

    async fn run_queued(&self, queued: QueuedJob) {
        let bot = self.lock().bots.get(&queued.bot_id).cloned();
        let Some(bot) = bot else {
            let mut state = self.lock();
            state.executing.remove(&queued.queue_id);
            state.queue.complete(&queued.queue_id);
            tracing::warn!(bot_id = %queued.bot_id, "bot unregistered before its run started");
            return;
        };

        let trigger_data = json!({
            "scheduledFor": queued.scheduled_for.to_rfc3339(),
            "queueId": queued.queue_id,
            "attempt": queued.attempts,
        });
        let span = tracing::info_span!(
            "scheduled",
            queue_id = %queued.queue_id,
            bot_id = %queued.bot_id,
            attempt = queued.attempts
        );
        let outcome = self
            .runner
            .run_bot(&bot, TriggerType::Schedule, trigger_data)
            .instrument(span)
            .await;

        match outcome {
            Ok(result) => {
                let job = {
                    let mut state = self.lock();
                    state.executing.remove(&queued.queue_id);
                    state.queue.complete(&queued.queue_id);
                    let now = self.clock.now();
                    state
                        .jobs
                        .get_mut(&queued.bot_id)
                        .filter(|job| job.id == queued.job_id)
                        .map(|job| {
                            job.execution_count += 1;
                            job.last_run_at = Some(result.completed_at.unwrap_or(now));
                            job.last_run_result = Some(RunSummary::from(&result));
                            if job.limit_reached(0) {
                                job.active = false;
                            }
                            job.clone()
                        })
                };
                tracing::info!(
                    bot_id = %queued.bot_id,
                    run_id = %result.run_id,
                    status = %result.status,
                    "scheduled run finished"
                );
                if let Some(job) = job {
                    let hooks = self.execution_hooks();
                    for hook in hooks {
                        hook(&job, &result);
                    }
                }
            }
            Err(e) => {
                let outcome = {
                    let mut state = self.lock();
                    state.executing.remove(&queued.queue_id);
                    state.queue.fail(&queued.queue_id, e.to_string())
                };
                let error = SchedulerError::Engine(e);
                let job = match outcome {
                    Some(FailOutcome::Requeued(job)) => {
                        tracing::warn!(
                            bot_id = %job.bot_id,
                            attempts = job.attempts,
                            error = %error,
                            "scheduled run not started, requeued"
                        );
                        job
                    }
                    Some(FailOutcome::Exhausted(job)) => {
                        tracing::error!(
                            bot_id = %job.bot_id,
                            attempts = job.attempts,
                            error = %error,
                            "scheduled run dropped after exhausting attempts"
                        );
                        job
                    }
                    None => return,
                };
                let hooks = self.error_hooks();
                for hook in hooks {
                    hook(&job, &error);
                }
            }
        }
    }

    fn execution_hooks(&self) -> Vec<ExecutionHook> {
        let hooks = self.hooks.read().unwrap_or_else(|e| e.into_inner());
        hooks.execution.clone()
    }

    fn error_hooks(&self) -> Vec<ErrorHook> {
        let hooks = self.hooks.read().unwrap_or_else(|e| e.into_inner());
        hooks.error.clone()
    }

    // -- lifecycle --

    /// Spawn the poll loop: an immediate check, then one per `check_interval`
    pub fn start(&self) -> Result<JoinHandle<()>, SchedulerError> {
        let shutdown = {
            let mut state = self.lock();
            if state.shutdown.is_some() {
                return Err(SchedulerError::AlreadyRunning);
            }
            let token = CancellationToken::new();
            state.shutdown = Some(token.clone());
            token
        };

        let period = self.settings.check_interval;
        tracing::info!(
            check_interval_ms = period.as_millis() as u64,
            max_concurrent = self.settings.max_concurrent,
            "scheduler started"
        );

        let scheduler = self.clone();
        Ok(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = interval.tick() => {
                        scheduler.tick();
                    }
                }
            }
            tracing::info!("scheduler stopped");
        }))
    }

    /// Stop the poll loop; runs already executing finish on their own
    pub fn stop(&self) -> bool {
        match self.lock().shutdown.take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.lock().shutdown.is_some()
    }

    // -- manual firing --

    /// Run a registered bot now, outside its schedule and the queue
    pub async fn trigger_job(&self, bot_id: &str) -> Result<ExecutionResult, SchedulerError> {
        let bot = self
            .lock()
            .bots
            .get(bot_id)
            .cloned()
            .ok_or_else(|| SchedulerError::UnknownBot(bot_id.to_string()))?;

        let trigger_data = json!({
            "manual": true,
            "triggeredAt": self.clock.now().to_rfc3339(),
        });
        tracing::info!(bot_id, "manual trigger");
        let result = self
            .runner
            .run_bot(&bot, TriggerType::Manual, trigger_data)
            .await?;

        let mut state = self.lock();
        if let Some(job) = state.jobs.get_mut(bot_id) {
            job.last_run_at = Some(result.completed_at.unwrap_or_else(|| self.clock.now()));
            job.last_run_result = Some(RunSummary::from(&result));
        }
        Ok(result)
    }

    // -- read-only views --

    /// The next `limit` runs across all active jobs, soonest first
    pub fn get_upcoming_runs(&self, limit: usize) -> Vec<UpcomingRun> {
        let mut runs: Vec<UpcomingRun> = self
            .lock()
            .jobs
            .values()
            .filter(|job| job.active)
            .filter_map(|job| {
                Some(UpcomingRun {
                    bot_id: job.bot_id.clone(),
                    bot_name: job.bot_name.clone(),
                    run_at: job.next_run_at?,
                })
            })
            .collect();
        runs.sort_by(|a, b| a.run_at.cmp(&b.run_at).then(a.bot_id.cmp(&b.bot_id)));
        runs.truncate(limit);
        runs
    }

    /// Up to `count` future run times for one bot
    pub fn get_bot_upcoming_runs(
        &self,
        bot_id: &str,
        count: usize,
    ) -> Result<Vec<DateTime<Utc>>, SchedulerError> {
        let job = self
            .get_job(bot_id)
            .ok_or_else(|| SchedulerError::UnknownBot(bot_id.to_string()))?;
        let Some(first) = job.next_run_at.filter(|_| job.active && count > 0) else {
            return Ok(Vec::new());
        };

        let mut runs = vec![first];
        if !job.schedule.is_one_time() {
            if let Some(expr) = job.schedule.cron_expression.as_deref() {
                let more = CronParser::upcoming(expr, first, count - 1).map_err(|source| {
                    SchedulerError::InvalidCron {
                        bot_id: bot_id.to_string(),
                        source,
                    }
                })?;
                runs.extend(more);
            }
        }
        if let Some(max) = job.schedule.max_executions {
            let left = max.saturating_sub(job.execution_count);
            runs.truncate(usize::try_from(left).unwrap_or(usize::MAX));
        }
        Ok(runs)
    }

    pub fn queue_snapshot(&self) -> Vec<QueuedJob> {
        self.lock().queue.snapshot()
    }

    pub fn stats(&self) -> SchedulerStats {
        let state = self.lock();
        SchedulerStats {
            jobs: state.jobs.len(),
            active_jobs: state.jobs.values().filter(|j| j.active).count(),
            queued: state.queue.count(QueueStatus::Queued),
            executing: state.executing.len(),
            running: state.shutdown.is_some(),
        }
    }
}

/// Initial projection: the one-time `runAt`, else the next cron match
fn first_run(
    bot_id: &str,
    schedule: &ScheduleConfig,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, SchedulerError> {
    if let Some(run_at) = schedule.run_at {
        return Ok(run_at);
    }
    let expr = schedule
        .cron_expression
        .as_deref()
        .ok_or_else(|| SchedulerError::EmptySchedule(bot_id.to_string()))?;
    CronParser::next_run(expr, now).map_err(|source| SchedulerError::InvalidCron {
        bot_id: bot_id.to_string(),
        source,
    })
}

/// Project the next occurrence after a firing; one-time jobs retire
fn advance(job: &mut ScheduledJob, now: DateTime<Utc>) {
    if job.schedule.is_one_time() {
        job.active = false;
        job.next_run_at = None;
        return;
    }
    let next = job
        .schedule
        .cron_expression
        .as_deref()
        .map(|expr| CronParser::next_run(expr, now));
    match next {
        Some(Ok(at)) => job.next_run_at = Some(at),
        Some(Err(e)) => {
            tracing::warn!(bot_id = %job.bot_id, error = %e, "no further runs, deactivating");
            job.active = false;
            job.next_run_at = None;
        }
        None => {
            job.active = false;
            job.next_run_at = None;
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
