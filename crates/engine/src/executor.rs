// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bot executor
//!
//! Drives one run end to end: builds the context, walks the enabled actions
//! in order, retries failed attempts with backoff, and folds everything into
//! an `ExecutionResult`. Cancellation and the overall deadline share one
//! token per run, so whichever fires first stops the in-flight action and
//! every later one.

use crate::error::EngineError;
use crate::output::build_final_output;
use crate::retry::{calculate_retry_delay, merged_retry_config};
use crate::validate::validate_bot;
use botwork_actions::{
    Action, ActionError, ActionInput, ActionOutput, ActionRegistry, ValidationResult,
};
use botwork_core::{
    ActionConfig, ActionResult, ActionStatus, BotConfig, Clock, ContextOptions, ErrorInfo,
    EventBus, EventReceiver, ExecutionContext, ExecutionEvent, ExecutionResult, ExecutionStatus,
    ExecutorSettings, IdGen, RetryOverride, SecretSource, SystemClock, TriggerType, UuidIdGen,
};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Per-call parameters for [`BotExecutor::execute_with`]
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    pub trigger_type: TriggerType,
    pub trigger_data: Value,
    /// Use this run id instead of generating one
    pub run_id: Option<String>,
    /// Layered over the bot's own variables
    pub variables: Map<String, Value>,
    /// Sits between the bot's retry settings and each action's
    pub retry: Option<RetryOverride>,
    /// Default for actions that set no `timeoutMs`
    pub action_timeout: Option<Duration>,
    /// Overall deadline for this run
    pub execution_timeout: Option<Duration>,
}

impl ExecuteOptions {
    pub fn new(trigger_type: TriggerType) -> Self {
        Self {
            trigger_type,
            trigger_data: Value::Null,
            run_id: None,
            variables: Map::new(),
            retry: None,
            action_timeout: None,
            execution_timeout: None,
        }
    }

    pub fn trigger_data(mut self, data: Value) -> Self {
        self.trigger_data = data;
        self
    }

    pub fn run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    pub fn variable(mut self, name: impl Into<String>, value: Value) -> Self {
        self.variables.insert(name.into(), value);
        self
    }

    pub fn retry(mut self, retry: RetryOverride) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn action_timeout(mut self, timeout: Duration) -> Self {
        self.action_timeout = Some(timeout);
        self
    }

    pub fn execution_timeout(mut self, timeout: Duration) -> Self {
        self.execution_timeout = Some(timeout);
        self
    }
}

type ActiveRuns = Arc<Mutex<HashMap<String, CancellationToken>>>;

/// Membership in the active-run table; leaving it on drop
struct ActiveRun {
    runs: ActiveRuns,
    run_id: String,
    cancel: CancellationToken,
}

impl Drop for ActiveRun {
    fn drop(&mut self) {
        let mut runs = self.runs.lock().unwrap_or_else(|e| e.into_inner());
        runs.remove(&self.run_id);
    }
}

/// Cancels the run when the overall deadline passes
struct Watchdog(JoinHandle<()>);

impl Watchdog {
    fn arm(deadline: Duration, cancel: CancellationToken, fired: Arc<AtomicBool>) -> Self {
        Self(tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(deadline) => {
                    fired.store(true, Ordering::SeqCst);
                    cancel.cancel();
                }
            }
        }))
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Final outcome of one action plus any flow-control request
struct ActionRun {
    result: ActionResult,
    skip_remaining: Option<String>,
}

#[derive(Clone)]
pub struct BotExecutor<C: Clock = SystemClock, I: IdGen = UuidIdGen> {
    registry: Arc<ActionRegistry>,
    settings: ExecutorSettings,
    secrets: Option<Arc<dyn SecretSource>>,
    events: EventBus,
    active: ActiveRuns,
    clock: C,
    ids: I,
}

impl BotExecutor {
    pub fn new(registry: Arc<ActionRegistry>, settings: ExecutorSettings) -> Self {
        Self::with_deps(registry, settings, SystemClock, UuidIdGen)
    }
}

impl<C: Clock, I: IdGen> BotExecutor<C, I> {
    pub fn with_deps(
        registry: Arc<ActionRegistry>,
        settings: ExecutorSettings,
        clock: C,
        ids: I,
    ) -> Self {
        Self {
            registry,
            settings,
            secrets: None,
            events: EventBus::new(),
            active: Arc::new(Mutex::new(HashMap::new())),
            clock,
            ids,
        }
    }

    /// Where `{{secrets.NAME}}` and plugin secret lookups are resolved
    pub fn with_secret_source(mut self, source: Arc<dyn SecretSource>) -> Self {
        self.secrets = Some(source);
        self
    }

    pub fn registry(&self) -> &Arc<ActionRegistry> {
        &self.registry
    }

    pub fn settings(&self) -> &ExecutorSettings {
        &self.settings
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Receive lifecycle events whose name matches `pattern`
    pub fn on(&self, pattern: &str) -> EventReceiver {
        self.events.listen(pattern)
    }

    pub fn validate_bot(&self, bot: &BotConfig) -> ValidationResult {
        validate_bot(&self.registry, bot)
    }

    pub async fn execute(
        &self,
        bot: &BotConfig,
        trigger_type: TriggerType,
        trigger_data: Value,
    ) -> ExecutionResult {
        self.execute_with(bot, ExecuteOptions::new(trigger_type).trigger_data(trigger_data))
            .await
    }

    /// Run a bot; never fails, problems are described by the result
    pub async fn execute_with(&self, bot: &BotConfig, options: ExecuteOptions) -> ExecutionResult {
        let trigger_type = options.trigger_type;
        let trigger_data = options.trigger_data.clone();
        match self.start(bot, options, None).await {
            Ok(result) => result,
            Err(e) => self.rejected(bot, trigger_type, trigger_data, e),
        }
    }

    /// Like [`execute_with`](Self::execute_with), but refuses when
    /// `max_concurrent_runs` runs are already in flight
    pub async fn try_execute(
        &self,
        bot: &BotConfig,
        options: ExecuteOptions,
    ) -> Result<ExecutionResult, EngineError> {
        self.start(bot, options, self.settings.max_concurrent_runs).await
    }

    /// Cancel an in-flight run; false if no such run is active
    pub fn abort(&self, run_id: &str) -> bool {
        let runs = self.active.lock().unwrap_or_else(|e| e.into_inner());
        match runs.get(run_id) {
            Some(cancel) => {
                tracing::info!(run_id, "aborting run");
                cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Ids of runs currently in flight, sorted
    pub fn active_runs(&self) -> Vec<String> {
        let runs = self.active.lock().unwrap_or_else(|e| e.into_inner());
        let mut ids: Vec<String> = runs.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn active_count(&self) -> usize {
        self.active.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn admit(&self, run_id: &str, limit: Option<usize>) -> Result<ActiveRun, EngineError> {
        let mut runs = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(limit) = limit {
            if runs.len() >= limit {
                return Err(EngineError::AtCapacity { limit });
            }
        }
        if runs.contains_key(run_id) {
            return Err(EngineError::DuplicateRun(run_id.to_string()));
        }
        let cancel = CancellationToken::new();
        runs.insert(run_id.to_string(), cancel.clone());
        Ok(ActiveRun {
            runs: Arc::clone(&self.active),
            run_id: run_id.to_string(),
            cancel,
        })
    }

    async fn start(
        &self,
        bot: &BotConfig,
        options: ExecuteOptions,
        limit: Option<usize>,
    ) -> Result<ExecutionResult, EngineError> {
        let run_id = options
            .run_id
            .clone()
            .unwrap_or_else(|| self.ids.next("run"));
        let run = self.admit(&run_id, limit)?;
        let span = tracing::info_span!("bot.run", run_id = %run_id, bot_id = %bot.id);
        Ok(self.drive(bot, options, &run).instrument(span).await)
    }

    async fn drive(
        &self,
        bot: &BotConfig,
        options: ExecuteOptions,
        run: &ActiveRun,
    ) -> ExecutionResult {
        let started_at = self.clock.now();
        let start = Instant::now();
        let mut ctx = self.build_context(bot, &options, &run.run_id, started_at);
        let plan = bot.execution_plan();
        ctx.set_total_actions(plan.len());

        self.events.publish(ExecutionEvent::ExecutionStarted {
            run_id: run.run_id.clone(),
            bot_id: bot.id.clone(),
            bot_name: bot.name.clone(),
            trigger_type: options.trigger_type,
            timestamp: started_at,
        });
        tracing::info!(
            bot_name = %bot.name,
            trigger = %options.trigger_type,
            actions = plan.len(),
            "run started"
        );

        let deadline = options
            .execution_timeout
            .or_else(|| {
                bot.settings
                    .as_ref()
                    .and_then(|s| s.timeout_ms)
                    .map(Duration::from_millis)
            })
            .unwrap_or(self.settings.execution_timeout);
        let timed_out = Arc::new(AtomicBool::new(false));
        let watchdog = Watchdog::arm(deadline, run.cancel.clone(), Arc::clone(&timed_out));

        let mut results = Vec::with_capacity(plan.len());
        let outcome = self
            .run_actions(bot, &plan, &options, &mut ctx, &run.cancel, &mut results)
            .await;
        drop(watchdog);

        let failure = match outcome {
            Ok(()) => None,
            Err(_) if timed_out.load(Ordering::SeqCst) => {
                Some((ExecutionStatus::Timeout, EngineError::Timeout(deadline)))
            }
            Err(_) if run.cancel.is_cancelled() => {
                Some((ExecutionStatus::Cancelled, EngineError::Cancelled))
            }
            Err(e) => Some((ExecutionStatus::Failed, e)),
        };

        let duration_ms = elapsed_ms(start);
        let completed_at = self.clock.now();
        let (status, error) = match failure {
            None => {
                self.events.publish(ExecutionEvent::ExecutionCompleted {
                    run_id: run.run_id.clone(),
                    bot_id: bot.id.clone(),
                    duration_ms,
                    timestamp: completed_at,
                });
                tracing::info!(duration_ms, actions = results.len(), "run completed");
                (ExecutionStatus::Completed, None)
            }
            Some((status, e)) => {
                let info = e.to_info();
                self.events.publish(ExecutionEvent::ExecutionFailed {
                    run_id: run.run_id.clone(),
                    bot_id: bot.id.clone(),
                    status,
                    error: info.clone(),
                    duration_ms,
                    timestamp: completed_at,
                });
                tracing::error!(duration_ms, %status, error = %info, "run failed");
                (status, Some(info))
            }
        };

        ExecutionResult {
            run_id: run.run_id.clone(),
            bot_id: bot.id.clone(),
            bot_name: bot.name.clone(),
            status,
            trigger_type: options.trigger_type,
            trigger_data: options.trigger_data,
            started_at,
            completed_at: Some(completed_at),
            duration_ms: Some(duration_ms),
            output: Some(build_final_output(&results)),
            action_results: results,
            error,
            context_snapshot: self.settings.include_snapshot.then(|| ctx.snapshot()),
        }
    }

    fn build_context(
        &self,
        bot: &BotConfig,
        options: &ExecuteOptions,
        run_id: &str,
        started_at: DateTime<Utc>,
    ) -> ExecutionContext {
        let mut variables = bot
            .settings
            .as_ref()
            .map(|s| s.variables.clone())
            .unwrap_or_default();
        variables.extend(options.variables.clone());

        let mut context_options = ContextOptions::new(self.ids.next("ctx"), run_id, &bot.id)
            .trigger_data(options.trigger_data.clone())
            .started_at(started_at)
            .variables(variables)
            .allow_env(self.settings.allow_env)
            .clock(self.clock.clone());
        if let Some(source) = &self.secrets {
            context_options = context_options.secret_source(Arc::clone(source));
        }
        ExecutionContext::new(context_options)
    }

    /// Walk the plan; `Err` means the run stopped early
    async fn run_actions(
        &self,
        bot: &BotConfig,
        plan: &[&ActionConfig],
        options: &ExecuteOptions,
        ctx: &mut ExecutionContext,
        cancel: &CancellationToken,
        results: &mut Vec<ActionResult>,
    ) -> Result<(), EngineError> {
        let stop_on_error = bot.stop_on_error();

        for (index, action) in plan.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(EngineError::Cancelled);
            }
            ctx.set_current_action_index(index);

            if let Some(condition) = &action.condition {
                if !ctx.evaluate_condition(condition) {
                    tracing::debug!(action_id = %action.id, condition, "condition not met");
                    let reason = format!("Condition not met: {}", condition);
                    results.push(self.skipped(ctx, action, reason));
                    continue;
                }
            }

            let span = tracing::info_span!(
                "action",
                action_id = %action.id,
                action_type = %action.action_type
            );
            let ActionRun {
                result,
                skip_remaining,
            } = self
                .execute_action_with_retry(bot, action, options, ctx, cancel)
                .instrument(span)
                .await;

            if result.status == ActionStatus::Completed {
                if let Some(output) = &result.output {
                    ctx.set_action_output(&action.id, output.clone());
                }
            }
            let failure = result.error.clone().filter(|_| result.is_failed());
            results.push(result);

            if let Some(error) = failure {
                if cancel.is_cancelled() {
                    return Err(EngineError::Cancelled);
                }
                if stop_on_error && !action.continue_on_error {
                    return Err(EngineError::ActionFailed {
                        action_id: action.id.clone(),
                        error,
                    });
                }
                tracing::warn!(action_id = %action.id, "continuing after failed action");
            }

            if let Some(reason) = skip_remaining {
                tracing::info!(
                    reason = %reason,
                    remaining = plan.len() - index - 1,
                    "skipping remaining actions"
                );
                for rest in &plan[index + 1..] {
                    results.push(self.skipped(ctx, rest, reason.clone()));
                }
                break;
            }
        }
        Ok(())
    }

    async fn execute_action_with_retry(
        &self,
        bot: &BotConfig,
        action: &ActionConfig,
        options: &ExecuteOptions,
        ctx: &ExecutionContext,
        cancel: &CancellationToken,
    ) -> ActionRun {
        let started_at = self.clock.now();
        let start = Instant::now();

        let Some(plugin) = self.registry.get(&action.action_type) else {
            let error = EngineError::UnknownActionType(action.action_type.clone());
            let info = ErrorInfo::new(error.code(), error.to_string(), false);
            self.publish_failure(ctx, action, 1, &info, false);
            tracing::error!(error = %info, "no handler for action");
            return ActionRun {
                result: self.failed(action, started_at, start, info, 0),
                skip_remaining: None,
            };
        };

        let retry = merged_retry_config(
            &self.settings.retry,
            bot,
            options.retry.as_ref(),
            action.retry.as_ref(),
        );
        let timeout = action
            .timeout_ms
            .map(Duration::from_millis)
            .or(options.action_timeout)
            .or(self.settings.default_action_timeout)
            .unwrap_or_else(|| plugin.default_timeout());

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            self.events.publish(ExecutionEvent::ActionStarted {
                run_id: ctx.run_id().to_string(),
                bot_id: ctx.bot_id().to_string(),
                action_id: action.id.clone(),
                action_type: action.action_type.clone(),
                action_name: action.name.clone(),
                attempt,
                timestamp: self.clock.now(),
            });

            let config = ctx.interpolate_map(&action.config);
            let validation = plugin.validate(&config);
            let (error, retryable) = if !validation.valid {
                let error = ActionError::config(format!(
                    "Invalid configuration: {}",
                    validation.errors.join("; ")
                ));
                (error, false)
            } else {
                match self
                    .attempt(plugin.as_ref(), action, &config, ctx, cancel, timeout)
                    .await
                {
                    Ok(output) => {
                        return self.completed(ctx, action, started_at, start, output, attempt - 1);
                    }
                    Err(e) => {
                        let retryable = !cancel.is_cancelled()
                            && (matches!(e, ActionError::Timeout { .. })
                                || plugin.is_retryable(&e));
                        (e, retryable)
                    }
                }
            };

            let will_retry = retryable && attempt <= retry.max_retries;
            let info = error.to_info(retryable);
            self.publish_failure(ctx, action, attempt, &info, will_retry);

            if !will_retry {
                tracing::error!(attempt, error = %info, "action failed");
                return ActionRun {
                    result: self.failed(action, started_at, start, info, attempt - 1),
                    skip_remaining: None,
                };
            }

            let delay = calculate_retry_delay(attempt, &retry, &mut rand::thread_rng());
            tracing::warn!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %info,
                "attempt failed, retrying"
            );
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    let info = ActionError::Aborted.to_info(false);
                    return ActionRun {
                        result: self.failed(action, started_at, start, info, attempt - 1),
                        skip_remaining: None,
                    };
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// One bounded attempt, racing the plugin against its timeout and the run token
    async fn attempt(
        &self,
        plugin: &dyn Action,
        action: &ActionConfig,
        config: &Map<String, Value>,
        ctx: &ExecutionContext,
        cancel: &CancellationToken,
        timeout: Duration,
    ) -> Result<ActionOutput, ActionError> {
        let input = ActionInput {
            action,
            config,
            context: ctx,
            cancel: cancel.clone(),
        };
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ActionError::Aborted),
            result = tokio::time::timeout(timeout, plugin.execute(input)) => {
                result.unwrap_or_else(|_| Err(ActionError::Timeout {
                    ms: timeout.as_millis() as u64,
                }))
            }
        }
    }

    fn completed(
        &self,
        ctx: &ExecutionContext,
        action: &ActionConfig,
        started_at: DateTime<Utc>,
        start: Instant,
        output: ActionOutput,
        retry_count: u32,
    ) -> ActionRun {
        let duration_ms = elapsed_ms(start);
        self.events.publish(ExecutionEvent::ActionCompleted {
            run_id: ctx.run_id().to_string(),
            bot_id: ctx.bot_id().to_string(),
            action_id: action.id.clone(),
            action_type: action.action_type.clone(),
            duration_ms,
            retry_count,
            timestamp: self.clock.now(),
        });
        tracing::info!(duration_ms, retry_count, "action completed");

        let mut result = self.base_result(action, ActionStatus::Completed, started_at, duration_ms);
        result.output = output.data;
        result.metadata = output.metadata;
        result.retry_count = retry_count;
        ActionRun {
            result,
            skip_remaining: output.skip_remaining,
        }
    }

    fn failed(
        &self,
        action: &ActionConfig,
        started_at: DateTime<Utc>,
        start: Instant,
        error: ErrorInfo,
        retry_count: u32,
    ) -> ActionResult {
        let mut result =
            self.base_result(action, ActionStatus::Failed, started_at, elapsed_ms(start));
        result.error = Some(error);
        result.retry_count = retry_count;
        result
    }

    fn skipped(
        &self,
        ctx: &ExecutionContext,
        action: &ActionConfig,
        reason: String,
    ) -> ActionResult {
        let now = self.clock.now();
        self.events.publish(ExecutionEvent::ActionSkipped {
            run_id: ctx.run_id().to_string(),
            bot_id: ctx.bot_id().to_string(),
            action_id: action.id.clone(),
            reason: reason.clone(),
            timestamp: now,
        });
        let mut result = self.base_result(action, ActionStatus::Completed, now, 0);
        result.skipped = true;
        result.skip_reason = Some(reason);
        result
    }

    fn base_result(
        &self,
        action: &ActionConfig,
        status: ActionStatus,
        started_at: DateTime<Utc>,
        duration_ms: u64,
    ) -> ActionResult {
        ActionResult {
            action_id: action.id.clone(),
            action_type: action.action_type.clone(),
            action_name: action.name.clone(),
            status,
            started_at,
            completed_at: self.clock.now(),
            duration_ms,
            output: None,
            metadata: None,
            error: None,
            retry_count: 0,
            skipped: false,
            skip_reason: None,
        }
    }

    fn publish_failure(
        &self,
        ctx: &ExecutionContext,
        action: &ActionConfig,
        attempt: u32,
        error: &ErrorInfo,
        will_retry: bool,
    ) {
        self.events.publish(ExecutionEvent::ActionFailed {
            run_id: ctx.run_id().to_string(),
            bot_id: ctx.bot_id().to_string(),
            action_id: action.id.clone(),
            action_type: action.action_type.clone(),
            attempt,
            error: error.clone(),
            will_retry,
            timestamp: self.clock.now(),
        });
    }

    /// Result for a run that never started
    fn rejected(
        &self,
        bot: &BotConfig,
        trigger_type: TriggerType,
        trigger_data: Value,
        error: EngineError,
    ) -> ExecutionResult {
        tracing::warn!(bot_id = %bot.id, error = %error, "run rejected");
        let now = self.clock.now();
        ExecutionResult {
            run_id: String::new(),
            bot_id: bot.id.clone(),
            bot_name: bot.name.clone(),
            status: ExecutionStatus::Failed,
            trigger_type,
            trigger_data,
            started_at: now,
            completed_at: Some(now),
            duration_ms: Some(0),
            action_results: Vec::new(),
            output: None,
            error: Some(error.to_info()),
            context_snapshot: None,
        }
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
