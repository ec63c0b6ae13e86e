// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The seam between the scheduler and whatever actually runs a bot

use crate::error::EngineError;
use crate::executor::{BotExecutor, ExecuteOptions};
use async_trait::async_trait;
use botwork_core::{BotConfig, Clock, ExecutionResult, IdGen, TriggerType};
use serde_json::Value;

/// Runs one bot to completion
///
/// `Err` means the run could not be started at all; a run that started and
/// failed is still `Ok` with a failed result.
#[async_trait]
pub trait BotRunner: Send + Sync + 'static {
    async fn run_bot(
        &self,
        bot: &BotConfig,
        trigger_type: TriggerType,
        trigger_data: Value,
    ) -> Result<ExecutionResult, EngineError>;
}

#[async_trait]
impl<C: Clock, I: IdGen> BotRunner for BotExecutor<C, I> {
    async fn run_bot(
        &self,
        bot: &BotConfig,
        trigger_type: TriggerType,
        trigger_data: Value,
    ) -> Result<ExecutionResult, EngineError> {
        let options = ExecuteOptions::new(trigger_type).trigger_data(trigger_data);
        self.try_execute(bot, options).await
    }
}
