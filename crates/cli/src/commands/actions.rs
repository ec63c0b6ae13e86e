// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `botwork actions`: list the registered action types

use crate::output::{self, OutputFormat};
use crate::setup;
use anyhow::Result;
use botwork_actions::RegisteredAction;
use serde::Serialize;
use std::fmt;

#[derive(Serialize)]
#[serde(transparent)]
struct ActionRow(RegisteredAction);

impl fmt::Display for ActionRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = &self.0;
        write!(f, "{:<10} {:<16}", action.action_type.as_str(), action.name)?;
        if !action.enabled {
            write!(f, " (disabled)")?;
        }
        write!(f, " {}", action.description)
    }
}

pub fn handle(format: OutputFormat) -> Result<()> {
    let rows: Vec<ActionRow> = setup::registry()?.list().into_iter().map(ActionRow).collect();
    if format == OutputFormat::Text {
        println!("{:<10} {:<16} DESCRIPTION", "TYPE", "NAME");
    }
    output::print_list(&rows, format);
    Ok(())
}
