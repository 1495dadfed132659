// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use clap::Parser;
use log::{error, info};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::process;
use warehouse_bridge::application::bridge::Bridge;
use warehouse_bridge::application::runtime::RuntimeContext;
use warehouse_bridge::config::{AppConfig, CliArgs, Command};
use warehouse_bridge::domain::entities::{InsertOutcome, Row};
use warehouse_bridge::domain::errors::{BridgeError, Result};
use warehouse_bridge::domain::model::{Model, ModelDefinition, RowItem};

fn main() {
    // 1. Initialize Logging
    env_logger::init();

    // 2. Parse Arguments
    let args = CliArgs::parse();

    // 3. Load Config
    let mut config = match &args.config {
        Some(path) => match AppConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                error!("Failed to load config: {}", e);
                process::exit(1);
            }
        },
        None => AppConfig::from_cli(&args),
    };

    config.merge_cli(&args);
    config.apply_env();

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        process::exit(1);
    }

    // 4. Wire adapters
    let runtime = match RuntimeContext::init(&config, true) {
        Ok(r) => r,
        Err(e) => {
            error!("Initialization failed: {}", e);
            process::exit(1);
        }
    };

    // 5. Dispatch
    if let Err(e) = execute(&runtime.bridge, &config, &args.command) {
        error!("{}", e);
        process::exit(1);
    }
}

fn execute(bridge: &Bridge, config: &AppConfig, command: &Command) -> Result<()> {
    match command {
        Command::Query { sql } => {
            let rows = bridge.run(sql, None)?;
            for row in &rows {
                println!("{}", serde_json::to_string(row)?);
            }
            info!("{} rows", rows.len());
        }
        Command::Schema { model } => {
            let definition = config.model(model)?;
            let fields = bridge.flip_model(definition, definition.struct_hints())?;
            println!("{}", serde_json::to_string_pretty(&fields)?);
        }
        Command::EnsureTable { model, table, no_delay } => {
            let definition = config.model(model)?;
            let name = table.as_deref().unwrap_or_else(|| definition.table());
            let table = bridge.create_from_model(
                None,
                name,
                definition,
                definition.struct_hints(),
                !no_delay,
            )?;
            println!("{}", table);
        }
        Command::Insert { table, file, model, verbose } => {
            let target = bridge.get_table(table, None)?.ok_or_else(|| {
                BridgeError::WarehouseError(format!(
                    "Table {}.{} does not exist",
                    bridge.default_dataset(),
                    table
                ))
            })?;

            let rows = read_rows(file)?;
            let prepared = match model {
                Some(name) => {
                    let definition = config.model(name)?;
                    let models: Vec<ModelDefinition> = rows
                        .into_iter()
                        .map(|row| definition.with_attributes(row))
                        .collect();
                    bridge.prepare_data(models.iter().map(RowItem::from))
                }
                None => bridge.prepare_data(rows.into_iter().map(RowItem::from)),
            };

            let outcome = bridge.insert(&target, &prepared, None, *verbose)?;
            println!("{}", serde_json::to_string_pretty(&outcome_json(&outcome))?);
            if !outcome.is_success() {
                process::exit(2);
            }
        }
        Command::Max { table, field } => {
            let value = bridge.get_max_field(table, field, None)?;
            println!("{}", value.unwrap_or(Value::Null));
        }
    }
    Ok(())
}

/// Reads a JSON array of objects.
fn read_rows(path: &Path) -> Result<Vec<Row>> {
    let contents = fs::read_to_string(path)?;
    let values: Vec<Value> = serde_json::from_str(&contents)?;
    values
        .into_iter()
        .enumerate()
        .map(|(i, value)| match value {
            Value::Object(row) => Ok(row),
            _ => Err(BridgeError::ConfigError(format!(
                "{}: element {} is not an object",
                path.display(),
                i
            ))),
        })
        .collect()
}

fn outcome_json(outcome: &InsertOutcome) -> Value {
    match outcome {
        InsertOutcome::Success => json!(true),
        InsertOutcome::Failed(errors) => json!(errors),
        InsertOutcome::Report(report) => json!(report),
    }
}
