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

//! # BigQuery REST Adapter
//!
//! Implements `WarehousePort` against the BigQuery REST API v2 using `curl`,
//! with an access token from `gcloud auth print-access-token`.
//!
//! When a key file is configured it is handed to gcloud through
//! `CLOUDSDK_AUTH_CREDENTIAL_FILE_OVERRIDE`; otherwise gcloud's ambient
//! credentials apply. Tokens are reused for 45 minutes.
//!
//! Result rows arrive in BigQuery's `f`/`v` cell format and are decoded with
//! the response schema into typed JSON (numbers, booleans, nested objects and
//! arrays); all other scalar types stay strings.

use crate::domain::entities::{
    FailedRow, InsertOptions, InsertResponse, PreparedRow, QueryJob, QueryOptions, Row,
    SchemaField, TableRef,
};
use crate::domain::errors::{BridgeError, Result};
use crate::ports::warehouse_port::WarehousePort;
use log::{debug, info};
use serde::Deserialize;
use serde_json::{json, Map, Number, Value};
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub const API_BASE: &str = "https://bigquery.googleapis.com/bigquery/v2";

const TOKEN_LIFETIME: Duration = Duration::from_secs(45 * 60);
const CREDENTIAL_OVERRIDE_ENV: &str = "CLOUDSDK_AUTH_CREDENTIAL_FILE_OVERRIDE";

/// Checks that a command-line tool is installed and runs.
pub fn check_tool_availability(tool: &str) -> bool {
    Command::new(tool)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// `WarehousePort` over the BigQuery REST API.
pub struct BigQueryRestAdapter {
    project_id: String,
    auth_file: Option<String>,
    location: Option<String>,
    api_base: String,
    token: Mutex<Option<(String, Instant)>>,
}

impl BigQueryRestAdapter {
    pub fn new(project_id: String, auth_file: Option<String>, location: Option<String>) -> Self {
        Self {
            project_id,
            auth_file,
            location,
            api_base: API_BASE.to_string(),
            token: Mutex::new(None),
        }
    }

    /// Gets (or reuses) a GCP access token from gcloud.
    fn access_token(&self) -> Result<String> {
        let mut cached = self
            .token
            .lock()
            .map_err(|_| BridgeError::WarehouseError("Token cache poisoned".to_string()))?;

        if let Some((token, fetched)) = cached.as_ref() {
            if fetched.elapsed() < TOKEN_LIFETIME {
                return Ok(token.clone());
            }
        }

        let mut cmd = Command::new("gcloud");
        cmd.args(["auth", "print-access-token"]);
        if let Some(path) = &self.auth_file {
            cmd.env(CREDENTIAL_OVERRIDE_ENV, path);
        }

        let output = cmd.output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BridgeError::WarehouseError(format!(
                "Failed to get access token: {}",
                stderr.trim()
            )));
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        *cached = Some((token.clone(), Instant::now()));
        Ok(token)
    }

    /// Performs one API call and returns the parsed JSON body.
    ///
    /// `params` are URL-encoded into the query string by curl.
    fn call(&self, method: &str, path: &str, params: &[(&str, String)], body: Option<&Value>) -> Result<Value> {
        let token = self.access_token()?;
        let url = format!("{}/{}", self.api_base, path);
        debug!("{} {}", method, url);

        // The token and body travel through a curl config on stdin, which
        // keeps the bearer token out of the process list.
        let mut cmd = Command::new("curl");
        cmd.args(["-sS", "-K", "-"]);

        if params.is_empty() {
            cmd.args(["-X", method]);
        } else {
            // -G moves every --data-urlencode pair into the query string.
            cmd.arg("-G");
            for (key, value) in params {
                cmd.arg("--data-urlencode").arg(format!("{}={}", key, value));
            }
        }

        cmd.arg(&url)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(curl_config(&token, body).as_bytes())?;
        }
        let output = child.wait_with_output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BridgeError::WarehouseError(format!(
                "curl failed for {}: {}",
                url,
                stderr.trim()
            )));
        }

        let response: Value = serde_json::from_slice(&output.stdout)?;
        if let Some(error) = response.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(BridgeError::WarehouseError(message));
        }

        Ok(response)
    }

    fn job_params(&self, job: &QueryJob) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(location) = job.location.as_ref().or(self.location.as_ref()) {
            params.push(("location", location.clone()));
        }
        params
    }
}

impl WarehousePort for BigQueryRestAdapter {
    fn project_id(&self) -> &str {
        &self.project_id
    }

    fn submit_query(&self, query: &str, options: &QueryOptions) -> Result<QueryJob> {
        let mut body = json!({
            "query": query,
            "useLegacySql": options.use_legacy_sql,
            "useQueryCache": options.use_query_cache,
            "maxResults": 0,
            "requestId": format!("warehouse-bridge-{}", chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()),
        });
        if let Some(location) = options.location.as_ref().or(self.location.as_ref()) {
            body["location"] = json!(location);
        }

        let path = format!("projects/{}/queries", self.project_id);
        let response = self.call("POST", &path, &[], Some(&body))?;
        let job = parse_job(&response)?;
        info!("Query job {} created (complete={})", job.job_id, job.complete);
        Ok(job)
    }

    fn reload_job(&self, job: &QueryJob) -> Result<QueryJob> {
        let path = format!("projects/{}/queries/{}", self.project_id, job.job_id);
        let mut params = self.job_params(job);
        params.push(("maxResults", "0".to_string()));

        let response = self.call("GET", &path, &params, None)?;
        Ok(QueryJob {
            complete: response["jobComplete"].as_bool().unwrap_or(false),
            ..job.clone()
        })
    }

    fn job_rows(&self, job: &QueryJob) -> Result<Vec<Row>> {
        let path = format!("projects/{}/queries/{}", self.project_id, job.job_id);
        let mut rows = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params = self.job_params(job);
            if let Some(token) = &page_token {
                params.push(("pageToken", token.clone()));
            }

            let response = self.call("GET", &path, &params, None)?;
            let schema: Vec<ApiField> = match response.pointer("/schema/fields") {
                Some(fields) => serde_json::from_value(fields.clone())?,
                None => Vec::new(),
            };
            if let Some(page) = response["rows"].as_array() {
                rows.extend(decode_rows(&schema, page));
            }

            page_token = response["pageToken"].as_str().map(str::to_string);
            if page_token.is_none() {
                break;
            }
        }

        Ok(rows)
    }

    fn list_tables(&self, dataset: &str) -> Result<Vec<TableRef>> {
        let path = format!("projects/{}/datasets/{}/tables", self.project_id, dataset);
        let mut tables = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params = vec![("maxResults", "1000".to_string())];
            if let Some(token) = &page_token {
                params.push(("pageToken", token.clone()));
            }

            let response = self.call("GET", &path, &params, None)?;
            tables.extend(table_refs(&response));

            page_token = response["nextPageToken"].as_str().map(str::to_string);
            if page_token.is_none() {
                break;
            }
        }

        Ok(tables)
    }

    fn create_table(&self, dataset: &str, table: &str, schema: &[SchemaField]) -> Result<TableRef> {
        let body = json!({
            "tableReference": {
                "projectId": self.project_id,
                "datasetId": dataset,
                "tableId": table,
            },
            "schema": { "fields": schema },
        });

        let path = format!("projects/{}/datasets/{}/tables", self.project_id, dataset);
        let response = self.call("POST", &path, &[], Some(&body))?;
        table_ref(&response["tableReference"]).ok_or_else(|| {
            BridgeError::WarehouseError("API response missing 'tableReference'".to_string())
        })
    }

    fn insert_rows(
        &self,
        table: &TableRef,
        rows: &[PreparedRow],
        options: &InsertOptions,
    ) -> Result<InsertResponse> {
        let path = format!(
            "projects/{}/datasets/{}/tables/{}/insertAll",
            table.project_id, table.dataset_id, table.table_id
        );
        let body = insert_all_body(rows, options);
        let response = self.call("POST", &path, &[], Some(&body))?;
        Ok(parse_insert_response(response))
    }
}

/// Quotes a value for a curl config file.
fn config_quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        match ch {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            _ => quoted.push(ch),
        }
    }
    quoted.push('"');
    quoted
}

/// curl config with the request headers and, for writes, the JSON body.
fn curl_config(token: &str, body: Option<&Value>) -> String {
    let mut config = format!(
        "header = {}\nheader = {}\n",
        config_quote(&format!("Authorization: Bearer {}", token)),
        config_quote("Content-Type: application/json")
    );
    if let Some(payload) = body {
        config.push_str(&format!("data-binary = {}\n", config_quote(&payload.to_string())));
    }
    config
}

/// Schema field as returned with query results.
#[derive(Debug, Deserialize)]
struct ApiField {
    name: String,
    #[serde(rename = "type")]
    field_type: String,
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    fields: Vec<ApiField>,
}

fn parse_job(response: &Value) -> Result<QueryJob> {
    let reference = &response["jobReference"];
    let job_id = reference["jobId"]
        .as_str()
        .ok_or_else(|| BridgeError::WarehouseError("API response missing 'jobReference.jobId'".to_string()))?;

    Ok(QueryJob {
        job_id: job_id.to_string(),
        location: reference["location"].as_str().map(str::to_string),
        complete: response["jobComplete"].as_bool().unwrap_or(false),
    })
}

fn decode_rows(schema: &[ApiField], rows: &[Value]) -> Vec<Row> {
    rows.iter().map(|row| decode_record(schema, row)).collect()
}

fn decode_record(schema: &[ApiField], record: &Value) -> Row {
    let cells = record["f"].as_array().map(Vec::as_slice).unwrap_or(&[]);
    schema
        .iter()
        .zip(cells)
        .map(|(field, cell)| (field.name.clone(), decode_cell(field, &cell["v"])))
        .collect()
}

fn decode_cell(field: &ApiField, value: &Value) -> Value {
    if value.is_null() {
        return Value::Null;
    }

    if field.mode.as_deref() == Some("REPEATED") {
        let items = value.as_array().map(Vec::as_slice).unwrap_or(&[]);
        return Value::Array(items.iter().map(|item| decode_scalar(field, &item["v"])).collect());
    }

    decode_scalar(field, value)
}

fn decode_scalar(field: &ApiField, value: &Value) -> Value {
    if value.is_null() {
        return Value::Null;
    }

    match field.field_type.as_str() {
        "RECORD" | "STRUCT" => Value::Object(decode_record(&field.fields, value)),
        "INTEGER" | "INT64" => value
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .map(Value::from)
            .unwrap_or_else(|| value.clone()),
        "FLOAT" | "FLOAT64" => value
            .as_str()
            .and_then(|s| s.parse::<f64>().ok())
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| value.clone()),
        "BOOLEAN" | "BOOL" => match value.as_str() {
            Some("true") => Value::Bool(true),
            Some("false") => Value::Bool(false),
            _ => value.clone(),
        },
        _ => value.clone(),
    }
}

fn table_ref(reference: &Value) -> Option<TableRef> {
    Some(TableRef::new(
        reference["projectId"].as_str()?,
        reference["datasetId"].as_str()?,
        reference["tableId"].as_str()?,
    ))
}

fn table_refs(response: &Value) -> Vec<TableRef> {
    response["tables"]
        .as_array()
        .map(|tables| {
            tables
                .iter()
                .filter_map(|t| table_ref(&t["tableReference"]))
                .collect()
        })
        .unwrap_or_default()
}

fn insert_all_body(rows: &[PreparedRow], options: &InsertOptions) -> Value {
    let rows: Vec<Value> = rows
        .iter()
        .map(|row| {
            let mut entry = Map::new();
            if let Some(id) = &row.insert_id {
                let id = match id {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                entry.insert("insertId".to_string(), Value::String(id));
            }
            entry.insert("json".to_string(), Value::Object(row.data.clone()));
            Value::Object(entry)
        })
        .collect();

    json!({
        "kind": "bigquery#tableDataInsertAllRequest",
        "skipInvalidRows": options.skip_invalid_rows,
        "ignoreUnknownValues": options.ignore_unknown_values,
        "rows": rows,
    })
}

fn parse_insert_response(response: Value) -> InsertResponse {
    let failed_rows = response["insertErrors"]
        .as_array()
        .map(|errors| {
            errors
                .iter()
                .map(|e| FailedRow {
                    index: e["index"].as_u64().unwrap_or_default() as usize,
                    errors: e["errors"].as_array().cloned().unwrap_or_default(),
                })
                .collect()
        })
        .unwrap_or_default();

    InsertResponse {
        failed_rows,
        info: response,
    }
}
