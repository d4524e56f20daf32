//! Plan execution against a command channel

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use docbridge_core_types::RequestId;
use serde::Serialize;
use serde_json::Value;

use super::mapping::{extract_id, map_operation, substitute_placeholders, MappedCommand};
use super::{Plan, PlanOperation};
use crate::envelope::{Request, Response, StatusReport};
use crate::errors::{BridgeError, Result};
use crate::transport::CommandChannel;
use crate::{log_op_end, log_op_error, log_op_start};

pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct RunnerOptions {
    /// Deadline for each individual command, preflight included
    pub op_timeout: Duration,
    pub expected_document_name: Option<String>,
    pub expected_document_key: Option<String>,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            op_timeout: DEFAULT_OP_TIMEOUT,
            expected_document_name: None,
            expected_document_key: None,
        }
    }
}

/// Outcome of one executed operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepOutcome {
    pub index: usize,
    pub name: String,
    pub command: &'static str,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanReport {
    pub status: StatusReport,
    pub steps: Vec<StepOutcome>,
    pub captures: BTreeMap<String, String>,
}

/// One mapped operation of a dry run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DryRunStep {
    pub index: usize,
    pub name: String,
    #[serde(flatten)]
    pub mapped: MappedCommand,
}

impl std::fmt::Display for DryRunStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{:02}] {}: {} {}",
            self.index, self.name, self.mapped.command, self.mapped.args
        )
    }
}

pub struct PlanRunner<C> {
    channel: C,
    options: RunnerOptions,
}

impl<C: CommandChannel> PlanRunner<C> {
    pub fn new(channel: C, options: RunnerOptions) -> Self {
        Self { channel, options }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn into_channel(self) -> C {
        self.channel
    }

    /// Query `status` and check it against the expected document identity
    ///
    /// # Errors
    ///
    /// Fails when the bridge reports an error, times out, or is connected to
    /// a different document than expected.
    pub async fn preflight(&mut self) -> Result<StatusReport> {
        let response = self.call("status", Value::Object(Default::default())).await?;
        if !response.ok {
            return Err(BridgeError::plan(format!(
                "Bridge status failed: {}",
                response.error.unwrap_or_default()
            )));
        }
        let status = response
            .result
            .as_ref()
            .and_then(|output| output.as_status())
            .cloned()
            .ok_or_else(|| BridgeError::plan("Bridge status failed: no status payload"))?;

        if let Some(expected) = &self.options.expected_document_name {
            if &status.file_name != expected {
                return Err(BridgeError::plan(format!(
                    "Connected file mismatch: expected '{}', got '{}'",
                    expected, status.file_name
                )));
            }
        }
        if let Some(expected) = &self.options.expected_document_key {
            if &status.file_key != expected {
                return Err(BridgeError::plan(format!(
                    "Connected file key mismatch: expected '{}', got '{}'",
                    expected, status.file_key
                )));
            }
        }
        Ok(status)
    }

    /// Run every operation of `plan` in order
    ///
    /// # Errors
    ///
    /// Stops at the first failing operation unless it is marked
    /// `ignore_error`, at a mapping or placeholder error, or at a capture
    /// whose result carries no id.
    pub async fn run(&mut self, plan: &Plan) -> Result<PlanReport> {
        let start = Instant::now();
        log_op_start!("apply_plan", operations = plan.operations.len());

        let result = self.run_inner(plan).await;
        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(report) => {
                log_op_end!("apply_plan", duration_ms = duration_ms, captures = report.captures.len());
            }
            Err(err) => {
                log_op_error!("apply_plan", err, duration_ms = duration_ms);
            }
        }
        result
    }

    async fn run_inner(&mut self, plan: &Plan) -> Result<PlanReport> {
        let status = self.preflight().await?;
        tracing::info!(file_name = %status.file_name, page_id = %status.page_id, "bridge connected");

        let mut captures = BTreeMap::new();
        let mut steps = Vec::with_capacity(plan.operations.len());

        for (index, op) in plan.operations.iter().enumerate().map(|(i, op)| (i + 1, op)) {
            let mapped = expand(op, &captures)?;
            tracing::info!(index, name = %op.name, command = mapped.command, "applying operation");

            let response = self.call(mapped.command, mapped.args).await?;
            if !response.ok {
                let error = response.error.unwrap_or_default();
                if !op.ignore_error {
                    return Err(BridgeError::plan(format!("Operation failed: {}", error)));
                }
                tracing::warn!(index, name = %op.name, error = %error, "ignored error");
                steps.push(StepOutcome {
                    index,
                    name: op.name.clone(),
                    command: mapped.command,
                    ok: false,
                    error: Some(error),
                    captured: None,
                });
                continue;
            }

            let mut captured = None;
            if let Some(capture) = op.capture_name() {
                let payload = response.result_value()?;
                let id = extract_id(&payload).ok_or_else(|| {
                    BridgeError::plan(format!(
                        "Capture '{}' missing ID from payload: {}",
                        capture, payload
                    ))
                })?;
                tracing::info!(capture, id = %id, "captured");
                captures.insert(capture.to_string(), id.clone());
                captured = Some(id);
            }

            steps.push(StepOutcome {
                index,
                name: op.name.clone(),
                command: mapped.command,
                ok: true,
                error: None,
                captured,
            });
        }

        Ok(PlanReport {
            status,
            steps,
            captures,
        })
    }

    async fn call(&mut self, command: &str, args: Value) -> Result<Response> {
        let request = Request::new(RequestId::new(), command, args);
        tokio::time::timeout(self.options.op_timeout, self.channel.send(request))
            .await
            .map_err(|_| BridgeError::Timeout {
                command: command.to_string(),
            })?
    }
}

/// Map every operation without sending anything
///
/// Captures are simulated as `dry_<name>` so that later placeholders expand.
///
/// # Errors
///
/// Fails on the first operation that cannot be expanded or mapped.
pub fn dry_run(plan: &Plan) -> Result<(Vec<DryRunStep>, BTreeMap<String, String>)> {
    let mut captures = BTreeMap::new();
    let mut steps = Vec::with_capacity(plan.operations.len());

    for (index, op) in plan.operations.iter().enumerate().map(|(i, op)| (i + 1, op)) {
        let mapped = expand(op, &captures)?;
        steps.push(DryRunStep {
            index,
            name: op.name.clone(),
            mapped,
        });
        if let Some(capture) = op.capture_name() {
            captures.insert(capture.to_string(), format!("dry_{}", capture));
        }
    }
    Ok((steps, captures))
}

fn expand(op: &PlanOperation, captures: &BTreeMap<String, String>) -> Result<MappedCommand> {
    let tokens = op
        .run
        .iter()
        .map(|token| substitute_placeholders(token, captures))
        .collect::<Result<Vec<_>>>()?;
    map_operation(&tokens)
}
