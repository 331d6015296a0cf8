//! Handler backed by an external program
//!
//! The program receives `{"event": ..., "context": ...}` as JSON on stdin
//! and prints either a function response (`{"statusCode": 200, "body": "..."}`)
//! or the raw GraphQL response body on stdout.

use crate::error::{PrerenderError, PrerenderResult};
use crate::graphql::envelope::{HandlerResponse, InvocationContext, InvocationEvent};
use crate::graphql::handler::GraphQLHandler;
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Max number of stderr lines to include in failure messages.
const STDERR_TAIL_LINES: usize = 20;

/// Runs one process per operation
pub struct CommandHandler {
    program: PathBuf,
    args: Vec<String>,
    cwd: PathBuf,
    name: String,
}

impl CommandHandler {
    pub fn new(program: PathBuf, args: Vec<String>, cwd: PathBuf) -> Self {
        let name = program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| program.display().to_string());
        Self {
            program,
            args,
            cwd,
            name,
        }
    }
}

#[async_trait]
impl GraphQLHandler for CommandHandler {
    async fn invoke(
        &self,
        event: &InvocationEvent,
        context: &InvocationContext,
    ) -> PrerenderResult<HandlerResponse> {
        let payload = serde_json::json!({
            "event": event,
            "context": context.to_json(),
        });
        let input = serde_json::to_vec(&payload)?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| PrerenderError::handler_failed(&self.name, e.to_string()))?;

        // stdin is fed concurrently with draining stdout and stderr
        let writer = child.stdin.take().map(|mut stdin| {
            tokio::spawn(async move {
                let result = stdin.write_all(&input).await;
                drop(stdin);
                result
            })
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| PrerenderError::io(format!("waiting for {}", self.name), e))?;

        if let Some(writer) = writer {
            match writer.await {
                Ok(Ok(())) => {}
                // The exit status below explains why the program stopped reading
                Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                    debug!("{} closed stdin early", self.name);
                }
                Ok(Err(e)) => {
                    return Err(PrerenderError::io(
                        format!("writing event to {}", self.name),
                        e,
                    ))
                }
                Err(e) => return Err(PrerenderError::handler_failed(&self.name, e.to_string())),
            }
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PrerenderError::handler_failed(
                &self.name,
                format!("exited with {}\n{}", output.status, stderr_tail(&stderr)),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("{} returned {} bytes", self.name, stdout.len());
        Ok(parse_output(stdout))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Interpret program output as a function response when it looks like one
fn parse_output(stdout: String) -> HandlerResponse {
    let is_envelope = serde_json::from_str::<Value>(&stdout)
        .ok()
        .and_then(|v| v.as_object().map(|o| o.contains_key("statusCode")))
        .unwrap_or(false);

    if is_envelope {
        if let Ok(response) = serde_json::from_str::<HandlerResponse>(&stdout) {
            return response;
        }
    }
    HandlerResponse::ok(stdout)
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}
