//! Ollama-backed draft inference.
//!
//! Two interchangeable backends behind one trait: the HTTP API with a JSON
//! schema attached to constrain decoding, and the CLI as a rawer fallback
//! that pipes the prompt through `ollama run`. Both are fallible black
//! boxes; the draft layer decides what happens on failure.

use std::env;
use std::error::Error;
use std::fmt;
use std::process::Stdio;
use std::time::Duration;

use futures::future::BoxFuture;
use serde_json::json;
use tokio::io::AsyncWriteExt;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama3.1";

#[derive(Debug)]
pub enum OllamaError {
    HttpError(reqwest::Error),
    ProcessError(String),
    Timeout(u64),
    ResponseError(String),
}

impl fmt::Display for OllamaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OllamaError::HttpError(err) => write!(f, "HTTP error: {}", err),
            OllamaError::ProcessError(msg) => write!(f, "Process error: {}", msg),
            OllamaError::Timeout(secs) => write!(f, "Inference timed out after {}s", secs),
            OllamaError::ResponseError(msg) => write!(f, "Response error: {}", msg),
        }
    }
}

impl Error for OllamaError {}

impl From<reqwest::Error> for OllamaError {
    fn from(err: reqwest::Error) -> Self {
        OllamaError::HttpError(err)
    }
}

/// One way of turning a prompt into draft text. Implementations that cannot
/// enforce a schema are free to ignore it.
pub trait InferenceBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn draft<'a>(
        &'a self,
        prompt: &'a str,
        schema: Option<&'a serde_json::Value>,
        timeout: Duration,
    ) -> BoxFuture<'a, Result<String, OllamaError>>;
}

pub fn model_from_env() -> String {
    env::var("OLLAMA_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string())
}

pub fn base_url_from_env() -> String {
    env::var("OLLAMA_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
}

/// Ranked backend chain: structured HTTP call first, CLI second.
pub fn default_backends() -> Vec<Box<dyn InferenceBackend>> {
    vec![
        Box::new(OllamaHttpBackend::new()),
        Box::new(OllamaCliBackend::new()),
    ]
}

/// Structured call against the Ollama HTTP API. The schema rides along as
/// `format`, which makes the server constrain decoding to it.
pub struct OllamaHttpBackend {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaHttpBackend {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url_from_env(),
            model: model_from_env(),
        }
    }
}

impl Default for OllamaHttpBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InferenceBackend for OllamaHttpBackend {
    fn name(&self) -> &'static str {
        "ollama-http"
    }

    fn draft<'a>(
        &'a self,
        prompt: &'a str,
        schema: Option<&'a serde_json::Value>,
        timeout: Duration,
    ) -> BoxFuture<'a, Result<String, OllamaError>> {
        Box::pin(async move {
            let mut body = json!({
                "model": self.model,
                "prompt": prompt,
                "stream": false,
                "options": { "temperature": 0.2 },
            });
            if let Some(schema) = schema {
                body["format"] = schema.clone();
            }

            let url = format!("{}/api/generate", self.base_url);
            let response = self
                .client
                .post(&url)
                .json(&body)
                .timeout(timeout)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(OllamaError::ResponseError(format!(
                    "Generate request failed with status {}: {}",
                    status, error_text
                )));
            }

            let reply: serde_json::Value = response
                .json()
                .await
                .map_err(|e| OllamaError::ResponseError(format!("Failed to parse response: {}", e)))?;

            match reply.get("response").and_then(|v| v.as_str()) {
                Some(text) => Ok(text.to_string()),
                None => Err(OllamaError::ResponseError(
                    "Response body has no `response` field".to_string(),
                )),
            }
        })
    }
}

/// Fallback that shells out to the Ollama CLI and reads stdout. No schema
/// enforcement, so the output is whatever the model decides to print.
pub struct OllamaCliBackend {
    model: String,
}

impl OllamaCliBackend {
    pub fn new() -> Self {
        Self {
            model: model_from_env(),
        }
    }
}

impl Default for OllamaCliBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InferenceBackend for OllamaCliBackend {
    fn name(&self) -> &'static str {
        "ollama-cli"
    }

    fn draft<'a>(
        &'a self,
        prompt: &'a str,
        _schema: Option<&'a serde_json::Value>,
        timeout: Duration,
    ) -> BoxFuture<'a, Result<String, OllamaError>> {
        Box::pin(async move {
            let mut child = tokio::process::Command::new("ollama")
                .arg("run")
                .arg(&self.model)
                .stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .spawn()
                .map_err(|e| OllamaError::ProcessError(format!("Failed to spawn ollama: {}", e)))?;

            if let Some(mut stdin) = child.stdin.take() {
                stdin
                    .write_all(prompt.as_bytes())
                    .await
                    .map_err(|e| OllamaError::ProcessError(format!("Failed to write prompt: {}", e)))?;
                // stdin drops here; EOF tells the CLI the prompt is complete
            }

            let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
                Ok(result) => result
                    .map_err(|e| OllamaError::ProcessError(format!("ollama run failed: {}", e)))?,
                Err(_) => return Err(OllamaError::Timeout(timeout.as_secs())),
            };

            if !output.status.success() {
                return Err(OllamaError::ProcessError(format!(
                    "ollama exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                )));
            }

            String::from_utf8(output.stdout)
                .map(|text| text.trim().to_string())
                .map_err(|e| OllamaError::ProcessError(format!("Invalid UTF-8 in output: {}", e)))
        })
    }
}
