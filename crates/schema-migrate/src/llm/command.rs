//! Text generator backed by an external command.
//!
//! The prompt is written to the command's stdin and its stdout is returned.
//! This keeps the engine independent of any particular model API: any CLI
//! that reads a prompt and prints a completion can serve as the backend.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::config::GeneratorConfig;
use crate::core::TextGenerator;
use crate::error::{MigrateError, Result};

/// Runs a configured program once per prompt.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandGenerator {
    /// Create a generator for `program` with `args`.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: None,
        }
    }

    /// Build from configuration.
    pub fn from_config(config: &GeneratorConfig) -> Result<Self> {
        let (program, args) = config
            .command
            .split_first()
            .ok_or_else(|| MigrateError::Config("generator.command is empty".into()))?;
        let mut generator = Self::new(program.clone(), args.to_vec());
        if let Some(secs) = config.timeout_secs {
            generator = generator.with_timeout(Duration::from_secs(secs));
        }
        Ok(generator)
    }

    /// Fail calls that take longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    async fn run(&self, prompt: &str) -> Result<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(prompt.as_bytes()).await?;
            // Dropping stdin closes the pipe so the command sees EOF.
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(MigrateError::generation(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        if text.trim().is_empty() {
            return Err(MigrateError::generation(format!(
                "{} produced no output",
                self.program
            )));
        }
        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for CommandGenerator {
    async fn generate_text(&self, prompt: &str) -> Result<String> {
        debug!("Sending {} byte prompt to {}", prompt.len(), self.program);
        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.run(prompt))
                .await
                .map_err(|_| {
                    MigrateError::generation(format!(
                        "{} timed out after {}s",
                        self.program,
                        timeout.as_secs()
                    ))
                })?,
            None => self.run(prompt).await,
        }
    }

    fn name(&self) -> &str {
        &self.program
    }
}
