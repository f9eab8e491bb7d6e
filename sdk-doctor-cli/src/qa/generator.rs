//! Text generators: `generate(prompt) -> text`

use super::client::{AiClient, AiConfig, LlmBackend};
use super::prompts::Prompt;
use super::GeneratorError;
use crate::config::{UserConfig, GENERATOR_ENV};
use std::io::{Read, Write};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Anything that turns a prompt into an answer
pub trait Generator {
    fn generate(&self, prompt: &Prompt) -> Result<String, GeneratorError>;

    /// Short human-readable description for `doctor` and logs
    fn describe(&self) -> String {
        "generator".to_string()
    }
}

/// Runs an external program once per prompt: instructions and question on
/// stdin as one block, answer on stdout. Each attempt is bounded by a wall-clock timeout; failed or
/// timed-out attempts are retried `retries` times.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    retries: u32,
}

impl CommandGenerator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: Duration::from_secs(120),
            retries: 1,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    fn attempt(&self, prompt: &str) -> Result<String, GeneratorError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| GeneratorError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Pipes are serviced on threads while the child is polled
        let stdin = child.stdin.take().map(|mut stdin| {
            let prompt = prompt.to_string();
            thread::spawn(move || {
                let _ = stdin.write_all(prompt.as_bytes());
            })
        });
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let status = match wait_with_timeout(&mut child, self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(GeneratorError::Timeout(self.timeout.as_secs()));
            }
            Err(source) => {
                return Err(GeneratorError::Spawn {
                    program: self.program.clone(),
                    source,
                })
            }
        };

        if let Some(handle) = stdin {
            let _ = handle.join();
        }
        let out = stdout.and_then(|h| h.join().ok()).unwrap_or_default();
        let err = stderr.and_then(|h| h.join().ok()).unwrap_or_default();

        if !status.success() {
            return Err(GeneratorError::Failed {
                status: status.to_string(),
                stderr: err.trim().to_string(),
            });
        }
        let answer = out.trim().to_string();
        if answer.is_empty() {
            return Err(GeneratorError::Failed {
                status: status.to_string(),
                stderr: "empty response".to_string(),
            });
        }
        Ok(answer)
    }
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = reader.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
) -> std::io::Result<Option<std::process::ExitStatus>> {
    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if started.elapsed() >= timeout {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

impl Generator for CommandGenerator {
    fn generate(&self, prompt: &Prompt) -> Result<String, GeneratorError> {
        let prompt = prompt.to_text();
        let mut attempt = 0;
        loop {
            debug!("Running generator {} (attempt {})", self.program, attempt + 1);
            match self.attempt(&prompt) {
                Ok(answer) => return Ok(answer),
                Err(e @ GeneratorError::Spawn { .. }) => return Err(e),
                Err(e) if attempt >= self.retries => return Err(e),
                Err(e) => {
                    warn!("Generator attempt {} failed: {}; retrying", attempt + 1, e);
                    attempt += 1;
                }
            }
        }
    }

    fn describe(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        format!(
            "command `{}` (timeout {}s, {} retries)",
            line,
            self.timeout.as_secs(),
            self.retries
        )
    }
}

/// Build the generator selected by the user config
pub fn build_generator(config: &UserConfig) -> Result<Box<dyn Generator>, GeneratorError> {
    let backend = config.generator_backend();
    if backend.eq_ignore_ascii_case("command") {
        let Some(program) = config.generator.command.clone() else {
            return Err(GeneratorError::NotConfigured(format!(
                "set [generator] command in {} or the {} environment variable",
                UserConfig::user_config_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "config.toml".to_string()),
                GENERATOR_ENV
            )));
        };
        return Ok(Box::new(
            CommandGenerator::new(program, config.generator.args.clone())
                .with_timeout(Duration::from_secs(config.generator_timeout_secs()))
                .with_retries(config.generator_retries()),
        ));
    }

    let llm = LlmBackend::from_name(backend).ok_or_else(|| {
        GeneratorError::NotConfigured(format!(
            "unknown backend '{backend}'. Valid backends: command, anthropic, openai, ollama"
        ))
    })?;
    let client = AiClient::from_env_with_config(AiConfig {
        backend: llm,
        model: config.generator.model.clone(),
        timeout_secs: config.generator_timeout_secs(),
        ..Default::default()
    })?;
    Ok(Box::new(client))
}
