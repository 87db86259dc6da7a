//! External generator collaborators.
//!
//! The pipeline only knows the narrow [`Generator`] seam: one prompt in, the
//! complete response text out, failures as [`GeneratorError`]. Two backends
//! ship with the tool:
//!
//! - [`CommandGenerator`] runs a local LM command line (`ollama run llama3.2`,
//!   `llm -m ...`, a wrapper script). The command string is split with
//!   `shell-words` and executed directly, never through a shell, so keyword
//!   text cannot be interpreted as shell syntax.
//! - [`HttpGenerator`] talks to an Ollama-compatible `/api/generate` endpoint.
//!
//! # Prompt placement
//!
//! An argument that is exactly `{prompt}` is replaced by the prompt. Without a
//! placeholder the prompt is appended as the final argument, or written to
//! stdin when [`PromptMode::Stdin`] is selected.
use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

pub const PROMPT_PLACEHOLDER: &str = "{prompt}";

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Why a single generator call failed. Always recovered per record.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("LM command is empty")]
    EmptyCommand,

    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("LM command failed with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },

    #[error("LM call timed out after {:.1}s", .after.as_secs_f64())]
    TimedOut { after: Duration },

    #[error("LM request failed: {0}")]
    Transport(String),
}

impl GeneratorError {
    /// Human-readable detail for the record's error marker.
    ///
    /// A failed command reports its stderr verbatim when it wrote any.
    pub fn detail(&self) -> String {
        match self {
            GeneratorError::Failed { status, stderr } if stderr.trim().is_empty() => {
                format!("LM command failed with {status}")
            }
            GeneratorError::Failed { stderr, .. } => stderr.trim().to_string(),
            other => other.to_string(),
        }
    }
}

/// Prompt-in, text-out collaborator.
pub trait Generator {
    fn generate(&self, prompt: &str) -> Result<String, GeneratorError>;

    /// Short label for logs.
    fn describe(&self) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptMode {
    #[default]
    Argument,
    Stdin,
}

/// Local LM command line invoked once per prompt.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    argv: Vec<String>,
    prompt_mode: PromptMode,
    timeout: Option<Duration>,
}

impl CommandGenerator {
    pub fn new(
        argv: Vec<String>,
        prompt_mode: PromptMode,
        timeout: Option<Duration>,
    ) -> Result<Self, GeneratorError> {
        match argv.first() {
            Some(program) if !program.trim().is_empty() => {}
            _ => return Err(GeneratorError::EmptyCommand),
        }
        Ok(Self {
            argv,
            prompt_mode,
            timeout,
        })
    }

    /// Parse a command line with shell-words quoting rules.
    pub fn from_command_line(
        command: &str,
        prompt_mode: PromptMode,
        timeout: Option<Duration>,
    ) -> anyhow::Result<Self> {
        let argv = shell_words::split(command)
            .map_err(|err| anyhow::anyhow!("parse LM command {command:?}: {err}"))?;
        Ok(Self::new(argv, prompt_mode, timeout)?)
    }

    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    /// Warn early when the program is not on PATH; calls still run and fail per record.
    pub fn preflight(&self) {
        if let Err(err) = which::which(self.program()) {
            tracing::warn!(
                program = self.program(),
                error = %err,
                "LM program not found; every record will record an error"
            );
        }
    }

    /// Final argv for one prompt, plus whether the prompt goes to stdin.
    fn argv_for(&self, prompt: &str) -> (Vec<String>, bool) {
        let mut argv = self.argv.clone();
        let mut placed = false;
        for arg in argv.iter_mut().skip(1) {
            if arg == PROMPT_PLACEHOLDER {
                *arg = prompt.to_string();
                placed = true;
            }
        }
        if placed {
            return (argv, false);
        }
        match self.prompt_mode {
            PromptMode::Argument => {
                argv.push(prompt.to_string());
                (argv, false)
            }
            PromptMode::Stdin => (argv, true),
        }
    }
}

impl Generator for CommandGenerator {
    fn generate(&self, prompt: &str) -> Result<String, GeneratorError> {
        let (argv, use_stdin) = self.argv_for(prompt);
        let start = Instant::now();
        let mut command = Command::new(&argv[0]);
        command
            .args(&argv[1..])
            .stdin(if use_stdin {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // Own process group so a timeout also reaches anything the command spawned.
            command.process_group(0);
        }
        let mut child = command.spawn().map_err(|source| GeneratorError::Launch {
            program: argv[0].clone(),
            source,
        })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());
        let feeder = child.stdin.take().map(|mut stdin| {
            let prompt = prompt.to_string();
            thread::spawn(move || stdin.write_all(prompt.as_bytes()))
        });

        let mut timed_out = false;
        let status = loop {
            let polled = match child.try_wait() {
                Ok(polled) => polled,
                Err(source) => {
                    kill_tree(&mut child);
                    let _ = child.wait();
                    return Err(GeneratorError::Io {
                        context: "check LM command status",
                        source,
                    });
                }
            };
            if let Some(status) = polled {
                break status;
            }
            if self.timeout.is_some_and(|limit| start.elapsed() > limit) {
                timed_out = true;
                kill_tree(&mut child);
                break child.wait().map_err(|source| GeneratorError::Io {
                    context: "reap timed out LM command",
                    source,
                })?;
            }
            thread::sleep(POLL_INTERVAL);
        };

        if timed_out {
            // Readers and the feeder are left detached; a straggler holding the
            // pipes must not extend the call past its limit.
            tracing::info!(
                elapsed_ms = start.elapsed().as_millis(),
                prompt_bytes = prompt.len(),
                "lm invoke timed out"
            );
            return Err(GeneratorError::TimedOut {
                after: self.timeout.unwrap_or_default(),
            });
        }

        if let Some(feeder) = feeder {
            match feeder.join() {
                Ok(Ok(())) => {}
                // The command stopped reading; its exit status and stderr tell the story.
                Ok(Err(err)) if err.kind() == ErrorKind::BrokenPipe => {
                    tracing::debug!("LM command closed stdin before reading the full prompt");
                }
                Ok(Err(source)) => {
                    return Err(GeneratorError::Io {
                        context: "write prompt to LM stdin",
                        source,
                    })
                }
                Err(_) => {
                    return Err(GeneratorError::Io {
                        context: "write prompt to LM stdin",
                        source: std::io::Error::other("prompt writer panicked"),
                    })
                }
            }
        }

        let stdout = collect(stdout, "read LM stdout")?;
        let stderr = collect(stderr, "read LM stderr")?;

        tracing::info!(
            elapsed_ms = start.elapsed().as_millis(),
            prompt_bytes = prompt.len(),
            response_bytes = stdout.len(),
            "lm invoke complete"
        );

        if !status.success() {
            return Err(GeneratorError::Failed {
                status,
                stderr: String::from_utf8_lossy(&stderr).into_owned(),
            });
        }
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }

    fn describe(&self) -> String {
        shell_words::join(&self.argv)
    }
}

/// Kill the command and everything in its process group.
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Ok(pgid) = libc::pid_t::try_from(child.id()) {
            // SAFETY: killpg only sends a signal; the group was created at spawn.
            unsafe {
                libc::killpg(pgid, libc::SIGKILL);
            }
        }
    }
    let _ = child.kill();
}

type Pending = Option<thread::JoinHandle<std::io::Result<Vec<u8>>>>;

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Pending {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            pipe.read_to_end(&mut buf)?;
            Ok(buf)
        })
    })
}

fn collect(pending: Pending, context: &'static str) -> Result<Vec<u8>, GeneratorError> {
    let Some(handle) = pending else {
        return Ok(Vec::new());
    };
    match handle.join() {
        Ok(result) => result.map_err(|source| GeneratorError::Io { context, source }),
        Err(_) => Err(GeneratorError::Io {
            context,
            source: std::io::Error::other("output reader panicked"),
        }),
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Ollama-compatible HTTP backend (`POST {endpoint}/api/generate`).
pub struct HttpGenerator {
    agent: ureq::Agent,
    url: String,
    model: String,
}

impl HttpGenerator {
    pub fn new(endpoint: &str, model: &str, timeout: Option<Duration>) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(timeout)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            url: format!("{}/api/generate", endpoint.trim_end_matches('/')),
            model: model.to_string(),
        }
    }
}

impl Generator for HttpGenerator {
    fn generate(&self, prompt: &str) -> Result<String, GeneratorError> {
        let start = Instant::now();
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };
        let mut response = self
            .agent
            .post(&self.url)
            .send_json(&request)
            .map_err(|err| GeneratorError::Transport(err.to_string()))?;
        let body: GenerateResponse = response
            .body_mut()
            .read_json()
            .map_err(|err| GeneratorError::Transport(format!("decode response: {err}")))?;

        tracing::info!(
            elapsed_ms = start.elapsed().as_millis(),
            prompt_bytes = prompt.len(),
            response_bytes = body.response.len(),
            "lm invoke complete"
        );
        Ok(body.response)
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.url, self.model)
    }
}

#[cfg(test)]
#[path = "generator_tests.rs"]
mod tests;
