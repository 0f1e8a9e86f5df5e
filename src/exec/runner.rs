//! [`CommandRunner`] trait, the tokio-backed implementation and the
//! test-only mock.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;

// ---------------------------------------------------------------------------
// ExecError
// ---------------------------------------------------------------------------

/// Failures while driving an external process.
///
/// A non-zero exit code is **not** represented here — `run` reports it as a
/// normal return value and the caller decides what it means.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The executable could not be started at all (missing binary, bad
    /// permissions).
    #[error("failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O failed while feeding stdin or draining stdout/stderr.
    #[error("i/o error while driving child process: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// CommandSpec
// ---------------------------------------------------------------------------

/// A program plus its arguments, built up fluently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl std::fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// StdinFeed / OutputSink
// ---------------------------------------------------------------------------

/// Lines to stream into the child's stdin.
///
/// Each line is written with a trailing `\n` and flushed; `on_line` (when
/// set) then receives the running count of written lines. The feed is never
/// buffered whole — line `n+1` is not touched until line `n` is on the pipe.
pub struct StdinFeed<'a> {
    lines: Box<dyn Iterator<Item = String> + Send + 'a>,
    on_line: Option<Box<dyn FnMut(usize) + Send + 'a>>,
}

impl<'a> StdinFeed<'a> {
    pub fn new<I>(lines: I) -> Self
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: Send + 'a,
    {
        Self {
            lines: Box::new(lines.into_iter()),
            on_line: None,
        }
    }

    /// Invoke `callback` with the count of lines written so far, right after
    /// each write.
    pub fn with_progress(mut self, callback: impl FnMut(usize) + Send + 'a) -> Self {
        self.on_line = Some(Box::new(callback));
        self
    }
}

/// Optional per-line callbacks for the child's stdout and stderr.
#[derive(Default)]
pub struct OutputSink<'a> {
    on_stdout: Option<Box<dyn FnMut(&str) + Send + 'a>>,
    on_stderr: Option<Box<dyn FnMut(&str) + Send + 'a>>,
}

impl<'a> OutputSink<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_stdout(mut self, callback: impl FnMut(&str) + Send + 'a) -> Self {
        self.on_stdout = Some(Box::new(callback));
        self
    }

    pub fn on_stderr(mut self, callback: impl FnMut(&str) + Send + 'a) -> Self {
        self.on_stderr = Some(Box::new(callback));
        self
    }
}

// ---------------------------------------------------------------------------
// CommandRunner
// ---------------------------------------------------------------------------

/// Object-safe seam over process execution.
///
/// # Contract
///
/// - Returns `Ok(exit_code)` whenever the process ran to completion,
///   regardless of the code.
/// - Returns `Err` only when the process could not be spawned or its pipes
///   could not be driven.
/// - `stdin` lines are written incrementally and interleaved with the
///   per-line callback; stdout/stderr are drained concurrently.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(
        &self,
        spec: &CommandSpec,
        stdin: Option<StdinFeed<'_>>,
        output: OutputSink<'_>,
    ) -> Result<i32, ExecError>;
}

// Compile-time assertion: Box<dyn CommandRunner> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn CommandRunner>) {}
};

// ---------------------------------------------------------------------------
// TokioRunner
// ---------------------------------------------------------------------------

/// Production [`CommandRunner`] backed by `tokio::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioRunner;

impl TokioRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for TokioRunner {
    async fn run(
        &self,
        spec: &CommandSpec,
        stdin: Option<StdinFeed<'_>>,
        output: OutputSink<'_>,
    ) -> Result<i32, ExecError> {
        log::debug!("exec: spawning {spec}");

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| ExecError::Spawn {
            program: spec.program.clone(),
            source,
        })?;

        let child_stdin = child.stdin.take();
        let child_stdout = child.stdout.take();
        let child_stderr = child.stderr.take();

        let OutputSink {
            mut on_stdout,
            mut on_stderr,
        } = output;

        let feed = async {
            if let (Some(mut feed), Some(mut writer)) = (stdin, child_stdin) {
                let mut written = 0usize;
                for line in feed.lines.by_ref() {
                    let result = async {
                        writer.write_all(line.as_bytes()).await?;
                        writer.write_all(b"\n").await?;
                        writer.flush().await
                    }
                    .await;

                    match result {
                        Ok(()) => {
                            written += 1;
                            if let Some(cb) = feed.on_line.as_mut() {
                                cb(written);
                            }
                        }
                        // A child that exits early closes the pipe; its exit
                        // code is the interesting outcome, not the EPIPE.
                        Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => break,
                        Err(e) => return Err(e),
                    }
                }
                // Close stdin so the child sees EOF.
                let _ = writer.shutdown().await;
            }
            Ok(())
        };

        let drain_stdout = async {
            if let Some(out) = child_stdout {
                let mut lines = BufReader::new(out).lines();
                while let Some(line) = lines.next_line().await? {
                    if let Some(cb) = on_stdout.as_mut() {
                        cb(&line);
                    }
                }
            }
            Ok::<(), std::io::Error>(())
        };

        let drain_stderr = async {
            if let Some(err) = child_stderr {
                let mut lines = BufReader::new(err).lines();
                while let Some(line) = lines.next_line().await? {
                    if let Some(cb) = on_stderr.as_mut() {
                        cb(&line);
                    }
                }
            }
            Ok::<(), std::io::Error>(())
        };

        let (fed, out_drained, err_drained) = tokio::join!(feed, drain_stdout, drain_stderr);
        fed?;
        out_drained?;
        err_drained?;

        let status = child.wait().await?;
        Ok(status.code().unwrap_or(-1))
    }
}

// ---------------------------------------------------------------------------
// probe
// ---------------------------------------------------------------------------

/// Run `spec` with a bounded `timeout` and report whether it exited 0.
///
/// Used for dependency checks (`piper --help`) where the only question is
/// "does this executable work at all".
pub async fn probe(runner: &dyn CommandRunner, spec: &CommandSpec, timeout: Duration) -> bool {
    matches!(
        tokio::time::timeout(timeout, runner.run(spec, None, OutputSink::new())).await,
        Ok(Ok(0))
    )
}

// ---------------------------------------------------------------------------
// MockRunner  (test-only)
// ---------------------------------------------------------------------------

/// One invocation seen by the [`MockRunner`]: the spec plus every stdin line
/// that was fed.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub spec: CommandSpec,
    pub stdin: Vec<String>,
}

/// A [`CommandRunner`] that never spawns anything.
///
/// The handler receives the spec and the fed stdin lines and returns the
/// exit code; it may create files (e.g. a simulated `--output_file`) as a
/// side effect. Stdin progress callbacks fire exactly as the real runner
/// would fire them.
#[cfg(test)]
pub struct MockRunner {
    handler: Box<dyn Fn(&CommandSpec, &[String]) -> i32 + Send + Sync>,
    calls: std::sync::Mutex<Vec<RecordedCall>>,
}

#[cfg(test)]
impl MockRunner {
    pub fn new(handler: impl Fn(&CommandSpec, &[String]) -> i32 + Send + Sync + 'static) -> Self {
        Self {
            handler: Box::new(handler),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// A runner whose every invocation exits with `code`.
    pub fn always(code: i32) -> Self {
        Self::new(move |_, _| code)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(
        &self,
        spec: &CommandSpec,
        stdin: Option<StdinFeed<'_>>,
        _output: OutputSink<'_>,
    ) -> Result<i32, ExecError> {
        let mut lines = Vec::new();
        if let Some(mut feed) = stdin {
            let mut written = 0usize;
            for line in feed.lines.by_ref() {
                written += 1;
                if let Some(cb) = feed.on_line.as_mut() {
                    cb(written);
                }
                lines.push(line);
            }
        }
        let code = (self.handler)(spec, &lines);
        self.calls.lock().unwrap().push(RecordedCall {
            spec: spec.clone(),
            stdin: lines,
        });
        Ok(code)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
