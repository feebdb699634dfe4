//! Builder for executing external tool invocations.
//!
//! [`ToolCommand`] spawns a child process with captured stdio, optionally
//! bounds the wait with a timeout, and can connect its stdout directly to a
//! second filter process ([`ToolCommand::pipe_into`]). Children are spawned
//! with `kill_on_drop`, so every exit path (success, failure, timeout, caller
//! cancellation) leaves no process behind.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::Command;

use crate::error::{Error, Result};

/// Output captured from a tool execution.
///
/// Raw bytes, not text: decoding is the caller's concern and a decode failure
/// must be distinguishable from a command failure.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Process exit status.
    pub status: ExitStatus,
    /// Captured standard output.
    pub stdout: Vec<u8>,
    /// Captured standard error.
    pub stderr: Vec<u8>,
}

/// A builder for constructing and executing a single external tool
/// invocation.
///
/// # Example
///
/// ```no_run
/// use frameprobe::ToolCommand;
/// use std::path::PathBuf;
///
/// # async fn example() -> frameprobe::Result<()> {
/// let output = ToolCommand::new(PathBuf::from("ffprobe"))
///     .arg("-show_format")
///     .arg("-show_streams")
///     .arg("-of")
///     .arg("json")
///     .arg("/path/to/video.mkv")
///     .execute()
///     .await?;
/// println!("{}", String::from_utf8_lossy(&output.stdout));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    ///
    /// The program may be a bare name (resolved through `PATH` at spawn time)
    /// or an absolute path. Existence is not checked here; a missing
    /// executable surfaces as [`Error::Spawn`] from the execute methods.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: None,
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Bound the wait in [`ToolCommand::execute`]. Unbounded by default.
    pub fn timeout(&mut self, d: Duration) -> &mut Self {
        self.timeout = Some(d);
        self
    }

    /// The name used to tag errors: the program's file name.
    pub fn tool_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    fn build(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    /// Execute the command, capturing stdout and stderr.
    ///
    /// # Errors
    ///
    /// - [`Error::Spawn`] if the process could not be started.
    /// - [`Error::Timeout`] if a configured timeout elapsed; the child is
    ///   killed and reaped before this returns.
    /// - [`Error::CommandFailed`] if the process exited non-zero, carrying
    ///   the full captured stdout and stderr.
    pub async fn execute(&self) -> Result<ToolOutput> {
        let tool = self.tool_name();
        tracing::debug!("run {:?} {}", self.program, self.args.join(" "));

        let child = self.build().spawn().map_err(|e| Error::Spawn {
            tool: tool.clone(),
            source: e,
        })?;

        let waited = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(res) => res,
                Err(_elapsed) => {
                    // Dropping the wait future drops the child; kill_on_drop
                    // has the runtime kill and reap it.
                    tracing::warn!("{tool} killed after exceeding {limit:?}");
                    return Err(Error::Timeout {
                        tool,
                        timeout: limit,
                    });
                }
            },
            None => child.wait_with_output().await,
        };

        let output = waited.map_err(|e| Error::Io {
            tool: tool.clone(),
            source: e,
        })?;

        if !output.status.success() {
            tracing::warn!("{tool} exited with {}", output.status);
            return Err(Error::CommandFailed {
                tool,
                status: output.status,
                stdout: output.stdout,
                stderr: output.stderr,
            });
        }

        Ok(ToolOutput {
            status: output.status,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    /// Execute the command with its stdout connected directly to `filter`'s
    /// stdin, and capture the filter's output.
    ///
    /// The pipe is wired at the OS level; bytes never pass through this
    /// process. Only the filter's exit status decides success. The producer
    /// is always reaped, and a non-zero producer status is logged rather
    /// than failing the call, since the filter's status already reflects
    /// what reached it. The producer's stderr is discarded; only the
    /// filter's output is captured.
    ///
    /// # Errors
    ///
    /// - [`Error::Spawn`] if either process could not be started.
    /// - [`Error::CommandFailed`] if the filter exited non-zero. The error is
    ///   tagged with the producer's tool name, since from the caller's view
    ///   this is a single logical invocation of the producer.
    pub async fn pipe_into(&self, filter: &ToolCommand) -> Result<ToolOutput> {
        let tool = self.tool_name();
        let filter_tool = filter.tool_name();
        tracing::debug!(
            "run {:?} {} | {:?} {}",
            self.program,
            self.args.join(" "),
            filter.program,
            filter.args.join(" ")
        );

        // The producer's stderr is never surfaced (a failure carries the
        // filter's output), and an undrained stderr pipe would block a
        // chatty producer before it closes stdout. Discard it.
        let mut producer = self
            .build()
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Spawn {
                tool: tool.clone(),
                source: e,
            })?;

        let producer_out = producer.stdout.take().ok_or_else(|| Error::Io {
            tool: tool.clone(),
            source: std::io::Error::other("producer stdout was not captured"),
        })?;
        let producer_out: Stdio = producer_out.try_into().map_err(|e| Error::Io {
            tool: tool.clone(),
            source: e,
        })?;

        let filter_child = filter
            .build()
            .stdin(producer_out)
            .spawn()
            .map_err(|e| Error::Spawn {
                tool: filter_tool.clone(),
                source: e,
            })?;

        let output = filter_child
            .wait_with_output()
            .await
            .map_err(|e| Error::Io {
                tool: filter_tool.clone(),
                source: e,
            })?;

        if !output.status.success() {
            // A dead filter can leave the producer blocked on a full pipe.
            let _ = producer.start_kill();
        }

        match producer.wait().await {
            Ok(status) if !status.success() => {
                tracing::warn!("{tool} exited with {status} upstream of {filter_tool}");
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("failed to reap {tool}: {e}"),
        }

        if !output.status.success() {
            tracing::warn!("{filter_tool} exited with {}", output.status);
            return Err(Error::CommandFailed {
                tool,
                status: output.status,
                stdout: output.stdout,
                stderr: output.stderr,
            });
        }

        Ok(ToolOutput {
            status: output.status,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn execute_captures_stdout_bytes() {
        let mut cmd = ToolCommand::new("printf");
        cmd.arg("hello");
        let out = cmd.execute().await.unwrap();

        assert!(out.status.success());
        assert_eq!(out.stdout, b"hello");
        assert_eq!(out.stderr, b"");
    }

    #[tokio::test]
    async fn execute_nonexistent_tool_is_spawn_error() {
        let result = ToolCommand::new("nonexistent_tool_xyz_12345").execute().await;
        assert_matches!(result, Err(Error::Spawn { .. }));
    }

    #[tokio::test]
    async fn nonzero_exit_carries_captured_output() {
        let mut cmd = ToolCommand::new("sh");
        cmd.arg("-c").arg("echo out; echo err 1>&2; exit 3");
        let err = cmd.execute().await.unwrap_err();

        assert_matches!(err, Error::CommandFailed { ref tool, ref stdout, ref stderr, .. } => {
            assert_eq!(tool, "sh");
            assert_eq!(stdout, b"out\n");
            assert_eq!(stderr, b"err\n");
        });
    }

    #[tokio::test]
    async fn timeout_fires_promptly() {
        let start = std::time::Instant::now();
        let mut cmd = ToolCommand::new("sleep");
        cmd.arg("10").timeout(Duration::from_millis(100));
        let result = cmd.execute().await;

        assert_matches!(result, Err(Error::Timeout { .. }));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn pipe_into_filters_at_os_level() {
        let mut producer = ToolCommand::new("sh");
        producer.arg("-c").arg("printf 'a\\nIb\\nc\\nId\\n'");
        let mut filter = ToolCommand::new("grep");
        filter.arg("-n").arg("I");

        let out = producer.pipe_into(&filter).await.unwrap();
        assert_eq!(out.stdout, b"2:Ib\n4:Id\n");
    }

    #[tokio::test]
    async fn pipe_into_survives_chatty_producer_stderr() {
        // A producer writing more than a pipe buffer to stderr must not
        // wedge the pair before it closes stdout.
        let mut producer = ToolCommand::new("sh");
        producer
            .arg("-c")
            .arg("printf 'I\\n'; head -c 262144 /dev/zero | tr '\\0' 'e' 1>&2");
        let mut filter = ToolCommand::new("grep");
        filter.arg("-n").arg("I");

        let out = tokio::time::timeout(Duration::from_secs(10), producer.pipe_into(&filter))
            .await
            .expect("piped pair did not complete")
            .unwrap();
        assert_eq!(out.stdout, b"1:I\n");
    }

    #[tokio::test]
    async fn pipe_into_fails_on_filter_exit_code() {
        let mut producer = ToolCommand::new("echo");
        producer.arg("no marker here");
        let mut filter = ToolCommand::new("grep");
        filter.arg("-n").arg("I");

        // grep exits 1 when nothing matches.
        let err = producer.pipe_into(&filter).await.unwrap_err();
        assert_matches!(err, Error::CommandFailed { ref tool, .. } => {
            assert_eq!(tool, "echo");
        });
    }
}
