//! ffprobe front end: metadata probe and key-frame probe.
//!
//! [`Ffprobe`] is a configured handle (executable, timeout, passthrough
//! options, optional admission limit); [`probe`] and [`probe_key_frames`]
//! are one-shot helpers using the defaults. Each call owns its child
//! process(es), blocks until they finish, and shares no state with other
//! calls.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::args::Options;
use crate::command::ToolCommand;
use crate::error::{Error, Result};

/// Default executable name, resolved through `PATH` at spawn time.
pub const DEFAULT_EXECUTABLE: &str = "ffprobe";

/// Flags always passed, before any caller options.
const SHOW_FLAGS: &[&str] = &["-show_format", "-show_streams"];

/// Filter stage of the key-frame probe: keep lines containing the key-frame
/// marker `I` and prefix each kept line with its 1-based line number.
const KEY_FRAME_FILTER: (&str, &[&str]) = ("grep", &["-n", "I"]);

/// A configured handle for invoking ffprobe.
///
/// # Example
///
/// ```no_run
/// use frameprobe::Ffprobe;
/// use std::time::Duration;
///
/// # async fn example() -> frameprobe::Result<()> {
/// let ffprobe = Ffprobe::default().timeout(Duration::from_secs(30));
/// let info = ffprobe.probe("/media/movie.mkv").await?;
/// println!("{}", info["format"]["format_name"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Ffprobe {
    executable: PathBuf,
    timeout: Option<Duration>,
    options: Options,
    limiter: Option<Arc<Semaphore>>,
}

impl Default for Ffprobe {
    /// A handle using [`DEFAULT_EXECUTABLE`], no timeout, and no extra
    /// options.
    fn default() -> Self {
        Self::new(DEFAULT_EXECUTABLE)
    }
}

impl Ffprobe {
    /// Create a handle for the given executable name or path.
    ///
    /// Existence is not checked up front; a missing executable surfaces as
    /// [`Error::Spawn`] when a probe runs.
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            timeout: None,
            options: Options::new(),
            limiter: None,
        }
    }

    /// Create a handle for an ffprobe found on `PATH`, or `None` if there
    /// is none.
    pub fn from_path() -> Option<Self> {
        crate::tools::find_ffprobe().map(Self::new)
    }

    /// Bound the metadata probe's wait. Unbounded by default.
    ///
    /// On expiry the child is killed and reaped before [`Error::Timeout`] is
    /// returned. The key-frame probe is not affected.
    pub fn timeout(mut self, d: Duration) -> Self {
        self.timeout = Some(d);
        self
    }

    /// Add a passthrough option rendered as `-name value` before the target.
    pub fn option(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.options.option(name, value);
        self
    }

    /// Add a valueless passthrough option rendered as `-name`.
    pub fn flag(mut self, name: impl Into<String>) -> Self {
        self.options.flag(name);
        self
    }

    /// Replace the passthrough options wholesale.
    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Cap the number of probes this handle (and its clones) run at once.
    ///
    /// Further calls wait for a slot rather than spawning. Unlimited by
    /// default; each probe consumes one or two OS processes, so callers
    /// fanning out over large libraries should set a cap.
    pub fn max_concurrent(mut self, n: usize) -> Self {
        self.limiter = Some(Arc::new(Semaphore::new(n)));
        self
    }

    /// Probe `target` and return the decoded JSON document.
    ///
    /// Runs `ffprobe -show_format -show_streams -of json [options] target`
    /// and parses stdout. No schema is enforced: the full nested document is
    /// returned as-is.
    ///
    /// # Errors
    ///
    /// [`Error::Spawn`], [`Error::Timeout`], [`Error::CommandFailed`] for
    /// process-level failures; [`Error::MalformedOutput`] when the tool
    /// exited zero but stdout was not UTF-8 JSON.
    pub async fn probe(&self, target: impl AsRef<Path>) -> Result<Value> {
        let target = target.as_ref();
        let _permit = self.admit().await;
        tracing::debug!("probing {:?}", target);

        let mut cmd = self.command("json", target);
        if let Some(limit) = self.timeout {
            cmd.timeout(limit);
        }
        let output = cmd.execute().await?;

        let text = std::str::from_utf8(&output.stdout).map_err(|e| {
            Error::malformed(self.tool_name(), format!("stdout is not UTF-8: {e}"))
        })?;
        serde_json::from_str(text)
            .map_err(|e| Error::malformed(self.tool_name(), format!("invalid JSON: {e}")))
    }

    /// Probe `target` for key frames and return their 1-based line numbers
    /// in the CSV stream listing.
    ///
    /// Runs `ffprobe -show_format -show_streams -of csv [options] target`
    /// with stdout piped at the OS level into a `grep -n I` filter, then
    /// parses each kept line's number prefix. Only the filter's exit status
    /// decides success; the producer's status is logged, not inspected.
    ///
    /// # Errors
    ///
    /// [`Error::Spawn`], [`Error::CommandFailed`] for process-level
    /// failures; [`Error::MalformedOutput`] if any output line lacks the
    /// `number:` prefix.
    pub async fn key_frames(&self, target: impl AsRef<Path>) -> Result<Vec<u64>> {
        let target = target.as_ref();
        let _permit = self.admit().await;
        tracing::debug!("probing key frames of {:?}", target);

        let (filter, filter_args) = KEY_FRAME_FILTER;
        let mut filter_cmd = ToolCommand::new(filter);
        filter_cmd.args(filter_args.iter().copied());

        let output = self.command("csv", target).pipe_into(&filter_cmd).await?;

        let text = std::str::from_utf8(&output.stdout).map_err(|e| {
            Error::malformed(self.tool_name(), format!("stdout is not UTF-8: {e}"))
        })?;
        parse_numbered_lines(text, &self.tool_name())
    }

    fn command(&self, output_format: &str, target: &Path) -> ToolCommand {
        let mut cmd = ToolCommand::new(self.executable.clone());
        cmd.args(SHOW_FLAGS.iter().copied())
            .arg("-of")
            .arg(output_format)
            .args(self.options.to_args())
            .arg(target.to_string_lossy());
        cmd
    }

    fn tool_name(&self) -> String {
        self.executable
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.executable.to_string_lossy().to_string())
    }

    async fn admit(&self) -> Option<OwnedSemaphorePermit> {
        match &self.limiter {
            // The semaphore is never closed, so acquire cannot fail.
            Some(sem) => sem.clone().acquire_owned().await.ok(),
            None => None,
        }
    }
}

/// Probe `target` with the default executable, no timeout, and no extra
/// options.
pub async fn probe(target: impl AsRef<Path>) -> Result<Value> {
    Ffprobe::default().probe(target).await
}

/// Probe `target` for key frames with the default executable and no extra
/// options.
pub async fn probe_key_frames(target: impl AsRef<Path>) -> Result<Vec<u64>> {
    Ffprobe::default().key_frames(target).await
}

/// Parse `grep -n` style output into the ordered list of line numbers.
fn parse_numbered_lines(text: &str, tool: &str) -> Result<Vec<u64>> {
    text.lines()
        .map(|line| {
            let (number, _) = line.split_once(':').ok_or_else(|| {
                Error::malformed(tool, format!("line without number prefix: {line:?}"))
            })?;
            number.parse::<u64>().map_err(|_| {
                Error::malformed(tool, format!("non-numeric line prefix: {line:?}"))
            })
        })
        .collect()
}
