//! # frameprobe
//!
//! A thin async command-construction and invocation layer around the
//! external `ffprobe` executable.
//!
//! This crate provides:
//!
//! - **Argument construction** ([`Options`]) -- deterministic `-name value`
//!   token rendering from an ordered option mapping, passed through to
//!   ffprobe unvalidated.
//! - **Command execution** ([`ToolCommand`]) -- async spawn with captured
//!   stdio, optional timeout with guaranteed child reaping, and OS-level
//!   process-to-process piping.
//! - **Probes** ([`Ffprobe`], [`probe`], [`probe_key_frames`]) -- media
//!   metadata as a parsed JSON document, and key-frame positions as 1-based
//!   line numbers from the filtered CSV listing.
//! - **Tool discovery** ([`tools`]) -- locate ffprobe on `PATH` and detect
//!   its version.
//!
//! Every call is independent and stateless: it owns its child process(es)
//! for its duration and leaves nothing behind on any exit path.
//!
//! # Example
//!
//! ```no_run
//! # async fn example() -> frameprobe::Result<()> {
//! let info = frameprobe::probe("/media/movie.mkv").await?;
//! let key_frames = frameprobe::probe_key_frames("/media/movie.mkv").await?;
//! println!("{} key frames in {}", key_frames.len(), info["format"]["filename"]);
//! # Ok(())
//! # }
//! ```

pub mod args;
pub mod command;
pub mod error;
pub mod probe;
pub mod tools;

// ---- Re-exports for convenience ----

pub use args::{OptionValue, Options};
pub use command::{ToolCommand, ToolOutput};
pub use error::{Error, Result};
pub use probe::{probe, probe_key_frames, Ffprobe, DEFAULT_EXECUTABLE};
