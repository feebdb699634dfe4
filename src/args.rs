//! Command-line option construction.
//!
//! [`Options`] turns a mapping of ffprobe option names to values into the
//! ordered `-name value` token sequence the tool expects. Pure construction,
//! no side effects, and no validation of option legality: unknown options are
//! passed straight through for ffprobe itself to accept or reject, so the
//! crate stays forward-compatible with new ffprobe flags.

use serde::{Deserialize, Serialize};

/// Value attached to a single command-line option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// The option takes one argument and renders as two tokens
    /// (`-name value`).
    Value(String),
    /// The option takes no argument and renders as a single token (`-name`).
    Flag,
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Value(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Value(value)
    }
}

/// An ordered set of command-line options.
///
/// Entries render in insertion order. Re-setting an existing option replaces
/// its value without moving it, so a given construction sequence always
/// yields the same token sequence.
///
/// # Example
///
/// ```
/// use frameprobe::Options;
///
/// let mut opts = Options::new();
/// opts.option("loglevel", "quiet").option("s", "320x240");
/// assert_eq!(opts.to_args(), ["-loglevel", "quiet", "-s", "320x240"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Options {
    entries: Vec<(String, OptionValue)>,
}

impl Options {
    /// Create an empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an option with a value, replacing any existing entry in place.
    ///
    /// The value is rendered through [`ToString`], so numbers and other
    /// displayable types work directly.
    pub fn option(&mut self, name: impl Into<String>, value: impl ToString) -> &mut Self {
        self.set(name.into(), OptionValue::Value(value.to_string()))
    }

    /// Set a valueless option, replacing any existing entry in place.
    pub fn flag(&mut self, name: impl Into<String>) -> &mut Self {
        self.set(name.into(), OptionValue::Flag)
    }

    fn set(&mut self, name: String, value: OptionValue) -> &mut Self {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
        self
    }

    /// Whether no options are set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of options set.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Render the options as command-line tokens.
    ///
    /// Each entry becomes `-name` optionally followed by its value.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.entries.len() * 2);
        for (name, value) in &self.entries {
            args.push(format!("-{name}"));
            if let OptionValue::Value(v) = value {
                args.push(v.clone());
            }
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_key_value_pairs_in_insertion_order() {
        let mut opts = Options::new();
        opts.option("select_streams", "v:0")
            .flag("count_frames")
            .option("loglevel", "quiet");
        assert_eq!(
            opts.to_args(),
            [
                "-select_streams",
                "v:0",
                "-count_frames",
                "-loglevel",
                "quiet"
            ]
        );
    }

    #[test]
    fn rendering_is_deterministic() {
        let mut opts = Options::new();
        opts.option("s", "320x240").option("t", 30);
        assert_eq!(opts.to_args(), opts.to_args());
    }

    #[test]
    fn resetting_replaces_in_place() {
        let mut opts = Options::new();
        opts.option("s", "320x240").option("t", 30).option("s", "640x480");
        assert_eq!(opts.to_args(), ["-s", "640x480", "-t", "30"]);
        assert_eq!(opts.len(), 2);
    }

    #[test]
    fn numeric_values_render_via_display() {
        let mut opts = Options::new();
        opts.option("probesize", 5_000_000).option("ss", 1.5);
        assert_eq!(opts.to_args(), ["-probesize", "5000000", "-ss", "1.5"]);
    }

    #[test]
    fn round_trip_recovers_key_value_pair() {
        let mut opts = Options::new();
        opts.option("s", "320x240");

        let args = opts.to_args();
        let key = args[0].strip_prefix('-').unwrap();
        assert_eq!((key, args[1].as_str()), ("s", "320x240"));
    }

    #[test]
    fn option_value_from_str_and_string() {
        assert_eq!(OptionValue::from("v:0"), OptionValue::Value("v:0".into()));
        assert_eq!(
            OptionValue::from(String::from("quiet")),
            OptionValue::Value("quiet".into())
        );
    }

    #[test]
    fn options_survive_serde_round_trip() {
        let mut opts = Options::new();
        opts.option("loglevel", "quiet").flag("count_frames");

        let json = serde_json::to_string(&opts).unwrap();
        let back: Options = serde_json::from_str(&json).unwrap();
        assert_eq!(back, opts);
        assert_eq!(back.to_args(), opts.to_args());
    }

    #[test]
    fn empty_options_render_nothing() {
        assert!(Options::new().to_args().is_empty());
        assert!(Options::new().is_empty());
    }
}
