use crate::error::{ClusterError, Result};
use crate::store;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::PathBuf;

/// Widest identifier accepted; any `usize` count fits in 20 digits.
pub const MAX_NAME_LEN: usize = 20;

/// Segmentation mode handed to the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    Cn,
    En,
}

/// Width of zero-padded cluster identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameLen {
    Fixed(usize),
    /// digit-count(total input lines) + 1
    Auto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub dict: PathBuf,
    pub stop_words: PathBuf,
    pub sample_number: usize,
    pub threshold: f64,
    pub name_len: NameLen,
    pub lang: Lang,
    pub payload_delimiter: Option<String>,
    pub seed: Option<u64>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("./data/infile"),
            output: PathBuf::from("./data/output"),
            dict: PathBuf::from("./data/seg_dict"),
            stop_words: PathBuf::from("./data/stop_words"),
            sample_number: 5,
            threshold: 0.3,
            name_len: NameLen::Fixed(9),
            lang: Lang::Cn,
            payload_delimiter: None,
            seed: None,
        }
    }
}

impl ClusterConfig {
    pub fn validate(&self) -> Result<()> {
        let meta = std::fs::metadata(&self.input)
            .map_err(|e| ClusterError::configuration(&self.input, e.to_string()))?;
        if !meta.is_file() {
            return Err(ClusterError::configuration(&self.input, "not a regular file"));
        }
        File::open(&self.input).map_err(|e| ClusterError::configuration(&self.input, e.to_string()))?;

        if self.sample_number == 0 {
            return Err(ClusterError::InvalidOption {
                name: "sample-number",
                reason: "must be at least 1".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ClusterError::InvalidOption {
                name: "threshold",
                reason: format!("{} is outside [0.0, 1.0]", self.threshold),
            });
        }
        if let NameLen::Fixed(n) = self.name_len {
            if !(1..=MAX_NAME_LEN).contains(&n) {
                return Err(ClusterError::InvalidOption {
                    name: "name-len",
                    reason: format!("{n} is outside 1..={MAX_NAME_LEN}"),
                });
            }
        }
        if matches!(self.payload_delimiter.as_deref(), Some("")) {
            return Err(ClusterError::InvalidOption {
                name: "payload-delimiter",
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Concrete identifier width for this run. `Auto` reads the whole input once.
    pub fn resolve_name_len(&self) -> Result<usize> {
        match self.name_len {
            NameLen::Fixed(n) => Ok(n),
            NameLen::Auto => {
                let lines = store::count_lines(&self.input)
                    .map_err(|e| ClusterError::configuration(&self.input, e.to_string()))?;
                Ok(auto_name_len(lines))
            }
        }
    }
}

pub fn auto_name_len(total_lines: usize) -> usize {
    total_lines.to_string().len() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_width_adds_one_digit() {
        assert_eq!(auto_name_len(0), 2);
        assert_eq!(auto_name_len(9), 2);
        assert_eq!(auto_name_len(10), 3);
        assert_eq!(auto_name_len(12345), 6);
    }

    #[test]
    fn defaults_match_cli_defaults() {
        let c = ClusterConfig::default();
        assert_eq!(c.sample_number, 5);
        assert!((c.threshold - 0.3).abs() < f64::EPSILON);
        assert_eq!(c.name_len, NameLen::Fixed(9));
        assert_eq!(c.lang, Lang::Cn);
    }

    #[test]
    fn name_len_must_fit_a_usize_count() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("infile");
        std::fs::write(&input, "x\n").unwrap();
        let mut c = ClusterConfig { input, ..Default::default() };
        for bad in [0, MAX_NAME_LEN + 1, 1 << 40] {
            c.name_len = NameLen::Fixed(bad);
            assert!(matches!(c.validate(), Err(ClusterError::InvalidOption { name: "name-len", .. })));
        }
        c.name_len = NameLen::Fixed(MAX_NAME_LEN);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn missing_input_is_configuration_error() {
        let c = ClusterConfig { input: PathBuf::from("/definitely/not/here"), ..Default::default() };
        let err = c.validate().unwrap_err();
        assert!(err.is_configuration());
    }
}
