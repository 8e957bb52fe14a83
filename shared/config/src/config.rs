use crate::{ConfigArgs, ConfigError, CpuInfo, SystemCpuInfo};
use clap::Parser;
use serde_json::Value;
use std::{collections::BTreeMap, ffi::OsString, path::Path};
use tracing::info;

const PROGRAM_NAME: &str = "noteml-train";

/// Options of a run, loaded once at startup and only shared by reference
/// afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    /// Flag values after normalization. `threads` holds the resolved count;
    /// use [`Config::pr_at_k`] for the parsed form of `pr_at_k`.
    pub options: ConfigArgs,
    pr_at_k: Vec<i64>,
    threads: usize,
    values: BTreeMap<String, Value>,
}

impl Config {
    /// Loads the options from the process arguments, or takes every default
    /// when `from_command_line` is false.
    pub fn load(from_command_line: bool, verbose: bool) -> Result<Self, ConfigError> {
        let options = if from_command_line {
            ConfigArgs::try_parse()?
        } else {
            ConfigArgs::try_parse_from([PROGRAM_NAME])?
        };
        Self::from_args(options, &SystemCpuInfo, verbose)
    }

    pub fn try_parse_from<I, T>(args: I, verbose: bool) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::from_args(ConfigArgs::try_parse_from(args)?, &SystemCpuInfo, verbose)
    }

    pub fn from_args(
        mut options: ConfigArgs,
        cpu: &impl CpuInfo,
        verbose: bool,
    ) -> Result<Self, ConfigError> {
        if verbose {
            info!("Config:");
            for line in option_listing(&collect_values(&options)?) {
                info!("{line}");
            }
        }

        let pr_at_k = parse_int_list("pr_at_k", &options.pr_at_k)?;
        let threads = resolve_threads(options.threads, cpu)?;
        if options.threads == -1 && verbose {
            info!("Setting threads to {threads}");
        }
        options.threads = threads as i64;

        let mut values = collect_values(&options)?;
        values.insert("pr_at_k".to_string(), Value::from(pr_at_k.clone()));

        Ok(Self {
            options,
            pr_at_k,
            threads,
            values,
        })
    }

    /// Looks an option up by name. Names that were never registered are an
    /// error, never a default.
    pub fn get(&self, name: &str) -> Result<&Value, ConfigError> {
        self.values
            .get(name)
            .ok_or_else(|| ConfigError::UnknownOption(name.to_string()))
    }

    /// All option names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn pr_at_k(&self) -> &[i64] {
        &self.pr_at_k
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// `None` when the number of epochs is unlimited.
    pub fn epoch_limit(&self) -> Option<usize> {
        usize::try_from(self.options.epochs).ok()
    }

    /// `None` when notes are never truncated.
    pub fn max_note_len(&self) -> Option<usize> {
        usize::try_from(self.options.max_note_len).ok()
    }

    pub fn save_file(&self) -> &Path {
        &self.options.save_file
    }

    pub fn best_save_file(&self) -> Option<&Path> {
        self.options.best_save_file.as_deref()
    }
}

fn collect_values(options: &ConfigArgs) -> Result<BTreeMap<String, Value>, ConfigError> {
    Ok(serde_json::from_value(serde_json::to_value(options)?)?)
}

fn option_listing(values: &BTreeMap<String, Value>) -> Vec<String> {
    let width = values.keys().map(String::len).max().unwrap_or(0) + 2;
    values
        .iter()
        .map(|(name, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            format!("{name:<width$}{value}").trim_end().to_string()
        })
        .collect()
}

fn parse_int_list(option: &'static str, raw: &str) -> Result<Vec<i64>, ConfigError> {
    raw.split(',')
        .map(|segment| {
            segment
                .trim()
                .parse::<i64>()
                .map_err(|source| ConfigError::InvalidIntList {
                    option,
                    segment: segment.to_string(),
                    source,
                })
        })
        .collect()
}

fn resolve_threads(threads: i64, cpu: &impl CpuInfo) -> Result<usize, ConfigError> {
    match threads {
        -1 => Ok(cpu.cpu_count().saturating_sub(1).max(1)),
        t if t < -1 => Err(ConfigError::InvalidValue {
            option: "threads",
            reason: format!("{t} is negative, use -1 to detect the thread count"),
        }),
        t => Ok(t as usize),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FixedCpuInfo;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;
    use std::path::PathBuf;

    fn parse(args: &[&str]) -> Result<Config, ConfigError> {
        let argv = std::iter::once(PROGRAM_NAME).chain(args.iter().copied());
        Config::from_args(ConfigArgs::try_parse_from(argv)?, &FixedCpuInfo(8), false)
    }

    #[test_log::test]
    fn test_defaults() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.options.batch_size, 32);
        assert_eq!(config.options.data_path, PathBuf::from("data/mimic"));
        assert_eq!(config.save_file(), Path::new("saved/recent.dat"));
        assert_eq!(config.best_save_file(), None);
        assert_eq!(config.pr_at_k(), &[8, 24, 40]);
        assert_eq!(config.epoch_limit(), None);
        assert_eq!(config.max_note_len(), Some(4000));
        assert!(config.options.early_stop);
        assert_eq!(config.options.min_epochs, 20);
        assert_eq!(config.options.print_every, 50);
        assert_eq!(config.options.save_every, 500);
    }

    #[test_log::test]
    fn test_load_without_command_line_ignores_process_args() {
        // the test harness' own arguments would not parse as options
        let config = Config::load(false, true).unwrap();
        assert_eq!(config.options.batch_size, 32);
        assert!(config.threads() >= 1);
    }

    #[rstest]
    #[case(1, 1)]
    #[case(2, 1)]
    #[case(8, 7)]
    #[case(64, 63)]
    fn test_auto_threads(#[case] cpus: usize, #[case] expected: usize) {
        let options = ConfigArgs::try_parse_from([PROGRAM_NAME]).unwrap();
        let config = Config::from_args(options, &FixedCpuInfo(cpus), false).unwrap();
        assert_eq!(config.threads(), expected);
        assert_eq!(config.get("threads").unwrap(), &json!(expected));
    }

    #[test_log::test]
    fn test_explicit_threads_kept() {
        let config = parse(&["--threads", "3"]).unwrap();
        assert_eq!(config.threads(), 3);
    }

    #[test_log::test]
    fn test_threads_below_auto_rejected() {
        let err = parse(&["--threads", "-2"]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                option: "threads",
                ..
            }
        ));
    }

    #[test_log::test]
    fn test_pr_at_k_parsed_in_order() {
        let config = parse(&["--pr-at-k", "40, 8,-3"]).unwrap();
        assert_eq!(config.pr_at_k(), &[40, 8, -3]);
        assert_eq!(config.get("pr_at_k").unwrap(), &json!([40, 8, -3]));
    }

    #[rstest]
    #[case("8,x,40", "x")]
    #[case("8,,40", "")]
    #[case("", "")]
    #[case("1.5", "1.5")]
    fn test_pr_at_k_rejects_non_integers(#[case] raw: &str, #[case] bad: &str) {
        match parse(&["--pr-at-k", raw]) {
            Err(ConfigError::InvalidIntList {
                option, segment, ..
            }) => {
                assert_eq!(option, "pr_at_k");
                assert_eq!(segment, bad);
            }
            other => panic!("expected InvalidIntList, got {other:?}"),
        }
    }

    #[test_log::test]
    fn test_unknown_option_is_an_error() {
        let config = parse(&[]).unwrap();
        assert!(matches!(
            config.get("no_such_option"),
            Err(ConfigError::UnknownOption(name)) if name == "no_such_option"
        ));
    }

    #[test_log::test]
    fn test_get_by_name() {
        let config = parse(&["--batch-size", "7", "--best-save-file", "best.dat"]).unwrap();
        assert_eq!(config.get("batch_size").unwrap(), &json!(7));
        assert_eq!(config.get("best_save_file").unwrap(), &json!("best.dat"));
        assert_eq!(config.get("load_file").unwrap(), &Value::Null);
        assert_eq!(config.get("learning_rate").unwrap(), &json!(1e-3));
    }

    #[test_log::test]
    fn test_bool_flags() {
        let config = parse(&["--early-stop", "false", "--visualize", "--length-sort=false"]).unwrap();
        assert!(!config.options.early_stop);
        assert!(config.options.visualize);
        assert!(!config.options.length_sort);
    }

    #[test_log::test]
    fn test_epoch_limit() {
        assert_eq!(parse(&["--epochs", "0"]).unwrap().epoch_limit(), Some(0));
        assert_eq!(parse(&["--epochs", "-1"]).unwrap().epoch_limit(), None);
        assert_eq!(parse(&["--epochs=12"]).unwrap().epoch_limit(), Some(12));
    }

    #[test_log::test]
    fn test_unregistered_flag_fails_to_parse() {
        assert!(matches!(
            parse(&["--not-a-flag", "1"]),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test_log::test]
    fn test_names_sorted() {
        let config = parse(&[]).unwrap();
        let names: Vec<&str> = config.names().collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert!(names.contains(&"stop_increment"));
    }

    #[test_log::test]
    fn test_option_listing_is_sorted_and_aligned() {
        let values: BTreeMap<String, Value> = [
            ("threads".to_string(), json!(4)),
            ("best_save_file".to_string(), Value::Null),
            ("data_path".to_string(), json!("data/mimic")),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            option_listing(&values),
            vec![
                "best_save_file".to_string(),
                "data_path       data/mimic".to_string(),
                "threads         4".to_string(),
            ]
        );
    }
}
