//! Parsing Options.
//! `--places (red,blue) () ...` plus either `--sequence t1 t2 ...` or `--random N`.

use anyhow::{Context, Result, bail};
use clap::{Arg, ArgAction, Command, value_parser};
use std::path::PathBuf;

use crate::config::SimConfig;
use crate::net::core::Net;
use crate::net::io::{read_spec, write_spec};
use crate::net::spec::NetSpec;
use crate::net::transition::OutputPolicy;
use crate::parser::parse_places;
use crate::simulator::{FixedSequence, RandomSequence, SequenceSource};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

fn make_options_parser() -> clap::Command {
    Command::new("cpn")
        .no_binary_name(true)
        .about("Colored Petri net simulator")
        .version("v0.1.0")
        .arg(
            Arg::new("net")
                .short('n')
                .long("net")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Net description (.toml, .json or .ron); the built-in relay net otherwise"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .default_value("cpn.toml"),
        )
        .arg(
            Arg::new("places")
                .short('p')
                .long("places")
                .value_name("SPEC")
                .num_args(1..)
                .action(ArgAction::Append)
                .help("Initial tokens per place, e.g. (red,blue) ()"),
        )
        .arg(
            Arg::new("sequence")
                .short('s')
                .long("sequence")
                .value_name("NAME")
                .num_args(1..)
                .action(ArgAction::Append)
                .conflicts_with("random"),
        )
        .arg(
            Arg::new("random")
                .short('r')
                .long("random")
                .value_name("N")
                .value_parser(value_parser!(usize))
                .help("Fire N transitions drawn at random"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("stop")
                .long("stop-on-forbidden")
                .action(ArgAction::SetTrue)
                .overrides_with("no_stop")
                .help("Halt the sequence at the first forbidden transition"),
        )
        .arg(
            Arg::new("no_stop")
                .long("no-stop-on-forbidden")
                .action(ArgAction::SetTrue)
                .overrides_with("stop"),
        )
        .arg(
            Arg::new("lenient")
                .long("lenient")
                .action(ArgAction::SetTrue)
                .overrides_with("strict")
                .help("Skip output arcs with no matching token instead of refusing the firing"),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .action(ArgAction::SetTrue)
                .overrides_with("lenient"),
        )
        .arg(
            Arg::new("save_net")
                .long("save-net")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Write the resolved net description (.toml, .json or .ron)"),
        )
        .arg(
            Arg::new("diagnostics")
                .long("diagnostics")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Write the connectivity diagnostics to FILE"),
        )
        .arg(
            Arg::new("report")
                .long("report")
                .default_value("text")
                .value_parser(["text", "json"]),
        )
}

#[derive(Debug, Clone, Default)]
pub struct Options {
    pub net: Option<PathBuf>,
    pub config: PathBuf,
    pub places: Vec<String>,
    pub sequence: Vec<String>,
    pub random: Option<usize>,
    pub seed: Option<u64>,
    /// `None` keeps the configuration file's choice.
    pub stop_on_forbidden: Option<bool>,
    pub unmatched_output: Option<OutputPolicy>,
    pub save_net: Option<PathBuf>,
    pub diagnostics: Option<PathBuf>,
    pub report: ReportFormat,
}

impl Options {
    pub fn parse_from_str(s: &str) -> Result<Self> {
        let flags = shellwords::split(s).context("malformed flag string")?;
        Self::parse_from_args(&flags)
    }

    /// `CPN_FLAGS` are read first, so explicit arguments win.
    pub fn parse_from_env_and_args(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut flags = match std::env::var("CPN_FLAGS") {
            Ok(extra) => shellwords::split(&extra).context("malformed CPN_FLAGS")?,
            Err(_) => Vec::new(),
        };
        flags.extend(args);
        Self::parse_from_args(&flags)
    }

    pub fn parse_from_args(flags: &[String]) -> Result<Self> {
        let matches = make_options_parser().try_get_matches_from(flags.iter())?;

        let strings = |id: &str| -> Vec<String> {
            matches
                .get_many::<String>(id)
                .map(|values| values.cloned().collect())
                .unwrap_or_default()
        };
        let switch = |on: &str, off: &str| {
            if matches.get_flag(on) {
                Some(true)
            } else if matches.get_flag(off) {
                Some(false)
            } else {
                None
            }
        };
        let unmatched_output = switch("lenient", "strict").map(|lenient| {
            if lenient {
                OutputPolicy::Drop
            } else {
                OutputPolicy::Strict
            }
        });
        let report = match matches.get_one::<String>("report").map(String::as_str) {
            Some("json") => ReportFormat::Json,
            _ => ReportFormat::Text,
        };

        Ok(Options {
            net: matches.get_one::<PathBuf>("net").cloned(),
            config: matches
                .get_one::<PathBuf>("config")
                .cloned()
                .unwrap_or_else(|| PathBuf::from("cpn.toml")),
            places: strings("places"),
            sequence: strings("sequence"),
            random: matches.get_one::<usize>("random").copied(),
            seed: matches.get_one::<u64>("seed").copied(),
            stop_on_forbidden: switch("stop", "no_stop"),
            unmatched_output,
            save_net: matches.get_one::<PathBuf>("save_net").cloned(),
            diagnostics: matches.get_one::<PathBuf>("diagnostics").cloned(),
            report,
        })
    }

    /// Command-line values take precedence over the configuration file.
    pub fn apply(&self, config: &mut SimConfig) {
        if let Some(stop) = self.stop_on_forbidden {
            config.stop_on_first_forbidden = stop;
        }
        if let Some(policy) = self.unmatched_output {
            config.unmatched_output = policy;
        }
        if let Some(length) = self.random {
            config.sequence_length = length;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
    }

    pub fn net_spec(&self) -> Result<NetSpec> {
        let initial = parse_places(self.places.as_slice())?;
        match &self.net {
            Some(path) => {
                let spec = read_spec(path)
                    .with_context(|| format!("Failed to load net description: {:?}", path))?;
                if self.places.is_empty() {
                    Ok(spec)
                } else {
                    Ok(spec.with_initial_tokens(initial)?)
                }
            }
            None if self.places.is_empty() => {
                bail!("no initial places given; pass --places or a --net file")
            }
            None => Ok(NetSpec::relay(initial)),
        }
    }

    /// Builds the net, saving its description first when `--save-net` is set.
    pub fn load_net(&self, config: &SimConfig) -> Result<Net> {
        let spec = self.net_spec()?;
        if let Some(path) = &self.save_net {
            write_spec(path, &spec)
                .with_context(|| format!("Failed to save net description: {:?}", path))?;
        }
        Ok(spec.build(config.unmatched_output)?)
    }

    /// Logs the connectivity diagnostics and writes them to `--diagnostics`.
    pub fn report_diagnostics(&self, net: &Net) -> Result<()> {
        net.log_diagnostics();
        if let Some(path) = &self.diagnostics {
            net.diagnose_connectivity()
                .save_to_file(path)
                .with_context(|| format!("Failed to write diagnostics: {:?}", path))?;
        }
        Ok(())
    }

    pub fn sequence_source(&self, config: &SimConfig) -> Box<dyn SequenceSource> {
        if self.sequence.is_empty() {
            Box::new(RandomSequence::new(config.sequence_length, config.seed))
        } else {
            Box::new(FixedSequence(self.sequence.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(flags: &[&str]) -> Vec<String> {
        flags.iter().map(|flag| flag.to_string()).collect()
    }

    #[test]
    fn test_parse_from_str() {
        let options = Options::parse_from_str(
            "--places '(red,blue)' '()' '()' '()' --sequence t1 t2 --stop-on-forbidden",
        )
        .unwrap();
        assert_eq!(options.places, vec!["(red,blue)", "()", "()", "()"]);
        assert_eq!(options.sequence, vec!["t1", "t2"]);
        assert_eq!(options.stop_on_forbidden, Some(true));
        assert_eq!(options.unmatched_output, None);
        assert_eq!(options.report, ReportFormat::Text);
        assert_eq!(options.config, PathBuf::from("cpn.toml"));
    }

    #[test]
    fn test_parse_from_args_err() {
        assert!(Options::parse_from_args(&args(&["--report", "xml"])).is_err());
        assert!(Options::parse_from_args(&args(&["-s", "t1", "-r", "3"])).is_err());
    }

    #[test]
    fn command_line_overrides_config() {
        let options = Options::parse_from_args(&args(&[
            "-p", "()", "--random", "4", "--seed", "9", "--lenient",
        ]))
        .unwrap();
        let mut config = SimConfig::default();
        options.apply(&mut config);
        assert_eq!(config.sequence_length, 4);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.unmatched_output, OutputPolicy::Drop);
        assert!(!config.stop_on_first_forbidden);
    }

    #[test]
    fn negative_flags_override_config() {
        let mut config = SimConfig::from_toml_str(
            "stop_on_first_forbidden = true\nunmatched_output = \"drop\"\n",
        )
        .unwrap();
        let options =
            Options::parse_from_args(&args(&["--no-stop-on-forbidden", "--strict"])).unwrap();
        options.apply(&mut config);
        assert!(!config.stop_on_first_forbidden);
        assert_eq!(config.unmatched_output, OutputPolicy::Strict);
    }

    #[test]
    fn last_of_opposing_flags_wins() {
        let options =
            Options::parse_from_args(&args(&["--stop-on-forbidden", "--no-stop-on-forbidden"]))
                .unwrap();
        assert_eq!(options.stop_on_forbidden, Some(false));
        let options = Options::parse_from_args(&args(&["--strict", "--lenient"])).unwrap();
        assert_eq!(options.unmatched_output, Some(OutputPolicy::Drop));
    }

    #[test]
    fn missing_places_and_net_is_an_error() {
        let options = Options::parse_from_args(&[]).unwrap();
        assert!(options.net_spec().is_err());
    }

    #[test]
    fn malformed_places_surface_before_building() {
        let options = Options::parse_from_args(&args(&["-p", "(red", "()"])).unwrap();
        let err = options.net_spec().unwrap_err();
        assert!(err.to_string().contains("(red"));
    }

    #[test]
    fn places_alone_select_the_relay_net() {
        let options = Options::parse_from_args(&args(&["-p", "(red,blue)", "()", "()", "()"])).unwrap();
        let net = options.load_net(&SimConfig::default()).unwrap();
        assert_eq!(net.transition_names().collect::<Vec<_>>(), vec!["t1", "t2"]);
    }
}
