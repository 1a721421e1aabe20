use std::str::FromStr;

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use kvbench_driver::KvClient;
use log::info;

use crate::error::{BenchError, Result};
use crate::mock::{MemStore, MockServer};
use crate::{SequentialBench, Slice, TimerBench, TimerCommand};

pub const DEFAULT_ADDRESS: &str = "127.0.0.1:6379";

pub fn app<'a, 'b>() -> App<'a, 'b> {
    let target = [
        Arg::with_name("address")
            .short("a")
            .long("address")
            .takes_value(true)
            .default_value(DEFAULT_ADDRESS)
            .help("Server address as host:port"),
        Arg::with_name("mock")
            .long("mock")
            .help("Benchmark an in-process mock server instead of --address"),
    ];

    App::new("kvbench")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Latency and throughput micro-benchmarks for RESP key-value stores")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("timer")
                .about("Time repeated calls on one key, trial by trial")
                .args(&target)
                .arg(
                    Arg::with_name("command")
                        .short("c")
                        .long("command")
                        .takes_value(true)
                        .possible_values(&["get", "set", "rpush"])
                        .case_insensitive(true)
                        .default_value("get")
                        .help("Command repeated in each trial"),
                )
                .arg(
                    Arg::with_name("key")
                        .short("k")
                        .long("key")
                        .takes_value(true)
                        .default_value("0"),
                )
                .arg(
                    Arg::with_name("value")
                        .long("value")
                        .takes_value(true)
                        .default_value("bar")
                        .help("Value written by set and rpush"),
                )
                .arg(
                    Arg::with_name("number")
                        .short("n")
                        .long("number")
                        .takes_value(true)
                        .default_value("20000")
                        .help("Calls per trial"),
                )
                .arg(
                    Arg::with_name("repeat")
                        .short("r")
                        .long("repeat")
                        .takes_value(true)
                        .default_value("10")
                        .help("Number of trials"),
                )
                .arg(
                    Arg::with_name("seed")
                        .long("seed")
                        .takes_value(true)
                        .help("SET the key to this value before the first trial"),
                ),
        )
        .subcommand(
            SubCommand::with_name("sequential")
                .about("Fill a list, then time a loop of LRANGE calls")
                .args(&target)
                .arg(
                    Arg::with_name("key")
                        .short("k")
                        .long("key")
                        .takes_value(true)
                        .default_value("list"),
                )
                .arg(
                    Arg::with_name("fill")
                        .long("fill")
                        .takes_value(true)
                        .default_value("100")
                        .help("Elements pushed before timing"),
                )
                .arg(
                    Arg::with_name("iterations")
                        .short("n")
                        .long("iterations")
                        .takes_value(true)
                        .default_value("10000")
                        .help("Timed LRANGE calls"),
                )
                .arg(
                    Arg::with_name("start")
                        .long("start")
                        .takes_value(true)
                        .allow_hyphen_values(true)
                        .default_value("0"),
                )
                .arg(
                    Arg::with_name("stop")
                        .long("stop")
                        .takes_value(true)
                        .allow_hyphen_values(true)
                        .default_value("50"),
                ),
        )
}

fn parse_arg<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T> {
    let value = matches
        .value_of(name)
        .ok_or_else(|| BenchError::InvalidConfig(format!("--{} is required", name)))?;
    value.parse().map_err(|_| {
        BenchError::InvalidConfig(format!("invalid value for --{}: {:?}", name, value))
    })
}

fn parse_positive(matches: &ArgMatches, name: &str) -> Result<usize> {
    match parse_arg::<usize>(matches, name)? {
        0 => Err(BenchError::InvalidConfig(format!(
            "--{} should be at least 1",
            name
        ))),
        n => Ok(n),
    }
}

/// Where the benchmark connects.
#[derive(Clone, Debug, PartialEq)]
pub enum Target {
    Address(String),
    /// Spawn a `MockServer` on an ephemeral loopback port.
    Mock,
}

impl Target {
    fn from_matches(matches: &ArgMatches) -> Result<Target> {
        if matches.is_present("mock") {
            return Ok(Target::Mock);
        }
        let address: String = parse_arg(matches, "address")?;
        Ok(Target::Address(address))
    }

    pub fn connect(&self) -> Result<KvClient> {
        let address = match self {
            Target::Address(address) => address.clone(),
            Target::Mock => {
                let server = MockServer::new("127.0.0.1:0", MemStore::new())?;
                server.spawn()?.to_string()
            }
        };

        info!("Connecting to {}", address);
        Ok(KvClient::connect(&address)?)
    }
}

#[derive(Clone, Debug)]
pub struct TimerConfig {
    pub target: Target,
    pub bench: TimerBench,
}

impl TimerConfig {
    pub fn from_matches(matches: &ArgMatches) -> Result<TimerConfig> {
        let key: String = parse_arg(matches, "key")?;
        let value: String = parse_arg(matches, "value")?;
        let command: TimerCommand = parse_arg(matches, "command")?;
        Ok(TimerConfig {
            target: Target::from_matches(matches)?,
            bench: TimerBench {
                command,
                key: Slice::from(key),
                value: Slice::from(value),
                number: parse_positive(matches, "number")?,
                repeat: parse_positive(matches, "repeat")?,
                seed: matches.value_of("seed").map(Slice::from),
            },
        })
    }
}

#[derive(Clone, Debug)]
pub struct SequentialConfig {
    pub target: Target,
    pub bench: SequentialBench,
}

impl SequentialConfig {
    pub fn from_matches(matches: &ArgMatches) -> Result<SequentialConfig> {
        let key: String = parse_arg(matches, "key")?;
        Ok(SequentialConfig {
            target: Target::from_matches(matches)?,
            bench: SequentialBench {
                key: Slice::from(key),
                fill: parse_arg(matches, "fill")?,
                iterations: parse_positive(matches, "iterations")?,
                start: parse_arg(matches, "start")?,
                stop: parse_arg(matches, "stop")?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvbench_driver::Commands;

    fn timer(args: &[&str]) -> Result<TimerConfig> {
        let mut argv = vec!["kvbench", "timer"];
        argv.extend_from_slice(args);
        let matches = app().get_matches_from_safe(argv)?;
        TimerConfig::from_matches(matches.subcommand_matches("timer").unwrap())
    }

    fn sequential(args: &[&str]) -> Result<SequentialConfig> {
        let mut argv = vec!["kvbench", "sequential"];
        argv.extend_from_slice(args);
        let matches = app().get_matches_from_safe(argv)?;
        SequentialConfig::from_matches(matches.subcommand_matches("sequential").unwrap())
    }

    #[test]
    fn timer_defaults() {
        let config = timer(&[]).unwrap();
        assert_eq!(config.target, Target::Address(String::from(DEFAULT_ADDRESS)));
        assert_eq!(config.bench.key, Slice::from("0"));
        assert_eq!(config.bench.number, 20000);
        assert_eq!(config.bench.repeat, 10);
        assert_eq!(config.bench.seed, None);
        assert_eq!(config.bench.command, TimerCommand::Get);
        assert_eq!(config.bench.value, Slice::from("bar"));
    }

    #[test]
    fn timer_command_and_value() {
        let config = timer(&["-c", "rpush", "--value", "x"]).unwrap();
        assert_eq!(config.bench.command, TimerCommand::Rpush);
        assert_eq!(config.bench.value, Slice::from("x"));

        let config = timer(&["--command", "SET"]).unwrap();
        assert_eq!(config.bench.command, TimerCommand::Set);
    }

    #[test]
    fn unknown_timer_command_is_rejected() {
        match timer(&["-c", "lrange"]) {
            Err(BenchError::ArgumentError(_)) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn sequential_defaults() {
        let config = sequential(&[]).unwrap();
        let defaults = SequentialBench::default();
        assert_eq!(config.bench.key, defaults.key);
        assert_eq!(config.bench.fill, 100);
        assert_eq!(config.bench.iterations, 10_000);
        assert_eq!((config.bench.start, config.bench.stop), (0, 50));
    }

    #[test]
    fn timer_overrides() {
        let config = timer(&[
            "-a", "10.0.0.1:7000", "-k", "hot", "-n", "5", "-r", "2", "--seed", "v",
        ])
        .unwrap();
        assert_eq!(config.target, Target::Address(String::from("10.0.0.1:7000")));
        assert_eq!(config.bench.key, Slice::from("hot"));
        assert_eq!(config.bench.number, 5);
        assert_eq!(config.bench.repeat, 2);
        assert_eq!(config.bench.seed, Some(Slice::from("v")));
    }

    #[test]
    fn negative_bounds_and_mock() {
        let config = sequential(&["--mock", "--start", "-10", "--stop", "-1"]).unwrap();
        assert_eq!(config.target, Target::Mock);
        assert_eq!((config.bench.start, config.bench.stop), (-10, -1));
    }

    #[test]
    fn zero_repeat_is_rejected() {
        match timer(&["-r", "0"]) {
            Err(BenchError::InvalidConfig(_)) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn non_numeric_count_is_rejected() {
        match sequential(&["-n", "many"]) {
            Err(BenchError::InvalidConfig(message)) => assert!(message.contains("iterations")),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn mock_target_connects() {
        let mut client = Target::Mock.connect().unwrap();
        assert_eq!(client.get(&Slice::from("0")).unwrap(), None);
    }
}
