use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use kvbench_driver::{Commands, Result};
use kvbench_protocol::Slice;
use log::{debug, info};

use super::{throughput, Clock};

/// Runs an operation `number` times per trial for `repeat` trials and records
/// the elapsed time of each trial.
pub struct Timer<C: Clock> {
    clock: C,
}

impl<C: Clock> Timer<C> {
    pub fn new(clock: C) -> Timer<C> {
        Timer { clock }
    }

    /// The first error returned by `op` aborts the run. Trials finished before
    /// it are discarded.
    pub fn repeat<F, E>(
        &self,
        repeat: usize,
        number: usize,
        mut op: F,
    ) -> std::result::Result<TimerReport, E>
    where
        F: FnMut() -> std::result::Result<(), E>,
    {
        let mut trials = Vec::with_capacity(repeat);
        for trial in 0..repeat {
            let start = self.clock.now();
            for _ in 0..number {
                op()?;
            }
            let elapsed = self.clock.now().checked_sub(start).unwrap_or_default();
            debug!("trial {} took {:?}", trial, elapsed);
            trials.push(elapsed);
        }

        Ok(TimerReport { number, trials })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TimerReport {
    number: usize,
    trials: Vec<Duration>,
}

impl TimerReport {
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn trials(&self) -> &[Duration] {
        &self.trials
    }

    pub fn trial_throughputs(&self) -> Vec<f64> {
        self.trials
            .iter()
            .map(|elapsed| throughput(self.number, *elapsed))
            .collect()
    }

    pub fn total(&self) -> Duration {
        self.trials.iter().sum()
    }

    /// Mean trial time in seconds.
    pub fn mean_secs(&self) -> f64 {
        if self.trials.is_empty() {
            return 0.0;
        }
        self.total().as_secs_f64() / self.trials.len() as f64
    }

    /// `number / mean`, not the mean of the per-trial throughputs.
    pub fn average_throughput(&self) -> f64 {
        self.number as f64 / self.mean_secs()
    }
}

impl fmt::Display for TimerReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for elapsed in &self.trials {
            writeln!(
                f,
                "{:.2} op/sec, real {:.4} sec",
                throughput(self.number, *elapsed),
                elapsed.as_secs_f64()
            )?;
        }
        writeln!(
            f,
            "avg {:.2} op/sec, real {:.4} sec",
            self.average_throughput(),
            self.mean_secs()
        )?;
        write!(f, "tot {:.4} sec", self.total().as_secs_f64())
    }
}

/// The command a `TimerBench` repeats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerCommand {
    Get,
    Set,
    Rpush,
}

impl TimerCommand {
    pub fn name(self) -> &'static str {
        match self {
            TimerCommand::Get => "GET",
            TimerCommand::Set => "SET",
            TimerCommand::Rpush => "RPUSH",
        }
    }
}

impl Default for TimerCommand {
    fn default() -> Self {
        TimerCommand::Get
    }
}

impl FromStr for TimerCommand {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<TimerCommand, String> {
        match s.to_lowercase().as_ref() {
            "get" => Ok(TimerCommand::Get),
            "set" => Ok(TimerCommand::Set),
            "rpush" => Ok(TimerCommand::Rpush),
            _ => Err(format!("unknown timer command {:?}", s)),
        }
    }
}

/// `command key [value]`, `number` times per trial, `repeat` trials.
#[derive(Clone, Debug)]
pub struct TimerBench {
    pub command: TimerCommand,
    pub key: Slice,
    /// Written by `SET` and `RPUSH`; ignored by `GET`.
    pub value: Slice,
    pub number: usize,
    pub repeat: usize,
    /// Stored under `key` before the first trial, outside the measurement.
    pub seed: Option<Slice>,
}

impl Default for TimerBench {
    fn default() -> Self {
        TimerBench {
            command: TimerCommand::Get,
            key: Slice::from("0"),
            value: Slice::from("bar"),
            number: 20000,
            repeat: 10,
            seed: None,
        }
    }
}

impl TimerBench {
    pub fn run<S: Commands, C: Clock>(&self, store: &mut S, clock: C) -> Result<TimerReport> {
        if let Some(seed) = &self.seed {
            store.set(&self.key, seed)?;
            debug!("seeded {:?}", self.key);
        }

        info!(
            "{} {:?}: {} trials of {} calls",
            self.command.name(),
            self.key,
            self.repeat,
            self.number
        );
        let (key, value) = (&self.key, &self.value);
        let timer = Timer::new(clock);
        match self.command {
            TimerCommand::Get => {
                timer.repeat(self.repeat, self.number, || store.get(key).map(|_| ()))
            }
            TimerCommand::Set => timer.repeat(self.repeat, self.number, || store.set(key, value)),
            TimerCommand::Rpush => timer.repeat(self.repeat, self.number, || {
                store.rpush(key, value).map(|_| ())
            }),
        }
    }
}
