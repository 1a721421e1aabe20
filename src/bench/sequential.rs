use std::fmt;
use std::time::Duration;

use kvbench_driver::{Commands, Result};
use kvbench_protocol::Slice;
use log::{debug, info};

use super::Clock;

/// Fills a list, times a burst of `LRANGE` calls against it, then flushes the
/// database.
#[derive(Clone, Debug)]
pub struct SequentialBench {
    pub key: Slice,
    /// The list receives `0..fill`, appended in ascending order.
    pub fill: usize,
    pub iterations: usize,
    pub start: i64,
    pub stop: i64,
}

impl Default for SequentialBench {
    fn default() -> Self {
        SequentialBench {
            key: Slice::from("list"),
            fill: 100,
            iterations: 10_000,
            start: 0,
            stop: 50,
        }
    }
}

impl SequentialBench {
    /// Only the `LRANGE` loop is timed. Any error returns immediately, so a
    /// failed run leaves its data behind.
    pub fn run<S: Commands, C: Clock>(&self, store: &mut S, clock: C) -> Result<SequentialReport> {
        for value in 0..self.fill {
            store.rpush(&self.key, &Slice::from(value as i64))?;
        }
        debug!("populated {:?} with {} elements", self.key, self.fill);

        info!(
            "LRANGE {:?} {} {}: {} calls",
            self.key, self.start, self.stop, self.iterations
        );
        let start = clock.now();
        for _ in 0..self.iterations {
            store.lrange(&self.key, self.start, self.stop)?;
        }
        let elapsed = clock.now().checked_sub(start).unwrap_or_default();

        store.flushdb()?;

        Ok(SequentialReport {
            iterations: self.iterations,
            start: self.start,
            stop: self.stop,
            elapsed,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SequentialReport {
    pub iterations: usize,
    pub start: i64,
    pub stop: i64,
    pub elapsed: Duration,
}

impl fmt::Display for SequentialReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} LRANGE {} {} calls, real {:.4} sec",
            self.iterations,
            self.start,
            self.stop,
            self.elapsed.as_secs_f64()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bench::tests::StepClock;
    use kvbench_driver::ClientError;
    use std::cell::RefCell;

    #[derive(Debug, PartialEq)]
    enum Event {
        Rpush(Slice, Slice),
        Lrange(Slice, i64, i64),
        Flush,
        ClockRead,
    }

    /// Records store calls and clock reads into one ordered log.
    struct Recorder<'a> {
        log: &'a RefCell<Vec<Event>>,
        fail_on_lrange: Option<usize>,
        lranges: usize,
    }

    impl<'a> Commands for Recorder<'a> {
        fn get(&mut self, _key: &Slice) -> Result<Option<Slice>> {
            unreachable!()
        }

        fn set(&mut self, _key: &Slice, _value: &Slice) -> Result<()> {
            unreachable!()
        }

        fn rpush(&mut self, key: &Slice, value: &Slice) -> Result<i64> {
            let mut log = self.log.borrow_mut();
            log.push(Event::Rpush(key.clone(), value.clone()));
            Ok(log.len() as i64)
        }

        fn lrange(&mut self, key: &Slice, start: i64, stop: i64) -> Result<Vec<Slice>> {
            if Some(self.lranges) == self.fail_on_lrange {
                return Err(ClientError::OperationError(
                    "LRANGE",
                    String::from("ERR connection lost"),
                ));
            }
            self.lranges += 1;
            self.log
                .borrow_mut()
                .push(Event::Lrange(key.clone(), start, stop));
            Ok(Vec::new())
        }

        fn flushdb(&mut self) -> Result<()> {
            self.log.borrow_mut().push(Event::Flush);
            Ok(())
        }
    }

    struct RecordingClock<'a> {
        log: &'a RefCell<Vec<Event>>,
        inner: StepClock,
    }

    impl<'a> Clock for RecordingClock<'a> {
        fn now(&self) -> Duration {
            self.log.borrow_mut().push(Event::ClockRead);
            self.inner.now()
        }
    }

    fn recorder(log: &RefCell<Vec<Event>>, fail_on_lrange: Option<usize>) -> Recorder {
        Recorder {
            log,
            fail_on_lrange,
            lranges: 0,
        }
    }

    fn clock(log: &RefCell<Vec<Event>>) -> RecordingClock {
        RecordingClock {
            log,
            inner: StepClock::new(Duration::from_millis(1500)),
        }
    }

    #[test]
    fn default_run_sequence() {
        let log = RefCell::new(Vec::new());
        let mut store = recorder(&log, None);

        let report = SequentialBench::default()
            .run(&mut store, clock(&log))
            .unwrap();
        let log = log.into_inner();

        assert_eq!(log.len(), 100 + 1 + 10_000 + 1 + 1);
        for (i, event) in log[..100].iter().enumerate() {
            assert_eq!(
                *event,
                Event::Rpush(Slice::from("list"), Slice::from(i.to_string()))
            );
        }
        assert_eq!(log[100], Event::ClockRead);
        for event in &log[101..10_101] {
            assert_eq!(*event, Event::Lrange(Slice::from("list"), 0, 50));
        }
        assert_eq!(log[10_101], Event::ClockRead);
        assert_eq!(log[10_102], Event::Flush);

        assert_eq!(
            report,
            SequentialReport {
                iterations: 10_000,
                start: 0,
                stop: 50,
                elapsed: Duration::from_millis(1500),
            }
        );
        assert_eq!(
            report.to_string(),
            "10000 LRANGE 0 50 calls, real 1.5000 sec"
        );
    }

    #[test]
    fn failure_skips_flush() {
        let log = RefCell::new(Vec::new());
        let mut store = recorder(&log, Some(4));
        let bench = SequentialBench {
            fill: 3,
            iterations: 10,
            ..SequentialBench::default()
        };

        match bench.run(&mut store, clock(&log)) {
            Err(ClientError::OperationError("LRANGE", _)) => {}
            other => panic!("unexpected result {:?}", other),
        }

        let log = log.into_inner();
        assert!(!log.contains(&Event::Flush));
        let lranges = log
            .iter()
            .filter(|e| match e {
                Event::Lrange(..) => true,
                _ => false,
            })
            .count();
        assert_eq!(lranges, 4);
        // started timing, never stopped
        assert_eq!(log.iter().filter(|e| **e == Event::ClockRead).count(), 1);
    }

    #[test]
    fn custom_bounds_and_key() {
        let log = RefCell::new(Vec::new());
        let mut store = recorder(&log, None);
        let bench = SequentialBench {
            key: Slice::from("bench:list"),
            fill: 2,
            iterations: 3,
            start: -2,
            stop: -1,
        };

        let report = bench.run(&mut store, clock(&log)).unwrap();
        let log = log.into_inner();

        assert_eq!(report.iterations, 3);
        assert_eq!(
            log[3],
            Event::Lrange(Slice::from("bench:list"), -2, -1)
        );
        assert_eq!(log.last(), Some(&Event::Flush));
    }
}
