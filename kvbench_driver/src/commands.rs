use kvbench_protocol::Slice;

use super::error::Result;

/// The remote operations the benchmarks rely on.
///
/// `KvClient` talks to a real server; tests plug in recorders and fakes.
pub trait Commands {
    fn get(&mut self, key: &Slice) -> Result<Option<Slice>>;

    fn set(&mut self, key: &Slice, value: &Slice) -> Result<()>;

    /// Appends `value` to the tail of the list and returns the new length.
    fn rpush(&mut self, key: &Slice, value: &Slice) -> Result<i64>;

    /// `start` and `stop` are inclusive; negative values count from the tail.
    fn lrange(&mut self, key: &Slice, start: i64, stop: i64) -> Result<Vec<Slice>>;

    fn flushdb(&mut self) -> Result<()>;
}

impl<C: Commands + ?Sized> Commands for &mut C {
    fn get(&mut self, key: &Slice) -> Result<Option<Slice>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &Slice, value: &Slice) -> Result<()> {
        (**self).set(key, value)
    }

    fn rpush(&mut self, key: &Slice, value: &Slice) -> Result<i64> {
        (**self).rpush(key, value)
    }

    fn lrange(&mut self, key: &Slice, start: i64, stop: i64) -> Result<Vec<Slice>> {
        (**self).lrange(key, start, stop)
    }

    fn flushdb(&mut self) -> Result<()> {
        (**self).flushdb()
    }
}
