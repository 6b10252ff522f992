//! I/O sinks
//!
//! Index structures describe the node and page accesses of an operation to
//! an `IoSink` instead of talking to the disk directly. `Charger` bills the
//! accesses to a disk and sums the elapsed time; `Discard` drops them, which
//! is how a topology is fast-forwarded without cost.

use crate::device::{AccessPattern, Disk};

/// Receiver of page accesses
pub trait IoSink {
    fn read(&mut self, pages: u64, pattern: AccessPattern);

    fn write(&mut self, pages: u64, pattern: AccessPattern);

    fn overwrite(&mut self, pages: u64, pattern: AccessPattern);

    fn free(&mut self, pages: u64);

    /// Replay the accesses issued by `f` `times` times
    fn repeat<F>(&mut self, times: u64, mut f: F)
    where
        Self: Sized,
        F: FnMut(&mut Self),
    {
        for _ in 0..times {
            f(self);
        }
    }
}

/// Bills every access to a disk
pub struct Charger<'a> {
    disk: &'a mut Disk,
    elapsed: f64,
}

impl<'a> Charger<'a> {
    pub fn new(disk: &'a mut Disk) -> Self {
        Self { disk, elapsed: 0.0 }
    }

    /// Time billed so far (microseconds)
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }
}

impl IoSink for Charger<'_> {
    fn read(&mut self, pages: u64, pattern: AccessPattern) {
        self.elapsed += self.disk.read_pages(pages, pattern);
    }

    fn write(&mut self, pages: u64, pattern: AccessPattern) {
        self.elapsed += self.disk.write_pages(pages, pattern);
    }

    fn overwrite(&mut self, pages: u64, pattern: AccessPattern) {
        self.elapsed += self.disk.overwrite_pages(pages, pattern);
    }

    fn free(&mut self, pages: u64) {
        self.elapsed += self.disk.free_pages(pages);
    }
}

/// Drops every access
pub struct Discard;

impl IoSink for Discard {
    fn read(&mut self, _pages: u64, _pattern: AccessPattern) {}

    fn write(&mut self, _pages: u64, _pattern: AccessPattern) {}

    fn overwrite(&mut self, _pages: u64, _pattern: AccessPattern) {}

    fn free(&mut self, _pages: u64) {}

    fn repeat<F>(&mut self, _times: u64, _f: F)
    where
        Self: Sized,
        F: FnMut(&mut Self),
    {
    }
}
