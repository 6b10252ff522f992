//! Report output and parallel evaluation
//!
//! Independent jobs (a workload plus the indexes it drives) run on scoped
//! worker threads. Jobs share nothing but the report sink, whose lock is
//! held only while one finished report is written.
//!
//! ```text
//!   job 0 ──► worker ──┐
//!   job 1 ──► worker ──┼──► ReportSink (Mutex<W>) ──► stdout / file
//!   job 2 ──► worker ──┘
//! ```

use std::io::Write;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::{Result, SimError};
use crate::index::Index;
use crate::workload::{Workload, WorkloadReport};

// =============================================================================
// Report Sink
// =============================================================================

/// Output format of a report sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Table,
    Json,
}

/// Writer shared by all workers
pub struct ReportSink<W: Write> {
    writer: Mutex<W>,
    format: ReportFormat,
}

impl<W: Write> ReportSink<W> {
    pub fn new(writer: W) -> Self {
        Self::with_format(writer, ReportFormat::Table)
    }

    pub fn with_format(writer: W, format: ReportFormat) -> Self {
        Self {
            writer: Mutex::new(writer),
            format,
        }
    }

    pub fn format(&self) -> ReportFormat {
        self.format
    }

    /// Write a report in the sink's format
    pub fn emit(&self, report: &WorkloadReport) -> Result<()> {
        match self.format {
            ReportFormat::Table => self.emit_table(report),
            ReportFormat::Json => self.emit_json(report),
        }
    }

    pub fn emit_table(&self, report: &WorkloadReport) -> Result<()> {
        let block = report.to_string();
        let mut writer = self.writer.lock();
        writeln!(writer, "{}", block)?;
        writer.flush()?;
        Ok(())
    }

    pub fn emit_json(&self, report: &WorkloadReport) -> Result<()> {
        let block = report.to_json()?;
        let mut writer = self.writer.lock();
        writeln!(writer, "{}", block)?;
        writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

// =============================================================================
// Parallel Evaluation
// =============================================================================

/// A workload and the indexes it runs on
#[derive(Debug, Clone)]
pub struct Job {
    pub workload: Workload,
    pub indexes: Vec<Index>,
}

impl Job {
    pub fn new(workload: Workload, indexes: Vec<Index>) -> Self {
        Self { workload, indexes }
    }
}

/// Run every job on its own thread; reports come back in job order
pub fn run_parallel<W: Write + Send>(
    jobs: Vec<Job>,
    sink: &ReportSink<W>,
) -> Result<Vec<WorkloadReport>> {
    debug!(jobs = jobs.len(), "starting workers");

    let outcome = crossbeam::thread::scope(|scope| {
        let handles: Vec<_> = jobs
            .into_iter()
            .map(|mut job| {
                scope.spawn(move |_| -> Result<WorkloadReport> {
                    let report = job.workload.run(&mut job.indexes);
                    sink.emit(&report)?;
                    Ok(report)
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .map_err(|_| SimError::WorkerPanic("workload job".to_string()))?
            })
            .collect::<Result<Vec<_>>>()
    });

    outcome.map_err(|_| SimError::WorkerPanic("worker scope".to_string()))?
}
