//! indexsim Binary
//!
//! Runs one workload against the four index structures on one device and
//! prints the per-step costs.

use std::io;

use clap::{Parser, ValueEnum};
use indexsim::{
    run_parallel, BpTree, BpTreeConfig, BulkloadPolicy, DbTable, DeviceConfig, DeviceKind, Disk,
    FaConfig, FaTree, FalsmConfig, FalsmTree, Index, Job, LsmConfig, LsmTree, NandCell,
    ReportFormat, ReportSink, Result, Workload, WorkloadStep,
};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Device {
    Ssd,
    FtlSlc,
    FtlMlc,
    FtlTlc,
    RawSlc,
    RawMlc,
    RawTlc,
    Pcm,
}

impl Device {
    fn kind(self) -> DeviceKind {
        match self {
            Device::Ssd => DeviceKind::Ssd,
            Device::FtlSlc => DeviceKind::FtlFlash(NandCell::Slc),
            Device::FtlMlc => DeviceKind::FtlFlash(NandCell::Mlc),
            Device::FtlTlc => DeviceKind::FtlFlash(NandCell::Tlc),
            Device::RawSlc => DeviceKind::RawFlash(NandCell::Slc),
            Device::RawMlc => DeviceKind::RawFlash(NandCell::Mlc),
            Device::RawTlc => DeviceKind::RawFlash(NandCell::Tlc),
            Device::Pcm => DeviceKind::Pcm,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Table {
    Warehouse,
    District,
    Customer,
    History,
    NewOrder,
    Order,
    OrderLine,
    Item,
    Stock,
}

impl Table {
    fn table(self) -> DbTable {
        match self {
            Table::Warehouse => DbTable::warehouse(),
            Table::District => DbTable::district(),
            Table::Customer => DbTable::customer(),
            Table::History => DbTable::history(),
            Table::NewOrder => DbTable::new_order(),
            Table::Order => DbTable::order(),
            Table::OrderLine => DbTable::order_line(),
            Table::Item => DbTable::item(),
            Table::Stock => DbTable::stock(),
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Policy {
    Off,
    Current,
    Max,
}

impl From<Policy> for BulkloadPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Off => BulkloadPolicy::FeatureOff,
            Policy::Current => BulkloadPolicy::AccordingToCurrentCapacity,
            Policy::Max => BulkloadPolicy::AccordingToMaxCapacity,
        }
    }
}

/// indexsim
#[derive(Parser, Debug)]
#[command(name = "indexsim")]
#[command(about = "Cost simulator for index structures on storage media")]
#[command(version)]
struct Args {
    /// Storage device
    #[arg(short, long, value_enum, default_value = "ssd")]
    device: Device,

    /// TPC-C table whose rows are indexed
    #[arg(short, long, value_enum, default_value = "order-line")]
    table: Table,

    /// Entries placed without cost before the workload starts
    #[arg(long, default_value = "0")]
    preload: u64,

    /// Entries added through the bulk path
    #[arg(long, default_value = "0")]
    bulkload: u64,

    /// Single inserts
    #[arg(short, long, default_value = "100000")]
    inserts: u64,

    /// Point lookups
    #[arg(short, long, default_value = "1000")]
    point_searches: u64,

    /// Entries per range scan (0 disables range scans)
    #[arg(short, long, default_value = "0")]
    range_length: u64,

    /// Number of range scans
    #[arg(long, default_value = "1")]
    range_repeats: u64,

    /// Single deletes
    #[arg(long, default_value = "0")]
    deletes: u64,

    /// Head tree size in device pages
    #[arg(long, default_value = "10")]
    head_tree_pages: u64,

    /// Growth factor between levels
    #[arg(long, default_value = "10")]
    level_ratio: u64,

    /// FALSM overflow nodes per nominal node
    #[arg(long, default_value = "0.5")]
    capacity_ratio: f64,

    /// Bulkload policy of the LSM and FALSM trees
    #[arg(long, value_enum, default_value = "current")]
    bulkload_policy: Policy,

    /// B+Tree node size in bytes
    #[arg(long, default_value = "8192")]
    node_size: u64,

    /// Print reports as JSON
    #[arg(long)]
    json: bool,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,indexsim=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    tracing::info!("indexsim v{}", indexsim::VERSION);

    if let Err(e) = run(&args) {
        tracing::error!("Simulation failed: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let device = DeviceConfig::builder().kind(args.device.kind()).build();
    let template = Disk::from_config(&device)?;
    let table = args.table.table();

    tracing::info!("Device: {}", template.name());
    tracing::info!("Table: {}", table);

    let head_tree_size = args.head_tree_pages * template.page_size();
    let policy = BulkloadPolicy::from(args.bulkload_policy);

    let indexes: Vec<Index> = vec![
        BpTree::new(
            template.fresh_clone(),
            &table,
            BpTreeConfig::default()
                .node_size(args.node_size)
                .bulkload(true),
        )?
        .into(),
        LsmTree::new(
            template.fresh_clone(),
            &table,
            LsmConfig::default()
                .head_tree_size(head_tree_size)
                .level_ratio(args.level_ratio)
                .bulkload_policy(policy),
        )?
        .into(),
        FalsmTree::new(
            template.fresh_clone(),
            &table,
            FalsmConfig::default()
                .head_tree_size(head_tree_size)
                .level_ratio(args.level_ratio)
                .capacity_ratio(args.capacity_ratio)
                .bulkload_policy(policy),
        )?
        .into(),
        FaTree::new(
            template.fresh_clone(),
            &table,
            FaConfig::default()
                .head_tree_size(head_tree_size)
                .level_ratio(args.level_ratio),
        )?
        .into(),
    ];

    let workload = build_workload(args, &table);
    let jobs = indexes
        .into_iter()
        .map(|index| Job::new(workload.clone(), vec![index]))
        .collect();

    let format = if args.json {
        ReportFormat::Json
    } else {
        ReportFormat::Table
    };
    let sink = ReportSink::with_format(io::stdout(), format);
    let reports = run_parallel(jobs, &sink)?;

    for report in &reports {
        let Some(last) = report.steps.last() else {
            continue;
        };
        for counters in &last.results {
            tracing::info!(
                index = %counters.index,
                total_time = report.total_time(&counters.index),
                wear_out = report.total_wear_out(&counters.index),
                "index finished"
            );
        }
    }

    Ok(())
}

fn build_workload(args: &Args, table: &DbTable) -> Workload {
    let mut workload = Workload::new(table.to_string());

    if args.preload > 0 {
        workload.push(WorkloadStep::Topology(args.preload));
    }
    if args.bulkload > 0 {
        workload.push(WorkloadStep::Bulkload(args.bulkload));
    }
    if args.inserts > 0 {
        workload.push(WorkloadStep::Insert(args.inserts));
    }
    if args.point_searches > 0 {
        workload.push(WorkloadStep::PointSearch(args.point_searches));
    }
    if args.range_length > 0 {
        workload.push(WorkloadStep::RangeSearch {
            length: args.range_length,
            repeats: args.range_repeats,
        });
    }
    if args.deletes > 0 {
        workload.push(WorkloadStep::Delete(args.deletes));
    }

    workload
}
