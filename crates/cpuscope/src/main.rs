//! cpuscope - CPU inventory for Linux hosts.
//!
//! Takes one snapshot of `/proc/cpuinfo`, `/proc/stat` and the sysfs CPU
//! tree, then prints it per package and per logical processor.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{Level, debug, info, warn};
use tracing_subscriber::EnvFilter;

use cpuscope_core::collector::{RealFs, SourcePaths};
use cpuscope_core::models::CpuUsage;
use cpuscope_core::{CacheKind, CpuDevice};

/// CPU inventory snapshot.
#[derive(Parser)]
#[command(name = "cpuscope", about = "CPU inventory snapshot", version)]
struct Args {
    /// Path to /proc filesystem (for host mounts or captured trees).
    #[arg(long, default_value = SourcePaths::DEFAULT_PROC_PATH)]
    proc_path: PathBuf,

    /// Directory holding the cpu<N> sysfs nodes.
    #[arg(long, default_value = SourcePaths::DEFAULT_SYS_CPU_PATH)]
    sys_cpu_path: PathBuf,

    /// Millidegree temperature input read for every package.
    #[arg(long, default_value = SourcePaths::DEFAULT_TEMPERATURE_INPUT)]
    temperature_input: PathBuf,

    /// Print the snapshot as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Also print why fields came back empty (text mode).
    #[arg(long)]
    diagnostics: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for target in ["cpuscope", "cpuscope_core"] {
        match format!("{}={}", target, level).parse() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(e) => eprintln!("invalid log directive for {}: {}", target, e),
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Busy share of `usage` as a percentage, or "-" before any tick.
fn format_busy(usage: &CpuUsage) -> String {
    if usage.total == 0 {
        return "-".to_string();
    }
    format!("{:.1}%", usage.busy() as f64 * 100.0 / usage.total as f64)
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

fn write_text(out: &mut impl Write, device: &CpuDevice, with_diagnostics: bool) -> io::Result<()> {
    for package in 0..device.physical_count() {
        writeln!(out, "Package {}", package)?;
        writeln!(out, "  vendor:       {}", or_dash(device.vendor(package)))?;
        writeln!(out, "  model:        {}", or_dash(device.model(package)))?;
        writeln!(out, "  architecture: {}", or_dash(device.architecture(package)))?;
        writeln!(out, "  cores:        {}", device.core_count(package))?;
        writeln!(out, "  threads:      {}", device.thread_count(package))?;
        writeln!(out, "  temperature:  {}", or_dash(device.temperature(package)))?;
        writeln!(out, "  busy:         {}", format_busy(&device.usage()))?;
        writeln!(out)?;
    }

    writeln!(
        out,
        "{:>4} {:>4} {:>4} {:>12} {:>10} {:>10} {:>10} {:>7}",
        "CPU", "PKG", "CORE", "CUR", "MIN", "MAX", "CACHE", "BUSY"
    )?;
    for cpu in 0..device.processor_count() {
        writeln!(
            out,
            "{:>4} {:>4} {:>4} {:>12} {:>10} {:>10} {:>10} {:>7}",
            cpu,
            device.physical_id(cpu),
            device.core_id(cpu),
            or_dash(device.current_freq(cpu)),
            or_dash(device.min_freq(cpu)),
            or_dash(device.max_freq(cpu)),
            or_dash(device.cache(cpu, CacheKind::All)),
            format_busy(&device.processor_usage(cpu)),
        )?;
    }

    if with_diagnostics && !device.diagnostics().is_empty() {
        writeln!(out)?;
        writeln!(out, "Diagnostics:")?;
        for diagnostic in device.diagnostics() {
            writeln!(out, "  {}", diagnostic)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let paths = SourcePaths::default()
        .with_proc_path(&args.proc_path)
        .with_sys_cpu_path(&args.sys_cpu_path)
        .with_temperature_input(&args.temperature_input);
    debug!(
        "Config: proc={}, sys_cpu={}, temperature={}",
        paths.proc_path.display(),
        paths.sys_cpu_path.display(),
        paths.temperature_input.display()
    );

    let device = CpuDevice::collect(RealFs::new(), &paths);
    info!(
        "Collected {} processors in {} packages ({} diagnostics)",
        device.processor_count(),
        device.physical_count(),
        device.diagnostics().len()
    );
    if device.processor_count() == 0 {
        warn!("No processors found; check --proc-path");
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = if args.json {
        serde_json::to_writer_pretty(&mut out, &device)
            .map_err(io::Error::from)
            .and_then(|()| writeln!(out))
    } else {
        write_text(&mut out, &device, args.diagnostics)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("cpuscope: failed to write output: {}", e);
            ExitCode::FAILURE
        }
    }
}
