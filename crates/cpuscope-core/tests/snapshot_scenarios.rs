//! End-to-end snapshots built through `CpuDevice::collect` over `MockFs`.

use chrono::Utc;
use cpuscope_core::collector::{CpuCollector, MockFs, SourcePaths};
use cpuscope_core::models::{CpuTimes, CpuUsage};
use cpuscope_core::{CacheKind, CpuDevice};

fn collect(fs: MockFs) -> CpuDevice {
    CpuDevice::collect(fs, &SourcePaths::default())
}

fn two_processor_fs(stat: &str) -> MockFs {
    let mut fs = MockFs::new();
    fs.add_file(
        "/proc/cpuinfo",
        "processor\t: 0\nphysical id\t: 0\ncore id\t\t: 0\ncpu cores\t: 2\n\n\
         processor\t: 1\nphysical id\t: 0\ncore id\t\t: 1\ncpu cores\t: 2\n\n",
    );
    fs.add_file("/proc/stat", stat);
    fs
}

#[test]
fn test_round_trip_two_blocks() {
    let device = collect(two_processor_fs(
        "cpu  30 2 9 400 5 1 1 0 0 0\n\
         cpu0 10 1 4 200 2 0 1 0 0 0\n\
         cpu1 20 1 5 200 3 1 0 7 8 9\n",
    ));

    assert_eq!(device.physical_count(), 1);
    assert_eq!(device.core_count(0), 2);
    assert_eq!(device.thread_count(0), 2);
    assert_eq!(
        device.processor_stat(1),
        CpuTimes {
            user: 20,
            nice: 1,
            system: 5,
            idle: 200,
            iowait: 3,
            irq: 1,
            softirq: 0,
            steal: 7,
            guest: 8,
            guest_nice: 9,
        }
    );
    assert_eq!(device.stat().user, 30);
}

#[test]
fn test_snapshot_is_timestamped_once() {
    let before = Utc::now();
    let device = collect(MockFs::single_socket_laptop());
    let after = Utc::now();

    let collected_at = device.collected_at();
    assert!(before <= collected_at && collected_at <= after);
    assert_eq!(device.collected_at(), collected_at);
}

#[test]
fn test_malformed_stat_truncates_at_short_line() {
    let device = collect(two_processor_fs(
        "cpu  30 2 9 400 5 1 1 0 0 0\n\
         cpu0 10 1 4 200 2 0 1 0 0 0\n\
         cpu1 20 1 5 200 3 1 0 0 0 0\n\
         cpu2 1 2 3 4\n\
         cpu3 1 1 1 1 1 1 1 1 1 1\n",
    ));

    assert_eq!(device.stat().user, 30);
    assert_eq!(device.processor_stat(0).user, 10);
    assert_eq!(device.processor_stat(1).user, 20);
    assert!(
        device
            .diagnostics()
            .iter()
            .any(|d| d.is_malformed() && d.concerns("/proc/stat"))
    );
}

#[test]
fn test_usage_identities_hold_for_every_processor() {
    for fs in [MockFs::single_socket_laptop(), MockFs::dual_socket_server()] {
        let device = collect(fs);
        for cpu in 0..device.processor_count() {
            let times = device.processor_stat(cpu);
            let usage = device.processor_usage(cpu);
            assert_eq!(usage.idle, times.idle + times.iowait);
            assert_eq!(usage.total, times.as_array().iter().sum::<u64>());
        }
        let aggregate = device.stat();
        assert_eq!(device.usage().idle, aggregate.idle + aggregate.iowait);
    }
}

#[test]
fn test_out_of_range_sentinels() {
    let device = collect(MockFs::single_socket_laptop());
    let past_packages = device.physical_count();
    let past_processors = device.processor_count();

    assert_eq!(device.core_count(past_packages), -1);
    assert_eq!(device.model(past_packages), "");
    assert_eq!(device.thread_count(-1), -1);
    assert_eq!(device.vendor(-3), "");
    assert_eq!(device.core_id(past_processors), -1);
    assert_eq!(device.max_freq(past_processors), "");
    assert_eq!(device.cache(-1, CacheKind::L2), "");
    assert_eq!(device.processor_usage(past_processors), CpuUsage::default());
}

#[test]
fn test_accessors_are_idempotent() {
    let device = collect(MockFs::single_socket_laptop());
    for cpu in 0..device.processor_count() {
        assert_eq!(device.processor_stat(cpu), device.processor_stat(cpu));
        assert_eq!(device.current_freq(cpu), device.current_freq(cpu));
        assert_eq!(device.flags(cpu), device.flags(cpu));
    }
    assert_eq!(device.temperature(0), device.temperature(0));
}

#[test]
fn test_laptop_snapshot() {
    let device = collect(MockFs::single_socket_laptop());

    assert_eq!(device.physical_count(), 1);
    assert_eq!(device.core_count(0), 2);
    assert_eq!(device.thread_count(0), 4);
    assert_eq!(device.vendor(0), "GenuineIntel");
    assert_eq!(device.model(0), "Intel(R) Core(TM) i7-8550U CPU @ 1.80GHz");
    assert_eq!(device.core_id(3), 1);
    assert_eq!(device.current_freq(1), "2100.512");
    assert_eq!(device.family(0), "6");
    assert_eq!(device.stepping(0), "10");
    assert_eq!(device.bogo_mips(0), "3999.93");
    assert_eq!(device.cache(0, CacheKind::All), "8192 KB");
    assert_eq!(device.cache(0, CacheKind::L1Data), "32K");
    assert_eq!(device.cache(0, CacheKind::L2), "256K");
    assert_eq!(device.cache(0, CacheKind::L3), "8192K");
    assert_eq!(device.processors()[0].caches[3].shared_cpu_list, "0-3");
}

#[test]
fn test_dual_socket_thread_count_is_host_wide() {
    let device = collect(MockFs::dual_socket_server());

    assert_eq!(device.physical_count(), 2);
    for package in 0..device.physical_count() {
        assert_eq!(device.thread_count(package), 8);
        assert_eq!(device.core_count(package), 2);
        assert_eq!(device.temperature(package), "55°C");
    }
    assert_eq!(device.physical_id(5), 1);
    assert_eq!(device.processor_stat(7).steal, 7);
    assert_eq!(device.max_freq(7), "3000Mhz");
    // no cache topology on this host
    assert_eq!(device.cache(0, CacheKind::L1Data), "");
    assert!(
        device
            .diagnostics()
            .iter()
            .any(|d| d.concerns("/sys/devices/system/cpu/cpu0/cache"))
    );
}

#[test]
fn test_restricted_container_records_missing_paths() {
    let device = collect(MockFs::restricted_container());

    assert_eq!(device.processor_count(), 2);
    assert_eq!(device.vendor(0), "AuthenticAMD");
    assert_eq!(device.min_freq(0), "");
    assert_eq!(device.temperature(0), "");
    assert_eq!(device.processor_stat(1).steal, 20);

    let diagnostics = device.diagnostics();
    assert!(diagnostics.iter().all(|d| d.is_unavailable()));
    for path in [
        "/sys/devices/system/cpu/cpu0/cpufreq/cpuinfo_min_freq",
        "/sys/devices/system/cpu/cpu1/cpufreq/cpuinfo_max_freq",
        "/sys/devices/system/cpu/cpu1/cache",
        "/sys/class/hwmon/hwmon1/temp1_input",
    ] {
        assert!(
            diagnostics.iter().any(|d| d.concerns(path)),
            "missing diagnostic for {path}"
        );
    }
}

#[test]
fn test_arm_board_falls_back_to_sysfs_frequency() {
    let device = CpuCollector::new(MockFs::arm_board(), SourcePaths::default())
        .with_architecture("aarch64")
        .collect();

    assert_eq!(device.physical_count(), 1);
    assert_eq!(device.physical_id(3), 0);
    assert_eq!(device.core_id(3), 3);
    assert_eq!(device.vendor(0), "");
    assert_eq!(device.architecture(0), "aarch64");
    assert_eq!(device.current_freq(2), "1500Mhz");
    assert_eq!(device.min_freq(2), "600Mhz");
    assert_eq!(device.cache(1, CacheKind::L1Instruction), "48K");
    assert_eq!(device.cache(1, CacheKind::All), "");
    assert_eq!(device.temperature(0), "38°C");
    assert!(device.diagnostics().is_empty(), "{:?}", device.diagnostics());
}

#[test]
fn test_missing_proc_yields_empty_device() {
    let device = collect(MockFs::new());

    assert_eq!(device.physical_count(), 0);
    assert_eq!(device.processor_count(), 0);
    assert_eq!(device.stat(), CpuTimes::default());
    assert_eq!(device.usage(), CpuUsage::default());
    assert_eq!(device.core_count(0), -1);
    assert_eq!(device.diagnostics().len(), 2);
}

#[test]
fn test_json_snapshot_round_trips() {
    let device = collect(MockFs::dual_socket_server());

    let json = serde_json::to_string(&device).unwrap();
    let restored: CpuDevice = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, device);
    assert_eq!(restored.thread_count(1), 8);
}
