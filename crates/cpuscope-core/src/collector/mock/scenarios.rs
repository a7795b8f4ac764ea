//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios provide realistic `/proc` + `/sys` states for the
//! hosts the collector has to cope with.

use super::filesystem::MockFs;

const HWMON_TEMP_INPUT: &str = "/sys/class/hwmon/hwmon1/temp1_input";

fn x86_block(
    processor: u32,
    model: &str,
    physical: u32,
    core: u32,
    cores: u32,
    mhz: &str,
) -> String {
    format!(
        "\
processor\t: {processor}
vendor_id\t: GenuineIntel
cpu family\t: 6
model\t\t: 142
model name\t: {model}
stepping\t: 10
microcode\t: 0xf4
cpu MHz\t\t: {mhz}
cache size\t: 8192 KB
physical id\t: {physical}
siblings\t: {siblings}
core id\t\t: {core}
cpu cores\t: {cores}
apicid\t\t: {processor}
fpu\t\t: yes
flags\t\t: fpu vme de pse tsc msr pae mce cx8 apic sep mtrr sse sse2 ht syscall nx lm
bugs\t\t: spectre_v1 spectre_v2
bogomips\t: 3999.93
clflush size\t: 64
address sizes\t: 39 bits physical, 48 bits virtual
power management:

",
        siblings = cores * 2,
    )
}

impl MockFs {
    /// One socket, two cores, four threads, full cpufreq/cache/hwmon nodes.
    pub fn single_socket_laptop() -> Self {
        let mut fs = Self::new();
        let model = "Intel(R) Core(TM) i7-8550U CPU @ 1.80GHz";

        let mut cpuinfo = String::new();
        let blocks = [
            (0, 0, "1800.000"),
            (1, 1, "2100.512"),
            (2, 0, "800.000"),
            (3, 1, "3999.998"),
        ];
        for (processor, core, mhz) in blocks {
            cpuinfo.push_str(&x86_block(processor, model, 0, core, 2, mhz));
        }
        fs.add_file("/proc/cpuinfo", cpuinfo);

        fs.add_file(
            "/proc/stat",
            "\
cpu  10000 500 3000 80000 1000 200 100 0 0 0
cpu0 2500 125 750 20000 250 50 25 0 0 0
cpu1 2500 125 750 20000 250 50 25 0 0 0
cpu2 2500 125 750 20000 250 50 25 0 0 0
cpu3 2500 125 750 20000 250 50 25 0 0 0
intr 1000000 50 0 0 0 0 0 0 0 1 0 0 0 100 0 0 1000
ctxt 500000
btime 1700000000
processes 10000
procs_running 2
procs_blocked 0
",
        );

        for processor in 0..4 {
            fs.add_cpufreq(processor, 400000, 4000000);
            let siblings = if processor % 2 == 0 { "0,2" } else { "1,3" };
            fs.add_cache(processor, 0, 1, "Data", "32K", siblings);
            fs.add_cache(processor, 1, 1, "Instruction", "32K", siblings);
            fs.add_cache(processor, 2, 2, "Unified", "256K", siblings);
            fs.add_cache(processor, 3, 3, "Unified", "8192K", "0-3");
        }

        fs.add_file(HWMON_TEMP_INPUT, "47000\n");
        fs
    }

    /// Two sockets, two cores each with hyperthreading; no cache topology.
    pub fn dual_socket_server() -> Self {
        let mut fs = Self::new();
        let model = "Intel(R) Xeon(R) CPU E5-2620 v4 @ 2.10GHz";

        let mut cpuinfo = String::new();
        for processor in 0..8u32 {
            let physical = processor / 4;
            let core = processor % 2;
            cpuinfo.push_str(&x86_block(processor, model, physical, core, 2, "2100.000"));
        }
        fs.add_file("/proc/cpuinfo", cpuinfo);

        let mut stat = String::from("cpu  80000 800 16000 640000 8000 800 400 0 0 0\n");
        for processor in 0..8u64 {
            stat.push_str(&format!(
                "cpu{} {} 100 2000 80000 1000 100 50 {} 0 0\n",
                processor,
                10000 + processor,
                processor
            ));
        }
        stat.push_str("intr 123456 0 0 0\nctxt 99999\n");
        fs.add_file("/proc/stat", stat);

        for processor in 0..8 {
            fs.add_cpufreq(processor, 1200000, 3000000);
        }
        fs.add_file(HWMON_TEMP_INPUT, "55500\n");
        fs
    }

    /// Two CPUs visible through `/proc`, but no sysfs CPU tree and no hwmon,
    /// as inside many containers.
    pub fn restricted_container() -> Self {
        let mut fs = Self::new();
        let model = "AMD EPYC 7B13";
        let cpuinfo = (0..2)
            .map(|processor| {
                x86_block(processor, model, 0, 0, 1, "2449.998")
                    .replace("GenuineIntel", "AuthenticAMD")
            })
            .collect::<String>();
        fs.add_file("/proc/cpuinfo", cpuinfo);
        fs.add_file(
            "/proc/stat",
            "\
cpu  500 0 200 9000 10 0 5 40 0 0
cpu0 250 0 100 4500 5 0 3 20 0 0
cpu1 250 0 100 4500 5 0 2 20 0 0
intr 0
",
        );
        fs
    }

    /// Four ARM cores: no `physical id`, `core id`, `vendor_id`, `model name`
    /// or `cpu MHz` in cpuinfo; sysfs topology and cpufreq fill the gaps.
    pub fn arm_board() -> Self {
        let mut fs = Self::new();

        let mut cpuinfo = String::new();
        for processor in 0..4 {
            cpuinfo.push_str(&format!(
                "\
processor\t: {processor}
BogoMIPS\t: 108.00
Features\t: fp asimd evtstrm crc32 cpuid
CPU implementer\t: 0x41
CPU architecture: 8
CPU variant\t: 0x0
CPU part\t: 0xd08
CPU revision\t: 3

"
            ));
        }
        cpuinfo.push_str("Hardware\t: BCM2835\nRevision\t: c03111\n");
        cpuinfo.push_str("Model\t\t: Raspberry Pi 4 Model B Rev 1.1\n");
        fs.add_file("/proc/cpuinfo", cpuinfo);

        fs.add_file(
            "/proc/stat",
            "\
cpu  4000 0 1000 40000 100 0 20 0 0 0
cpu0 1000 0 250 10000 25 0 5 0 0 0
cpu1 1000 0 250 10000 25 0 5 0 0 0
cpu2 1000 0 250 10000 25 0 5 0 0 0
cpu3 1000 0 250 10000 25 0 5 0 0 0
",
        );

        for processor in 0..4 {
            fs.add_cpufreq(processor, 600000, 1500000);
            fs.add_topology(processor, 0, processor as i32);
            fs.add_file(
                format!("/sys/devices/system/cpu/cpu{}/cpufreq/scaling_cur_freq", processor),
                "1500000\n",
            );
            fs.add_cache(processor, 0, 1, "Data", "32K", &processor.to_string());
            fs.add_cache(processor, 1, 1, "Instruction", "48K", &processor.to_string());
            fs.add_cache(processor, 2, 2, "Unified", "1024K", "0-3");
        }
        fs.add_file(HWMON_TEMP_INPUT, "38459\n");
        fs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::traits::FileSystem;
    use std::path::Path;

    #[test]
    fn test_laptop_has_required_files() {
        let fs = MockFs::single_socket_laptop();

        assert!(fs.exists(Path::new("/proc/cpuinfo")));
        assert!(fs.exists(Path::new("/proc/stat")));
        assert!(fs.exists(Path::new(HWMON_TEMP_INPUT)));
        for processor in 0..4 {
            let cpufreq =
                format!("/sys/devices/system/cpu/cpu{processor}/cpufreq/cpuinfo_max_freq");
            assert!(fs.exists(Path::new(&cpufreq)));
        }
    }

    #[test]
    fn test_server_lists_eight_processors() {
        let fs = MockFs::dual_socket_server();
        let cpuinfo = fs.read_to_string(Path::new("/proc/cpuinfo")).unwrap();
        assert_eq!(cpuinfo.matches("processor\t:").count(), 8);
        assert_eq!(cpuinfo.matches("physical id\t: 1").count(), 4);
    }

    #[test]
    fn test_container_has_no_sysfs() {
        let fs = MockFs::restricted_container();
        assert!(!fs.exists(Path::new("/sys")));
        assert!(fs.exists(Path::new("/proc/stat")));
    }

    #[test]
    fn test_arm_board_has_no_cpu_mhz() {
        let fs = MockFs::arm_board();
        let cpuinfo = fs.read_to_string(Path::new("/proc/cpuinfo")).unwrap();
        assert!(!cpuinfo.contains("cpu MHz"));
        assert!(fs.exists(Path::new(
            "/sys/devices/system/cpu/cpu3/cpufreq/scaling_cur_freq"
        )));
    }
}
