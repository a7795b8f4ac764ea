//! Parsers for `/proc/cpuinfo` and `/proc/stat`.
//!
//! These are pure functions over file contents so they can be tested with
//! string inputs. Reading the files and turning failures into diagnostics is
//! done in [`super::system`].

use std::collections::BTreeMap;

use crate::models::{CpuTimes, CpuUsage};

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Parse error: {message}")]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

// ============ /proc/cpuinfo ============

/// Fields of one `/proc/cpuinfo` block, keyed by field name.
pub type CpuInfoBlock = BTreeMap<String, String>;

/// Parsed `/proc/cpuinfo`: one block per `processor` value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpuInfoTable {
    blocks: BTreeMap<String, CpuInfoBlock>,
    max_physical_id: Option<i32>,
}

impl CpuInfoTable {
    /// Number of distinct processor entries.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Block for the given `processor` value, as written in the file.
    pub fn get(&self, processor: &str) -> Option<&CpuInfoBlock> {
        self.blocks.get(processor)
    }

    /// Highest `physical id` seen plus one.
    ///
    /// Only a hint: blocks without `physical id` count as package 0, and
    /// sparse ids inflate the result. An empty table yields 0.
    pub fn package_hint(&self) -> usize {
        if self.blocks.is_empty() {
            return 0;
        }
        self.max_physical_id.map_or(1, |id| id.max(0) as usize + 1)
    }

    /// Blocks ordered by numeric processor index, ascending.
    ///
    /// String keys would put "10" before "2"; keys that are not numbers sort
    /// after all numeric ones.
    pub fn sorted_by_index(&self) -> Vec<&CpuInfoBlock> {
        let mut keyed: Vec<(Option<u32>, &String, &CpuInfoBlock)> = self
            .blocks
            .iter()
            .map(|(key, block)| (key.parse::<u32>().ok(), key, block))
            .collect();
        keyed.sort_by(|a, b| match (a.0, b.0) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.1.cmp(b.1),
        });
        keyed.into_iter().map(|(_, _, block)| block).collect()
    }
}

/// Parses `/proc/cpuinfo` content.
///
/// Format: blocks separated by a blank line, each line `key : value`. The
/// first colon separates key from value and both sides are trimmed, so
/// values containing colons survive intact. Blocks without a `processor`
/// key are dropped; a repeated processor index replaces the earlier block.
pub fn parse_cpuinfo(content: &str) -> CpuInfoTable {
    let mut table = CpuInfoTable::default();
    let mut current = CpuInfoBlock::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            table.finish_block(std::mem::take(&mut current));
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        if key == "physical id"
            && let Ok(id) = value.parse::<i32>()
        {
            table.max_physical_id = Some(table.max_physical_id.map_or(id, |max| max.max(id)));
        }
        current.insert(key.to_string(), value.to_string());
    }
    table.finish_block(current);

    table
}

impl CpuInfoTable {
    fn finish_block(&mut self, block: CpuInfoBlock) {
        let Some(processor) = block.get("processor").filter(|p| !p.is_empty()) else {
            return;
        };
        self.blocks.insert(processor.clone(), block);
    }
}

// ============ /proc/stat ============

/// Single `cpu`/`cpuN` line from `/proc/stat`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpuStatLine {
    pub cpu_id: Option<u32>, // None for aggregate "cpu" line
    pub times: CpuTimes,
    pub usage: CpuUsage,
}

/// The leading `cpu` lines of `/proc/stat`.
///
/// Position 0 is the whole-machine aggregate, position k is logical
/// processor k-1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatTable {
    pub lines: Vec<CpuStatLine>,
    /// Set when parsing stopped at a short `cpu` line.
    pub malformed: Option<ParseError>,
}

impl StatTable {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The aggregate line, if any line was parsed.
    pub fn aggregate(&self) -> Option<&CpuStatLine> {
        self.lines.first()
    }

    /// Line for logical processor `index` (position `index + 1`).
    pub fn processor(&self, index: u32) -> Option<&CpuStatLine> {
        self.lines.get(index as usize + 1)
    }
}

/// Number of time counters following the label on a `cpu` line.
const CPU_STAT_COUNTERS: usize = 10;

/// Returns the CPU number for `cpu`/`cpuN` labels, `Some(None)` for the
/// aggregate label, `None` for anything else.
fn cpu_label(label: &str) -> Option<Option<u32>> {
    let digits = label.strip_prefix("cpu")?;
    if digits.is_empty() {
        return Some(None);
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(digits.parse().ok())
}

/// Parses the `cpu` lines at the top of `/proc/stat`.
///
/// Parsing stops at the first line whose label is not `cpu` followed by
/// digits (`intr`, `ctxt`, ...). A `cpu` line with fewer than ten counters
/// also stops parsing; lines parsed before it are kept and the failure is
/// recorded in `StatTable::malformed`. Counters that are not numbers read
/// as 0.
pub fn parse_cpu_stat(content: &str) -> StatTable {
    let mut table = StatTable::default();

    for (line_no, line) in content.lines().enumerate() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(cpu_id) = parts.first().and_then(|label| cpu_label(label)) else {
            break;
        };

        if parts.len() < CPU_STAT_COUNTERS + 1 {
            table.malformed = Some(ParseError::new(format!(
                "line {}: expected {}+ fields, got {}",
                line_no + 1,
                CPU_STAT_COUNTERS + 1,
                parts.len()
            )));
            break;
        }

        let get_val = |idx: usize| -> u64 { parts[idx].parse().unwrap_or(0) };
        let times = CpuTimes {
            user: get_val(1),
            nice: get_val(2),
            system: get_val(3),
            idle: get_val(4),
            iowait: get_val(5),
            irq: get_val(6),
            softirq: get_val(7),
            steal: get_val(8),
            guest: get_val(9),
            guest_nice: get_val(10),
        };
        table.lines.push(CpuStatLine {
            cpu_id,
            usage: times.usage(),
            times,
        });
    }

    table
}
