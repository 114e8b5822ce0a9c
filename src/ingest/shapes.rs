//! 记录形状表：每种形状对应一条正则和一个抽取函数。

use std::str::FromStr;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::records::{
    NicRecord, NicSelectionRecord, NumaRecord, RankRecord, ThreadAffinityRecord,
};
use crate::codec;

/// 可识别的行形状，`ALL` 的顺序就是每行尝试的顺序。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordShape {
    RankPlacement,
    NumaCount,
    NumaDomain,
    NicCount,
    Nic,
    NicSelection,
    ThreadAffinity,
}

/// 单条抽取结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Rank(RankRecord),
    NumaCount(usize),
    Numa(NumaRecord),
    NicCount(usize),
    Nic(NicRecord),
    NicSelection(NicSelectionRecord),
    ThreadAffinity(ThreadAffinityRecord),
}

impl RecordShape {
    pub const ALL: [RecordShape; 7] = [
        RecordShape::RankPlacement,
        RecordShape::NumaCount,
        RecordShape::NumaDomain,
        RecordShape::NicCount,
        RecordShape::Nic,
        RecordShape::NicSelection,
        RecordShape::ThreadAffinity,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RecordShape::RankPlacement => "rank_placement",
            RecordShape::NumaCount => "numa_count",
            RecordShape::NumaDomain => "numa_domain",
            RecordShape::NicCount => "nic_count",
            RecordShape::Nic => "nic",
            RecordShape::NicSelection => "nic_selection",
            RecordShape::ThreadAffinity => "thread_affinity",
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    fn pattern(self) -> &'static str {
        match self {
            RecordShape::RankPlacement => r"\[PE_\d+\]:\s*rank (\d+) is on ([\w.-]+)",
            RecordShape::NumaCount => r"\bPE 0:\s+Number of NUMA domains:\s+(\d+)",
            RecordShape::NumaDomain => r"\bPE 0:\s+numa_domain (\d+): cpu_list=\[([^\]]*)\]",
            RecordShape::NicCount => r"\bPE 0:\s+Number of NICs:\s+(\d+)",
            RecordShape::Nic => {
                r"\bPE 0:\s+nic_index (\d+): domain_name=([^,\s]+), numa_domain=(\d+), addr=(\S+)"
            }
            RecordShape::NicSelection => {
                r"\bPE (\d+): Host ([\w.-]+) selected NIC index=(\d+), domain_name=([^,\s]+), numa_node=(\d+)"
            }
            RecordShape::ThreadAffinity => {
                r"CCE OMP: host ([\w.-]+) pid (\d+) tid \d+ thread (\d+) affinity:\s+(\d+)\s+(\d+)"
            }
        }
    }

    pub fn regex(self) -> &'static Regex {
        static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
        let patterns = PATTERNS.get_or_init(|| {
            RecordShape::ALL
                .iter()
                .map(|shape| {
                    Regex::new(shape.pattern()).expect("built-in record pattern must compile")
                })
                .collect()
        });
        &patterns[self.index()]
    }

    /// 从匹配结果构造记录；数值溢出或 cpu 列表非法时返回原因。
    pub fn extract(self, caps: &Captures<'_>, line: usize) -> Result<Record, String> {
        let record = match self {
            RecordShape::RankPlacement => Record::Rank(RankRecord {
                line,
                rank: num(caps, 1)?,
                node: text(caps, 2),
            }),
            RecordShape::NumaCount => Record::NumaCount(num(caps, 1)?),
            RecordShape::NumaDomain => {
                let tokens: Vec<String> = caps[2]
                    .split(',')
                    .map(|t| t.trim().to_string())
                    .collect();
                let cpus = codec::decode(&tokens).map_err(|e| e.to_string())?;
                Record::Numa(NumaRecord {
                    line,
                    numa: num(caps, 1)?,
                    tokens,
                    cpus,
                })
            }
            RecordShape::NicCount => Record::NicCount(num(caps, 1)?),
            RecordShape::Nic => Record::Nic(NicRecord {
                line,
                index: num(caps, 1)?,
                name: text(caps, 2),
                numa: num(caps, 3)?,
                address: text(caps, 4),
            }),
            RecordShape::NicSelection => Record::NicSelection(NicSelectionRecord {
                line,
                rank: num(caps, 1)?,
                node: text(caps, 2),
                index: num(caps, 3)?,
                name: text(caps, 4),
                numa: num(caps, 5)?,
            }),
            RecordShape::ThreadAffinity => Record::ThreadAffinity(ThreadAffinityRecord {
                line,
                node: text(caps, 1),
                pid: num(caps, 2)?,
                thread: num(caps, 3)?,
                cpus: [num(caps, 4)?, num(caps, 5)?],
            }),
        };
        Ok(record)
    }
}

fn text(caps: &Captures<'_>, group: usize) -> String {
    caps[group].to_string()
}

fn num<T: FromStr>(caps: &Captures<'_>, group: usize) -> Result<T, String> {
    let raw = &caps[group];
    raw.parse()
        .map_err(|_| format!("`{raw}` is out of range"))
}
