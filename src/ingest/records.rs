use std::collections::BTreeSet;

use serde::Serialize;

/// `[PE_n]: rank r is on node`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankRecord {
    pub line: usize,
    pub rank: u64,
    pub node: String,
}

/// `PE 0: numa_domain id: cpu_list=[...]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumaRecord {
    pub line: usize,
    pub numa: u32,
    /// 原始 token，例如 `["0-15", "64-79"]`
    pub tokens: Vec<String>,
    pub cpus: BTreeSet<u32>,
}

/// `PE 0: nic_index i: domain_name=..., numa_domain=..., addr=...`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NicRecord {
    pub line: usize,
    pub index: u32,
    pub name: String,
    pub numa: u32,
    pub address: String,
}

/// `PE r: Host node selected NIC index=i, domain_name=..., numa_node=...`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NicSelectionRecord {
    pub line: usize,
    pub rank: u64,
    pub node: String,
    pub index: u32,
    pub name: String,
    pub numa: u32,
}

/// `CCE OMP: host node pid p tid t thread n affinity: c1 c2`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadAffinityRecord {
    pub line: usize,
    pub node: String,
    pub pid: u64,
    pub thread: u32,
    pub cpus: [u32; 2],
}

/// 解析结果：五个互相独立、保持首次出现顺序的记录列表。
#[derive(Debug, Clone, Default, Serialize)]
pub struct LogRecords {
    pub ranks: Vec<RankRecord>,
    pub numa_domains: Vec<NumaRecord>,
    pub nics: Vec<NicRecord>,
    pub nic_selections: Vec<NicSelectionRecord>,
    pub threads: Vec<ThreadAffinityRecord>,
    /// `Number of NUMA domains` 的声明值
    pub declared_numa: Option<usize>,
    /// `Number of NICs` 的声明值
    pub declared_nics: Option<usize>,
}

impl LogRecords {
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
            && self.numa_domains.is_empty()
            && self.nics.is_empty()
            && self.nic_selections.is_empty()
            && self.threads.is_empty()
    }
}
