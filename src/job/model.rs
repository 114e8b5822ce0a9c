use std::collections::BTreeSet;
use std::path::Path;

use serde::Serialize;

use crate::topo::{Cluster, CpuIx, NicIx, NodeIx};

/// 作业编号与名字，取自输入文件名
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobLabel {
    pub id: u64,
    pub name: String,
}

impl JobLabel {
    /// `run_check-9883400.txt` -> id 9883400, name `job_from_run_check-9883400.txt`。
    /// 文件名里没有数字时 id 为 1。
    pub fn from_path(path: &Path) -> Self {
        let file_name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let id = file_name
            .split(|c: char| !c.is_ascii_digit())
            .find(|s| !s.is_empty())
            .and_then(|digits| digits.parse().ok())
            .unwrap_or(1);
        Self {
            id,
            name: format!("job_from_{file_name}"),
        }
    }
}

impl Default for JobLabel {
    fn default() -> Self {
        Self {
            id: 1,
            name: "unnamed_job".to_string(),
        }
    }
}

/// OpenMP 线程，绑定 1~2 个逻辑 CPU
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenMpThread {
    pub id: u32,
    pub cpus: Vec<CpuIx>,
}

/// MPI 任务；`synthetic` 表示 id 来自进程号而不是 rank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MpiTask {
    pub id: u64,
    pub node: NodeIx,
    pub synthetic: bool,
    /// 去重后的逻辑 CPU，按发现顺序
    pub cpus: Vec<CpuIx>,
    /// 选中的 NIC，按发现顺序
    pub nics: Vec<NicIx>,
    pub threads: Vec<OpenMpThread>,
}

impl MpiTask {
    pub fn new(id: u64, node: NodeIx, synthetic: bool) -> Self {
        Self {
            id,
            node,
            synthetic,
            cpus: Vec::new(),
            nics: Vec::new(),
            threads: Vec::new(),
        }
    }

    /// 追加逻辑 CPU，已存在则忽略
    pub(crate) fn add_cpu(&mut self, cpu: CpuIx) {
        if !self.cpus.contains(&cpu) {
            self.cpus.push(cpu);
        }
    }

    /// 升序的逻辑 CPU 编号
    pub fn cpu_ids(&self, cluster: &Cluster) -> Vec<u32> {
        let mut ids: Vec<u32> = self.cpus.iter().map(|&c| cluster.cpu(c).id).collect();
        ids.sort_unstable();
        ids
    }

    /// 任务 CPU 覆盖到的 NUMA 域编号
    pub fn numa_ids(&self, cluster: &Cluster) -> BTreeSet<u32> {
        self.cpus
            .iter()
            .map(|&c| cluster.numa(cluster.cpu_numa(c)).id)
            .collect()
    }

    /// 选中的 NIC 不在任务 CPU 所覆盖的任何 NUMA 域上
    pub fn nic_numa_mismatch(&self, cluster: &Cluster, nic: NicIx) -> bool {
        let nic_numa = cluster.numa(cluster.nic(nic).numa).id;
        !self.numa_ids(cluster).contains(&nic_numa)
    }

    pub fn thread(&self, id: u32) -> Option<&OpenMpThread> {
        self.threads.iter().find(|t| t.id == id)
    }
}

/// 作业：按 id 升序排列的 MPI 任务
#[derive(Debug, Clone, Default)]
pub struct Job {
    pub label: JobLabel,
    pub tasks: Vec<MpiTask>,
}

impl Job {
    pub fn task(&self, id: u64) -> Option<&MpiTask> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn num_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// 实际承载任务的节点（去重，按名字排序）
    pub fn nodes(&self, cluster: &Cluster) -> Vec<NodeIx> {
        let mut nodes: Vec<NodeIx> = self.tasks.iter().map(|t| t.node).collect();
        nodes.sort_by(|a, b| cluster.node(*a).name.cmp(&cluster.node(*b).name));
        nodes.dedup();
        nodes
    }

    pub fn total_threads(&self) -> usize {
        self.tasks.iter().map(|t| t.threads.len()).sum()
    }

    pub fn total_cpus_allocated(&self) -> usize {
        self.tasks.iter().map(|t| t.cpus.len()).sum()
    }

    pub fn total_cpus_available(&self, cluster: &Cluster) -> usize {
        self.nodes(cluster)
            .into_iter()
            .map(|n| cluster.node_cpu_count(n))
            .sum()
    }
}
