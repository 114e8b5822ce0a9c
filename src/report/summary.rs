//! 作业汇总统计
//!
//! 每节点的 NUMA 域数和核数取第一个任务所在节点，假定节点同构。

use std::fmt::Write;

use serde::Serialize;

use crate::job::Job;
use crate::topo::Cluster;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobStats {
    pub job_id: u64,
    pub job_name: String,
    pub nodes_used: usize,
    pub mpi_ranks: usize,
    pub ranks_per_node: f64,
    pub threads_per_rank: f64,
    pub total_cpus_allocated: usize,
    pub cpus_per_rank: f64,
    pub total_cpus_available: usize,
    pub numa_domains_per_node: usize,
    pub cores_per_node: usize,
}

impl JobStats {
    pub fn compute(cluster: &Cluster, job: &Job) -> Self {
        let nodes_used = job.nodes(cluster).len();
        let mpi_ranks = job.num_tasks();
        let total_cpus_allocated = job.total_cpus_allocated();
        let representative = job.tasks.first().map(|t| t.node);

        Self {
            job_id: job.label.id,
            job_name: job.label.name.clone(),
            nodes_used,
            mpi_ranks,
            ranks_per_node: ratio(mpi_ranks, nodes_used),
            threads_per_rank: ratio(job.total_threads(), mpi_ranks),
            total_cpus_allocated,
            cpus_per_rank: ratio(total_cpus_allocated, mpi_ranks),
            total_cpus_available: job.total_cpus_available(cluster),
            numa_domains_per_node: representative
                .map(|n| cluster.node(n).numa_domains.len())
                .unwrap_or(0),
            cores_per_node: representative
                .map(|n| cluster.node_core_count(n))
                .unwrap_or(0),
        }
    }

    /// 左对齐标签的汇总块
    pub fn render(&self) -> String {
        let lines = [
            ("Job ID", self.job_id.to_string()),
            ("Nodes Used", self.nodes_used.to_string()),
            (
                "MPI Ranks",
                format!(
                    "{}  ({} per node)",
                    self.mpi_ranks,
                    format_avg(self.ranks_per_node)
                ),
            ),
            ("Threads per Rank", format_avg(self.threads_per_rank)),
            (
                "Total CPUs Allocated",
                format!(
                    "{}  ({} CPUs per rank)",
                    self.total_cpus_allocated,
                    format_avg(self.cpus_per_rank)
                ),
            ),
            ("Total CPUs Available", self.total_cpus_available.to_string()),
            (
                "NUMA Domains per Node",
                self.numa_domains_per_node.to_string(),
            ),
            ("Cores per Node", self.cores_per_node.to_string()),
        ];
        let width = lines.iter().map(|(label, _)| label.len()).max().unwrap_or(0);

        let mut out = String::from("=============== Job Summary ===============\n");
        for (label, value) in &lines {
            let _ = writeln!(out, "{label:<width$}: {value}");
        }
        out
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// 整数值不带小数点：`2.0` -> `2`，`2.5` -> `2.5`
pub fn format_avg(v: f64) -> String {
    if v.fract() == 0.0 && v.is_finite() {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}
