//! JSON 快照：把渲染所需的数据整理成可序列化的结构，供脚本消费。

use serde::Serialize;

use super::summary::JobStats;
use super::table::{TableLayout, TaskRow, task_rows};
use crate::codec;
use crate::diag::Diagnostics;
use crate::job::{Job, JobLabel};
use crate::topo::Cluster;

#[derive(Debug, Clone, Serialize)]
pub struct NumaView {
    pub id: u32,
    pub cores: usize,
    pub cpus: String,
    pub nics: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeView {
    pub name: String,
    pub numa_domains: Vec<NumaView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSnapshot<'a> {
    pub job: &'a JobLabel,
    pub nodes: Vec<NodeView>,
    pub rows: Vec<TaskRow>,
    pub summary: JobStats,
    pub diagnostics: &'a Diagnostics,
}

impl<'a> ReportSnapshot<'a> {
    pub fn new(
        cluster: &Cluster,
        job: &'a Job,
        diagnostics: &'a Diagnostics,
        layout: &TableLayout,
    ) -> Self {
        let nodes = cluster
            .nodes_by_name()
            .into_iter()
            .map(|node| {
                let mut numa_domains: Vec<NumaView> = cluster
                    .node(node)
                    .numa_domains
                    .iter()
                    .map(|&numa| NumaView {
                        id: cluster.numa(numa).id,
                        cores: cluster.numa_core_count(numa),
                        cpus: codec::encode(cluster.numa_cpu_ids(numa)),
                        nics: cluster
                            .numa(numa)
                            .nics
                            .iter()
                            .map(|&nic| cluster.nic(nic).name.clone())
                            .collect(),
                    })
                    .collect();
                numa_domains.sort_by_key(|n| n.id);
                NodeView {
                    name: cluster.node(node).name.clone(),
                    numa_domains,
                }
            })
            .collect();

        Self {
            job: &job.label,
            nodes,
            rows: task_rows(cluster, job, layout),
            summary: JobStats::compute(cluster, job),
            diagnostics,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
