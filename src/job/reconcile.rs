//! rank / 进程 / 线程 与硬件拓扑的对齐
//!
//! 日志不会直接说明哪个 pid 对应哪个 rank。两者数量相同时，按升序逐一配对；
//! 这只是启发式，日志里没有任何证据支持它。数量不同时，每个 pid 单独成为一个
//! 以 pid 为 id 的任务，不与 rank 任务合并（两者 id 可能相撞，不做特殊处理）。

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, info};

use super::model::{Job, JobLabel, MpiTask, OpenMpThread};
use crate::codec;
use crate::diag::{Diagnostic, Diagnostics, RefKind};
use crate::ingest::{LogRecords, ThreadAffinityRecord};
use crate::topo::Cluster;

/// pid 到任务的对应方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PidMapping {
    /// pid -> rank，按升序位置配对
    Positional(BTreeMap<u64, u64>),
    /// 每个 pid 自成一个任务
    Synthetic,
}

impl PidMapping {
    pub fn resolve(pids: &BTreeSet<u64>, ranks: &BTreeSet<u64>) -> Self {
        if pids.len() == ranks.len() {
            Self::Positional(pids.iter().copied().zip(ranks.iter().copied()).collect())
        } else {
            Self::Synthetic
        }
    }
}

#[tracing::instrument(skip_all, fields(job = label.id))]
pub fn reconcile_job(
    records: &LogRecords,
    cluster: &Cluster,
    label: JobLabel,
    diags: &mut Diagnostics,
) -> Job {
    let mut tasks: Vec<MpiTask> = Vec::new();
    let mut by_rank: HashMap<u64, usize> = HashMap::new();

    for rec in &records.ranks {
        if by_rank.contains_key(&rec.rank) {
            debug!(rank = rec.rank, line = rec.line, "重复的 rank 记录，忽略");
            continue;
        }
        let Some(node) = cluster.node_by_name(&rec.node) else {
            diags.push(Diagnostic::UnresolvedReference {
                kind: RefKind::Node,
                detail: format!("rank {} is on unknown node {}", rec.rank, rec.node),
            });
            continue;
        };
        by_rank.insert(rec.rank, tasks.len());
        tasks.push(MpiTask::new(rec.rank, node, false));
    }

    select_nics(records, cluster, &mut tasks, &by_rank, diags);

    let mut pid_order: Vec<u64> = Vec::new();
    let mut by_pid: HashMap<u64, Vec<&ThreadAffinityRecord>> = HashMap::new();
    for rec in &records.threads {
        by_pid
            .entry(rec.pid)
            .or_insert_with(|| {
                pid_order.push(rec.pid);
                Vec::new()
            })
            .push(rec);
    }

    let pids: BTreeSet<u64> = pid_order.iter().copied().collect();
    let ranks: BTreeSet<u64> = by_rank.keys().copied().collect();
    let mapping = PidMapping::resolve(&pids, &ranks);
    info!(
        pids = pids.len(),
        ranks = ranks.len(),
        positional = matches!(mapping, PidMapping::Positional(_)),
        "🔗 pid 与 rank 对齐"
    );

    for pid in pid_order {
        let threads = &by_pid[&pid];
        let idx = match &mapping {
            PidMapping::Positional(map) => map.get(&pid).and_then(|rank| by_rank.get(rank)).copied(),
            PidMapping::Synthetic => {
                let node_name = &threads[0].node;
                match cluster.node_by_name(node_name) {
                    Some(node) => {
                        tasks.push(MpiTask::new(pid, node, true));
                        Some(tasks.len() - 1)
                    }
                    None => {
                        diags.push(Diagnostic::UnresolvedReference {
                            kind: RefKind::Node,
                            detail: format!("pid {pid} runs on unknown node {node_name}"),
                        });
                        None
                    }
                }
            }
        };
        let Some(idx) = idx else {
            continue;
        };
        for rec in threads {
            bind_thread(cluster, &mut tasks[idx], rec, diags);
        }
    }

    tasks.sort_by_key(|t| t.id);
    for task in &tasks {
        debug!(
            task = task.id,
            node = %cluster.node(task.node).name,
            synthetic = task.synthetic,
            threads = task.threads.len(),
            cpus = %codec::encode(task.cpu_ids(cluster)),
            "MPI 任务"
        );
    }

    Job { label, tasks }
}

fn select_nics(
    records: &LogRecords,
    cluster: &Cluster,
    tasks: &mut [MpiTask],
    by_rank: &HashMap<u64, usize>,
    diags: &mut Diagnostics,
) {
    for sel in &records.nic_selections {
        let unresolved = |kind, detail: String| Diagnostic::UnresolvedReference { kind, detail };
        let Some(&idx) = by_rank.get(&sel.rank) else {
            diags.push_quiet(unresolved(
                RefKind::Rank,
                format!("NIC selection for unknown rank {}", sel.rank),
            ));
            continue;
        };
        let Some(node) = cluster.node_by_name(&sel.node) else {
            diags.push_quiet(unresolved(
                RefKind::Node,
                format!("rank {} selected a NIC on unknown node {}", sel.rank, sel.node),
            ));
            continue;
        };
        let Some(numa) = cluster.find_numa(node, sel.numa) else {
            diags.push_quiet(unresolved(
                RefKind::NumaDomain,
                format!("rank {} selected a NIC on missing NUMA domain {}", sel.rank, sel.numa),
            ));
            continue;
        };
        let Some(nic) = cluster.find_nic(numa, &sel.name) else {
            diags.push_quiet(unresolved(
                RefKind::Nic,
                format!(
                    "rank {} selected NIC {} not found in NUMA domain {}",
                    sel.rank, sel.name, sel.numa
                ),
            ));
            continue;
        };
        tasks[idx].nics.push(nic);
    }
}

fn bind_thread(
    cluster: &Cluster,
    task: &mut MpiTask,
    rec: &ThreadAffinityRecord,
    diags: &mut Diagnostics,
) {
    if task.thread(rec.thread).is_some() {
        diags.push_quiet(Diagnostic::MalformedRecord {
            line: rec.line,
            shape: "thread_affinity",
            reason: format!("thread {} already recorded for task {}", rec.thread, task.id),
        });
        return;
    }

    let mut cpus = Vec::with_capacity(2);
    for cpu_id in rec.cpus {
        match cluster.find_cpu(task.node, cpu_id) {
            Some(cpu) => {
                if !cpus.contains(&cpu) {
                    cpus.push(cpu);
                }
                task.add_cpu(cpu);
            }
            None => diags.push_quiet(Diagnostic::UnresolvedReference {
                kind: RefKind::Cpu,
                detail: format!(
                    "cpu {cpu_id} of pid {} thread {} not found on {}",
                    rec.pid,
                    rec.thread,
                    cluster.node(task.node).name
                ),
            }),
        }
    }

    if !cpus.is_empty() {
        task.threads.push(OpenMpThread {
            id: rec.thread,
            cpus,
        });
    }
}
