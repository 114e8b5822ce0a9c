//! 树形视图
//!
//! 节点按名字、NUMA 域/核/CPU/任务/线程按编号升序输出，保证结果稳定。

use std::fmt::Write;

use super::summary::JobStats;
use crate::codec;
use crate::job::{Job, MpiTask};
use crate::topo::{Cluster, NodeIx, NumaIx};

fn branch(last: bool) -> &'static str {
    if last { "└── " } else { "├── " }
}

fn pad(last: bool) -> &'static str {
    if last { "    " } else { "│   " }
}

/// `detailed` 为真时逐个列出物理核与逻辑 CPU，否则把 CPU 压缩成区间。
pub fn render_tree(cluster: &Cluster, job: &Job, detailed: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Cluster ({} nodes)", cluster.node_count());

    let nodes = cluster.nodes_by_name();
    for (i, &node) in nodes.iter().enumerate() {
        let last = i + 1 == nodes.len();
        let _ = writeln!(out, "  {}Node: {}", branch(last), cluster.describe_node(node));
        let indent = format!("  {}", pad(last));
        write_numas(&mut out, cluster, node, &indent, detailed);
    }

    let _ = writeln!(
        out,
        "\n=============== Job: {} (ID: {}, {} MPI tasks) ===============",
        job.label.name,
        job.label.id,
        job.num_tasks()
    );
    let job_nodes = job.nodes(cluster);
    for (i, &node) in job_nodes.iter().enumerate() {
        let last = i + 1 == job_nodes.len();
        let _ = writeln!(out, "  {}Node: {}", branch(last), cluster.describe_node(node));
        let indent = format!("  {}", pad(last));

        let mut tasks: Vec<&MpiTask> = job.tasks.iter().filter(|t| t.node == node).collect();
        tasks.sort_by_key(|t| t.id);
        for (j, task) in tasks.iter().enumerate() {
            write_task(&mut out, cluster, task, &indent, j + 1 == tasks.len());
        }
    }

    out.push('\n');
    out.push_str(&JobStats::compute(cluster, job).render());
    out
}

fn write_numas(out: &mut String, cluster: &Cluster, node: NodeIx, indent: &str, detailed: bool) {
    let mut numas: Vec<NumaIx> = cluster.node(node).numa_domains.clone();
    numas.sort_by_key(|&n| cluster.numa(n).id);

    for (j, &numa) in numas.iter().enumerate() {
        let last = j + 1 == numas.len();
        let _ = writeln!(
            out,
            "{indent}{}NUMA: {} ({} cores, {} CPUs)",
            branch(last),
            cluster.numa(numa).id,
            cluster.numa_core_count(numa),
            cluster.numa_cpu_count(numa)
        );
        let inner = format!("{indent}{}", pad(last));

        let nic_names: Vec<&str> = cluster
            .numa(numa)
            .nics
            .iter()
            .map(|&nic| cluster.nic(nic).name.as_str())
            .collect();
        let has_nics = !nic_names.is_empty();

        if detailed {
            let mut cores = cluster.numa(numa).cores.clone();
            cores.sort_by_key(|&c| cluster.core(c).id);
            for (k, &core) in cores.iter().enumerate() {
                let last_core = k + 1 == cores.len() && !has_nics;
                let _ = writeln!(
                    out,
                    "{inner}{}Core: {}",
                    branch(last_core),
                    cluster.core(core).id
                );
                let cpu_indent = format!("{inner}{}", pad(last_core));
                let mut ids: Vec<u32> = cluster
                    .core(core)
                    .cpus
                    .iter()
                    .map(|&c| cluster.cpu(c).id)
                    .collect();
                ids.sort_unstable();
                for (l, id) in ids.iter().enumerate() {
                    let _ = writeln!(out, "{cpu_indent}{}CPU: {id}", branch(l + 1 == ids.len()));
                }
            }
        } else {
            let ids = cluster.numa_cpu_ids(numa);
            if !ids.is_empty() {
                let _ = writeln!(out, "{inner}{}CPUs: {}", branch(!has_nics), codec::encode(ids));
            }
        }

        if has_nics {
            let _ = writeln!(out, "{inner}└── NICs: {}", nic_names.join(", "));
        }
    }
}

fn write_task(out: &mut String, cluster: &Cluster, task: &MpiTask, indent: &str, last: bool) {
    let ids = task.cpu_ids(cluster);
    let origin = if task.synthetic { " [pid]" } else { "" };
    let _ = writeln!(
        out,
        "{indent}{}MPI Rank {}{origin} ({} CPUs: {})",
        branch(last),
        task.id,
        ids.len(),
        codec::encode(ids.iter().copied())
    );

    if task.threads.is_empty() {
        return;
    }
    let inner = format!("{indent}{}", pad(last));
    let _ = writeln!(out, "{inner}├── {} OpenMP threads", task.threads.len());

    let mut threads: Vec<_> = task.threads.iter().collect();
    threads.sort_by_key(|t| t.id);
    for (k, thread) in threads.iter().enumerate() {
        let mut cpu_ids: Vec<u32> = thread.cpus.iter().map(|&c| cluster.cpu(c).id).collect();
        cpu_ids.sort_unstable();
        let cpu_str = cpu_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(
            out,
            "{inner}{}Thread {}: {cpu_str}",
            branch(k + 1 == threads.len()),
            thread.id
        );
    }
}
