//! 拓扑构建
//!
//! 顺序固定：先按 rank 记录建节点，再套用 NUMA 模板，最后挂 NIC。

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::{debug, info, trace};

use super::cluster::Cluster;
use super::id::NodeIx;
use crate::codec;
use crate::diag::{Diagnostic, Diagnostics, RefKind};
use crate::ingest::{LogRecords, NicRecord, NumaRecord};

#[derive(Debug, Clone)]
pub struct BuildOpts {
    /// 超线程编号相对物理核编号的偏移；`id >= ht_stride` 的 CPU 属于核 `id - ht_stride`。
    /// 为 0 时不区分超线程，所有编号都视为物理核。
    pub ht_stride: u32,
}

impl Default for BuildOpts {
    fn default() -> Self {
        Self { ht_stride: 64 }
    }
}

/// 一个 NUMA 描述在所有节点上共用的形状
#[derive(Debug)]
struct NumaTemplate {
    id: u32,
    physical: Vec<u32>,
    /// (cpu 编号, 物理核编号)
    hyper: Vec<(u32, u32)>,
}

#[tracing::instrument(skip_all, fields(ranks = records.ranks.len(), numa = records.numa_domains.len(), nics = records.nics.len()))]
pub fn build_cluster(records: &LogRecords, opts: &BuildOpts, diags: &mut Diagnostics) -> Cluster {
    let mut cluster = Cluster::default();

    for rank in &records.ranks {
        cluster.add_node(&rank.node);
    }
    debug!(nodes = cluster.node_count(), "🖥️  节点已创建");

    let templates = numa_templates(&records.numa_domains, opts.ht_stride, diags);
    let nodes: Vec<NodeIx> = cluster.nodes().map(|(ix, _)| ix).collect();
    for &node in &nodes {
        for template in &templates {
            instantiate(&mut cluster, node, template);
        }
    }

    attach_nics(&mut cluster, &nodes, &records.nics, diags);

    info!(
        nodes = cluster.node_count(),
        numa_per_node = templates.len(),
        nics = cluster.nic_count(),
        "🧱 硬件拓扑构建完成"
    );
    log_summary(&cluster);
    cluster
}

/// 把 NUMA 描述拆成物理核编号和超线程编号。
///
/// 物理编号先于超线程编号处理；找不到对应物理核的超线程被丢弃。
fn numa_templates(
    records: &[NumaRecord],
    ht_stride: u32,
    diags: &mut Diagnostics,
) -> Vec<NumaTemplate> {
    let mut templates = Vec::with_capacity(records.len());
    let mut seen_numa = HashSet::new();
    let mut seen_cpu = HashSet::new();

    for rec in records {
        if !seen_numa.insert(rec.numa) {
            diags.push(Diagnostic::MalformedRecord {
                line: rec.line,
                shape: "numa_domain",
                reason: format!("duplicate NUMA domain {}", rec.numa),
            });
            continue;
        }

        let is_hyper = |id: u32| ht_stride > 0 && id >= ht_stride;
        let mut physical = Vec::new();
        for &id in rec.cpus.iter().filter(|&&id| !is_hyper(id)) {
            if seen_cpu.insert(id) {
                physical.push(id);
            } else {
                diags.push(duplicate_cpu(rec, id));
            }
        }

        let cores: BTreeSet<u32> = physical.iter().copied().collect();
        let mut hyper = Vec::new();
        for &id in rec.cpus.iter().filter(|&&id| is_hyper(id)) {
            let core = id - ht_stride;
            if !cores.contains(&core) {
                diags.push(Diagnostic::UnresolvedReference {
                    kind: RefKind::Core,
                    detail: format!(
                        "hyperthread cpu {id} has no physical core {core} in NUMA domain {}",
                        rec.numa
                    ),
                });
                continue;
            }
            if seen_cpu.insert(id) {
                hyper.push((id, core));
            } else {
                diags.push(duplicate_cpu(rec, id));
            }
        }

        trace!(
            numa = rec.numa,
            physical = %codec::encode(physical.iter().copied()),
            hyper = %codec::encode(hyper.iter().map(|(id, _)| *id)),
            "NUMA 模板"
        );
        templates.push(NumaTemplate {
            id: rec.numa,
            physical,
            hyper,
        });
    }
    templates
}

fn duplicate_cpu(rec: &NumaRecord, id: u32) -> Diagnostic {
    Diagnostic::MalformedRecord {
        line: rec.line,
        shape: "numa_domain",
        reason: format!("cpu {id} already belongs to another NUMA domain"),
    }
}

fn instantiate(cluster: &mut Cluster, node: NodeIx, template: &NumaTemplate) {
    let numa = cluster.add_numa(node, template.id);
    let mut cores = HashMap::with_capacity(template.physical.len());
    for &id in &template.physical {
        let core = cluster.add_core(numa, id);
        cluster.add_cpu(core, id);
        cores.insert(id, core);
    }
    for &(id, core_id) in &template.hyper {
        if let Some(&core) = cores.get(&core_id) {
            cluster.add_cpu(core, id);
        }
    }
}

/// 每个 NIC 描述挂到每个节点上 `numa` 对应的 NUMA 域；同一节点同名 NIC 只挂一次。
fn attach_nics(
    cluster: &mut Cluster,
    nodes: &[NodeIx],
    records: &[NicRecord],
    diags: &mut Diagnostics,
) {
    for rec in records {
        for &node in nodes {
            if cluster.node_has_nic(node, &rec.name) {
                trace!(nic = %rec.name, node = %cluster.node(node).name, "NIC 已存在，跳过");
                continue;
            }
            match cluster.find_numa(node, rec.numa) {
                Some(numa) => {
                    cluster.attach_nic(numa, rec.index, &rec.name, &rec.address);
                }
                None => diags.push(Diagnostic::UnresolvedReference {
                    kind: RefKind::NumaDomain,
                    detail: format!(
                        "NIC {} references NUMA domain {} missing on {}",
                        rec.name,
                        rec.numa,
                        cluster.node(node).name
                    ),
                }),
            }
        }
    }
}

fn log_summary(cluster: &Cluster) {
    for (ix, node) in cluster.nodes() {
        debug!(node = %cluster.describe_node(ix), "节点");
        for &numa in &node.numa_domains {
            let nics: Vec<&str> = cluster
                .numa(numa)
                .nics
                .iter()
                .map(|&nic| cluster.nic(nic).name.as_str())
                .collect();
            debug!(
                numa = cluster.numa(numa).id,
                cores = cluster.numa_core_count(numa),
                cpus = %codec::encode(cluster.numa_cpu_ids(numa)),
                nics = ?nics,
                "  NUMA 域"
            );
        }
    }
}
