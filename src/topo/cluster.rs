//! 拓扑实体与 arena

use std::collections::{BTreeSet, HashMap};

use tracing::trace;

use super::id::{CoreIx, CpuIx, NicIx, NodeIx, NumaIx};

/// 计算节点
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub numa_domains: Vec<NumaIx>,
}

/// NUMA 域，`id` 在所属节点内唯一
#[derive(Debug, Clone)]
pub struct NumaDomain {
    pub id: u32,
    pub node: NodeIx,
    pub cores: Vec<CoreIx>,
    pub nics: Vec<NicIx>,
}

/// 物理核；挂了多于一个逻辑 CPU 即开启了超线程
#[derive(Debug, Clone)]
pub struct PhysicalCore {
    pub id: u32,
    pub numa: NumaIx,
    pub cpus: Vec<CpuIx>,
}

/// 逻辑 CPU（硬件线程），`id` 在所属节点内唯一
#[derive(Debug, Clone)]
pub struct LogicalCpu {
    pub id: u32,
    pub core: CoreIx,
}

/// 网卡，`name` 即 domain_name（如 `cxi0`）
#[derive(Debug, Clone)]
pub struct Nic {
    pub name: String,
    pub index: u32,
    pub numa: NumaIx,
    pub address: String,
}

/// 集群拓扑：按层分开的 arena，加上按名字/编号查找的索引。
#[derive(Debug, Default, Clone)]
pub struct Cluster {
    nodes: Vec<Node>,
    numas: Vec<NumaDomain>,
    cores: Vec<PhysicalCore>,
    cpus: Vec<LogicalCpu>,
    nics: Vec<Nic>,
    node_by_name: HashMap<String, NodeIx>,
    cpu_by_id: HashMap<(NodeIx, u32), CpuIx>,
}

impl Cluster {
    /// 添加节点；同名节点只保留一个
    pub(crate) fn add_node(&mut self, name: &str) -> NodeIx {
        if let Some(&ix) = self.node_by_name.get(name) {
            return ix;
        }
        let ix = NodeIx(self.nodes.len());
        self.nodes.push(Node {
            name: name.to_string(),
            numa_domains: Vec::new(),
        });
        self.node_by_name.insert(name.to_string(), ix);
        trace!(node = name, ?ix, "添加节点");
        ix
    }

    pub(crate) fn add_numa(&mut self, node: NodeIx, id: u32) -> NumaIx {
        let ix = NumaIx(self.numas.len());
        self.numas.push(NumaDomain {
            id,
            node,
            cores: Vec::new(),
            nics: Vec::new(),
        });
        self.nodes[node.0].numa_domains.push(ix);
        ix
    }

    pub(crate) fn add_core(&mut self, numa: NumaIx, id: u32) -> CoreIx {
        let ix = CoreIx(self.cores.len());
        self.cores.push(PhysicalCore {
            id,
            numa,
            cpus: Vec::new(),
        });
        self.numas[numa.0].cores.push(ix);
        ix
    }

    /// 给物理核追加逻辑 CPU；该编号在节点内已存在时返回 `None`。
    pub(crate) fn add_cpu(&mut self, core: CoreIx, id: u32) -> Option<CpuIx> {
        let node = self.numas[self.cores[core.0].numa.0].node;
        if self.cpu_by_id.contains_key(&(node, id)) {
            return None;
        }
        let ix = CpuIx(self.cpus.len());
        self.cpus.push(LogicalCpu { id, core });
        self.cores[core.0].cpus.push(ix);
        self.cpu_by_id.insert((node, id), ix);
        Some(ix)
    }

    pub(crate) fn attach_nic(
        &mut self,
        numa: NumaIx,
        index: u32,
        name: &str,
        address: &str,
    ) -> NicIx {
        let ix = NicIx(self.nics.len());
        self.nics.push(Nic {
            name: name.to_string(),
            index,
            numa,
            address: address.to_string(),
        });
        self.numas[numa.0].nics.push(ix);
        ix
    }

    pub fn node(&self, ix: NodeIx) -> &Node {
        &self.nodes[ix.0]
    }

    pub fn numa(&self, ix: NumaIx) -> &NumaDomain {
        &self.numas[ix.0]
    }

    pub fn core(&self, ix: CoreIx) -> &PhysicalCore {
        &self.cores[ix.0]
    }

    pub fn cpu(&self, ix: CpuIx) -> &LogicalCpu {
        &self.cpus[ix.0]
    }

    pub fn nic(&self, ix: NicIx) -> &Nic {
        &self.nics[ix.0]
    }

    /// 按发现顺序遍历节点
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIx, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeIx(i), n))
    }

    /// 按名字升序排列的节点句柄
    pub fn nodes_by_name(&self) -> Vec<NodeIx> {
        let mut ixs: Vec<NodeIx> = (0..self.nodes.len()).map(NodeIx).collect();
        ixs.sort_by(|a, b| self.nodes[a.0].name.cmp(&self.nodes[b.0].name));
        ixs
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nic_count(&self) -> usize {
        self.nics.len()
    }

    pub fn node_by_name(&self, name: &str) -> Option<NodeIx> {
        self.node_by_name.get(name).copied()
    }

    pub fn find_numa(&self, node: NodeIx, id: u32) -> Option<NumaIx> {
        self.nodes[node.0]
            .numa_domains
            .iter()
            .copied()
            .find(|ix| self.numas[ix.0].id == id)
    }

    pub fn find_core(&self, numa: NumaIx, id: u32) -> Option<CoreIx> {
        self.numas[numa.0]
            .cores
            .iter()
            .copied()
            .find(|ix| self.cores[ix.0].id == id)
    }

    pub fn find_nic(&self, numa: NumaIx, name: &str) -> Option<NicIx> {
        self.numas[numa.0]
            .nics
            .iter()
            .copied()
            .find(|ix| self.nics[ix.0].name == name)
    }

    /// 节点上任一 NUMA 域是否已挂了同名 NIC
    pub fn node_has_nic(&self, node: NodeIx, name: &str) -> bool {
        self.nodes[node.0]
            .numa_domains
            .iter()
            .any(|&numa| self.find_nic(numa, name).is_some())
    }

    pub fn find_cpu(&self, node: NodeIx, id: u32) -> Option<CpuIx> {
        self.cpu_by_id.get(&(node, id)).copied()
    }

    /// 逻辑 CPU 所在的 NUMA 域
    pub fn cpu_numa(&self, cpu: CpuIx) -> NumaIx {
        self.cores[self.cpus[cpu.0].core.0].numa
    }

    pub fn is_hyperthreaded(&self, core: CoreIx) -> bool {
        self.cores[core.0].cpus.len() > 1
    }

    pub fn numa_core_count(&self, numa: NumaIx) -> usize {
        self.numas[numa.0].cores.len()
    }

    pub fn numa_cpu_count(&self, numa: NumaIx) -> usize {
        self.numas[numa.0]
            .cores
            .iter()
            .map(|c| self.cores[c.0].cpus.len())
            .sum()
    }

    /// NUMA 域内全部逻辑 CPU 编号（升序）
    pub fn numa_cpu_ids(&self, numa: NumaIx) -> Vec<u32> {
        let mut ids: Vec<u32> = self.numas[numa.0]
            .cores
            .iter()
            .flat_map(|c| self.cores[c.0].cpus.iter())
            .map(|cpu| self.cpus[cpu.0].id)
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn node_core_count(&self, node: NodeIx) -> usize {
        self.nodes[node.0]
            .numa_domains
            .iter()
            .map(|&numa| self.numa_core_count(numa))
            .sum()
    }

    pub fn node_cpu_count(&self, node: NodeIx) -> usize {
        self.nodes[node.0]
            .numa_domains
            .iter()
            .map(|&numa| self.numa_cpu_count(numa))
            .sum()
    }

    /// `nid001 (4 NUMA domains - 64 cores, 128 CPUs)`
    pub fn describe_node(&self, node: NodeIx) -> String {
        let n = &self.nodes[node.0];
        format!(
            "{} ({} NUMA domains - {} cores, {} CPUs)",
            n.name,
            n.numa_domains.len(),
            self.node_core_count(node),
            self.node_cpu_count(node)
        )
    }

    /// 全集群去重后的 NIC 名字
    pub fn unique_nic_names(&self) -> BTreeSet<&str> {
        self.nics.iter().map(|n| n.name.as_str()).collect()
    }

    /// 以第一个节点的第一个物理核为代表的每核线程数，没有核时为 1。
    pub fn threads_per_core(&self) -> usize {
        self.nodes
            .first()
            .and_then(|n| n.numa_domains.first())
            .and_then(|numa| self.numas[numa.0].cores.first())
            .map(|core| self.cores[core.0].cpus.len())
            .unwrap_or(1)
    }

    /// 以第一个节点为代表的每节点物理核数
    pub fn cores_per_node(&self) -> usize {
        if self.nodes.is_empty() {
            return 0;
        }
        self.node_core_count(NodeIx(0))
    }
}
