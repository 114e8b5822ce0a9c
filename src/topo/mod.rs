//! 硬件拓扑
//!
//! 集群 → 节点 → NUMA 域 → 物理核 → 逻辑 CPU，另有挂在 NUMA 域上的 NIC。
//! 每一层都存放在 `Cluster` 的 arena 里，层间引用一律使用下标句柄。

mod builder;
mod cluster;
mod id;

pub use builder::{BuildOpts, build_cluster};
pub use cluster::{Cluster, LogicalCpu, Nic, Node, NumaDomain, PhysicalCore};
pub use id::{CoreIx, CpuIx, NicIx, NodeIx, NumaIx};
