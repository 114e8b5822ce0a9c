use crate::analysis::{Analysis, AnalyzerConfig, analyze};
use crate::job::JobLabel;

/// 两个节点、每节点两个 NUMA 域（各 4 核 ×2 超线程）、两块 NIC、4 个 rank，
/// 每个 rank 两个 OpenMP 线程。rank 1 的 CPU 在 NUMA 1，却选了 NUMA 0 上的 cxi0。
pub const SAMPLE_LOG: &str = "\
srun: job 9883400 queued and waiting for resources
[PE_0]: rank 0 is on nid001
[PE_1]: rank 1 is on nid001
[PE_2]: rank 2 is on nid002
[PE_3]: rank 3 is on nid002
PE 0: MPICH processor detected:
PE 0:   Number of NUMA domains: 2
PE 0:   numa_domain 0: cpu_list=[0-3,64-67]
PE 0:   numa_domain 1: cpu_list=[4-7,68-71]
PE 0:   Number of NICs: 2
PE 0:   nic_index 0: domain_name=cxi0, numa_domain=0, addr=0x1a2b
PE 0:   nic_index 1: domain_name=cxi1, numa_domain=1, addr=0x1a2c
PE 0: Host nid001 selected NIC index=0, domain_name=cxi0, numa_node=0, address=[0x1a2b]
PE 1: Host nid001 selected NIC index=0, domain_name=cxi0, numa_node=0, address=[0x1a2b]
PE 2: Host nid002 selected NIC index=0, domain_name=cxi0, numa_node=0, address=[0x2a2b]
PE 3: Host nid002 selected NIC index=1, domain_name=cxi1, numa_node=1, address=[0x2a2c]
CCE OMP: host nid001 pid 2001 tid 2001 thread 0 affinity:  0 64
CCE OMP: host nid001 pid 2001 tid 2011 thread 1 affinity:  1 65
CCE OMP: host nid001 pid 2002 tid 2002 thread 0 affinity:  4 68
CCE OMP: host nid001 pid 2002 tid 2012 thread 1 affinity:  5 69
CCE OMP: host nid002 pid 3001 tid 3001 thread 0 affinity:  0 64
CCE OMP: host nid002 pid 3001 tid 3011 thread 1 affinity:  1 65
CCE OMP: host nid002 pid 3002 tid 3002 thread 0 affinity:  4 68
CCE OMP: host nid002 pid 3002 tid 3012 thread 1 affinity:  5 69
Application 9883400 resources: utime ~0s, stime ~0s
";

pub fn run(text: &str) -> Analysis {
    analyze(text, JobLabel::default(), &AnalyzerConfig::default())
}

pub fn run_with(text: &str, cfg: &AnalyzerConfig) -> Analysis {
    analyze(text, JobLabel::default(), cfg)
}
