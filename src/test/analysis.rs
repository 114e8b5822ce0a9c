use std::path::Path;

use super::fixtures::{SAMPLE_LOG, run, run_with};
use crate::analysis::{AnalyzerConfig, View, analyze_file};
use crate::diag::AnalyzeError;
use crate::job::JobLabel;

const SINGLE_NODE_LOG: &str = "\
[PE_0]: rank 0 is on nid001
PE 0:   Number of NUMA domains: 1
PE 0:   numa_domain 0: cpu_list=[0-1,64-65]
PE 0:   Number of NICs: 1
PE 0:   nic_index 0: domain_name=cxi0, numa_domain=0, addr=0x1
CCE OMP: host nid001 pid 100 tid 100 thread 0 affinity:  0 1
";

#[test]
fn single_node_end_to_end() {
    let a = run(SINGLE_NODE_LOG);
    assert!(a.diagnostics.is_empty(), "{:?}", a.diagnostics);

    let node = a.cluster.node_by_name("nid001").expect("node");
    let numa = a.cluster.find_numa(node, 0).expect("numa 0");
    assert_eq!(a.cluster.numa_core_count(numa), 2);
    for core_id in [0, 1] {
        let core = a.cluster.find_core(numa, core_id).expect("core");
        assert_eq!(a.cluster.core(core).cpus.len(), 2);
    }

    let task = a.job.task(0).expect("rank 0");
    assert_eq!(task.cpu_ids(&a.cluster), vec![0, 1]);
    assert!(task.nics.is_empty());
    assert_eq!(task.threads.len(), 1);
    let thread = task.thread(0).expect("thread 0");
    let mut thread_cpus: Vec<u32> = thread.cpus.iter().map(|&c| a.cluster.cpu(c).id).collect();
    thread_cpus.sort_unstable();
    assert_eq!(thread_cpus, vec![0, 1]);
    assert_eq!(a.cluster.nic_count(), 1);
    assert_eq!(a.cluster.numa(numa).nics.len(), 1);

    let out = a.render(&AnalyzerConfig::default());
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "=".repeat(92));
    assert_eq!(
        lines[5],
        format!(
            "| {:<10} | {:<9} | {:<25} | {:<9} | {:<12} | {:<8} |",
            "nid001", "000", "0-1 (2)", "0", "", ""
        )
    );
    assert!(!out.contains("Legend"));
    assert_eq!(a.mismatch_count(), 0);
}

#[test]
fn oversized_cpu_range_only_drops_its_descriptor() {
    let log = "\
[PE_0]: rank 0 is on nid001
PE 0:   Number of NUMA domains: 2
PE 0:   numa_domain 0: cpu_list=[0-3]
PE 0:   numa_domain 1: cpu_list=[4-40000000]
CCE OMP: host nid001 pid 100 tid 100 thread 0 affinity:  0 1
";
    let a = run(log);
    let node = a.cluster.node_by_name("nid001").expect("node");

    assert_eq!(a.cluster.node(node).numa_domains.len(), 1);
    assert_eq!(a.cluster.node_cpu_count(node), 4);
    assert_eq!(a.diagnostics.malformed().count(), 1);
    assert_eq!(a.diagnostics.count_mismatches().count(), 1);

    let task = a.job.task(0).expect("rank 0");
    assert_eq!(task.cpu_ids(&a.cluster), vec![0, 1]);
    assert!(a.render(&AnalyzerConfig::default()).contains("0-1 (2)"));
}

#[test]
fn empty_input_renders_zeroed_report() {
    let a = run("");
    assert!(a.records.is_empty());
    assert_eq!(a.cluster.node_count(), 0);
    assert_eq!(a.job.num_tasks(), 0);
    assert!(a.diagnostics.is_empty());

    let cfg = AnalyzerConfig {
        view: View::Both,
        ..AnalyzerConfig::default()
    };
    let out = a.render(&cfg);
    assert!(out.contains("Cluster (0 nodes)"));
    assert!(out.contains(&format!("{:<21}: 0  (0 per node)", "MPI Ranks")));
    assert!(!out.contains("Legend"));
}

#[test]
fn view_selects_sections() {
    let a = run(SAMPLE_LOG);
    let table = a.render(&AnalyzerConfig::default());
    assert!(table.contains("Node name"));
    assert!(!table.contains("Cluster ("));

    let tree = a.render(&AnalyzerConfig {
        view: View::Tree,
        ..AnalyzerConfig::default()
    });
    assert!(tree.starts_with("Cluster (2 nodes)"));
    assert!(!tree.contains("Node name"));

    let both = a.render(&AnalyzerConfig {
        view: View::Both,
        ..AnalyzerConfig::default()
    });
    assert!(both.contains("Node name") && both.contains("Cluster (2 nodes)"));
    assert_eq!(a.mismatch_count(), 1);
}

#[test]
fn ht_stride_changes_core_grouping() {
    let cfg = AnalyzerConfig {
        ht_stride: 0,
        ..AnalyzerConfig::default()
    };
    let a = run_with(SAMPLE_LOG, &cfg);
    let node = a.cluster.node_by_name("nid001").expect("node");
    assert_eq!(a.cluster.node_core_count(node), 16);
    assert_eq!(a.cluster.node_cpu_count(node), 16);
    assert_eq!(a.cluster.threads_per_core(), 1);
}

#[test]
fn job_label_from_file_name() {
    let label = JobLabel::from_path(Path::new("/tmp/logs/run_check-9883400.txt"));
    assert_eq!(label.id, 9883400);
    assert_eq!(label.name, "job_from_run_check-9883400.txt");

    let label = JobLabel::from_path(Path::new("output.log"));
    assert_eq!(label.id, 1);
    assert_eq!(label.name, "job_from_output.log");
}

#[test]
fn partial_config_keeps_defaults() {
    let cfg: AnalyzerConfig = serde_json::from_str(r#"{"ht_stride": 32, "view": "both"}"#)
        .expect("parse config");
    assert_eq!(cfg.ht_stride, 32);
    assert_eq!(cfg.view, View::Both);
    assert!(!cfg.detailed_cpus);
    assert_eq!(cfg.table.cpu_budget, 25);
    assert_eq!(cfg.build_opts().ht_stride, 32);
}

#[test]
fn missing_file_is_fatal() {
    let err = analyze_file(
        Path::new("/definitely/not/here/run-1.txt"),
        &AnalyzerConfig::default(),
    )
    .expect_err("missing file");
    assert!(matches!(err, AnalyzeError::MissingFile { .. }));
    assert!(err.to_string().contains("/definitely/not/here/run-1.txt"));
}
