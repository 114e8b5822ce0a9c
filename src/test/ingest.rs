use super::fixtures::SAMPLE_LOG;
use crate::diag::{Diagnostic, Diagnostics, Section};
use crate::ingest::{RecordShape, ingest};
use std::collections::BTreeSet;

#[test]
fn sample_log_yields_every_record_kind() {
    let mut diags = Diagnostics::default();
    let records = ingest(SAMPLE_LOG, &mut diags);

    assert!(diags.is_empty(), "unexpected diagnostics: {:?}", diags.entries());
    assert_eq!(records.ranks.len(), 4);
    assert_eq!(records.numa_domains.len(), 2);
    assert_eq!(records.nics.len(), 2);
    assert_eq!(records.nic_selections.len(), 4);
    assert_eq!(records.threads.len(), 8);
    assert_eq!(records.declared_numa, Some(2));
    assert_eq!(records.declared_nics, Some(2));

    let ranks: Vec<(u64, &str)> = records
        .ranks
        .iter()
        .map(|r| (r.rank, r.node.as_str()))
        .collect();
    assert_eq!(
        ranks,
        vec![(0, "nid001"), (1, "nid001"), (2, "nid002"), (3, "nid002")]
    );

    let numa0 = &records.numa_domains[0];
    assert_eq!(numa0.numa, 0);
    assert_eq!(numa0.tokens, vec!["0-3".to_string(), "64-67".to_string()]);
    assert_eq!(numa0.cpus, BTreeSet::from([0, 1, 2, 3, 64, 65, 66, 67]));
    assert_eq!(numa0.line, 8);

    let nic1 = &records.nics[1];
    assert_eq!((nic1.index, nic1.name.as_str(), nic1.numa), (1, "cxi1", 1));
    assert_eq!(nic1.address, "0x1a2c");

    let sel = &records.nic_selections[3];
    assert_eq!(
        (sel.rank, sel.node.as_str(), sel.index, sel.name.as_str(), sel.numa),
        (3, "nid002", 1, "cxi1", 1)
    );

    let t = &records.threads[3];
    assert_eq!((t.node.as_str(), t.pid, t.thread, t.cpus), ("nid001", 2002, 1, [5, 69]));
}

#[test]
fn count_mismatch_is_reported_but_parsed_descriptors_are_kept() {
    let log = "\
PE 0:   Number of NUMA domains: 3
PE 0:   numa_domain 0: cpu_list=[0-3]
PE 0:   numa_domain 1: cpu_list=[4-7]
PE 0:   Number of NICs: 1
PE 0:   nic_index 0: domain_name=cxi0, numa_domain=0, addr=0x1
PE 0:   nic_index 1: domain_name=cxi1, numa_domain=1, addr=0x2
";
    let mut diags = Diagnostics::default();
    let records = ingest(log, &mut diags);

    assert_eq!(records.numa_domains.len(), 2);
    assert_eq!(records.nics.len(), 2);
    let mismatches: Vec<&Diagnostic> = diags.count_mismatches().collect();
    assert_eq!(
        mismatches,
        vec![
            &Diagnostic::CountMismatch {
                section: Section::NumaDomains,
                declared: 3,
                found: 2
            },
            &Diagnostic::CountMismatch {
                section: Section::Nics,
                declared: 1,
                found: 2
            },
        ]
    );
}

#[test]
fn descriptors_without_count_declaration_are_dropped() {
    let log = "PE 0:   numa_domain 0: cpu_list=[0-3]\n";
    let mut diags = Diagnostics::default();
    let records = ingest(log, &mut diags);

    assert!(records.numa_domains.is_empty());
    assert_eq!(diags.count_mismatches().count(), 1);
}

#[test]
fn malformed_lines_are_skipped_and_reported() {
    let log = "\
PE 0:   Number of NUMA domains: 1
PE 0:   numa_domain 0: cpu_list=[0-3,x]
[PE_0]: rank 1234567890123456789012345 is on nid001
[PE_1]: rank 1 is on nid001
";
    let mut diags = Diagnostics::default();
    let records = ingest(log, &mut diags);

    assert!(records.numa_domains.is_empty());
    assert_eq!(records.ranks.len(), 1);
    assert_eq!(records.ranks[0].rank, 1);

    let malformed: Vec<(usize, &str)> = diags
        .malformed()
        .map(|d| match d {
            Diagnostic::MalformedRecord { line, shape, .. } => (*line, *shape),
            _ => unreachable!(),
        })
        .collect();
    assert_eq!(malformed, vec![(2, "numa_domain"), (3, "rank_placement")]);
    // 声明 1 个，实际 0 个
    assert_eq!(diags.count_mismatches().count(), 1);
}

#[test]
fn unrelated_text_produces_nothing() {
    let log = "\
Starting job...
PE 10: some other launcher chatter
CCE OMP: OMP_PROC_BIND=spread
numa_domain 0: cpu_list=[0-3]
";
    let mut diags = Diagnostics::default();
    let records = ingest(log, &mut diags);
    assert!(records.is_empty());
    assert!(diags.is_empty());
}

#[test]
fn shape_table_order_is_stable() {
    let names: Vec<&str> = RecordShape::ALL.iter().map(|s| s.name()).collect();
    assert_eq!(
        names,
        vec![
            "rank_placement",
            "numa_count",
            "numa_domain",
            "nic_count",
            "nic",
            "nic_selection",
            "thread_affinity"
        ]
    );
    assert!(RecordShape::ThreadAffinity
        .regex()
        .is_match("CCE OMP: host nid9 pid 1 tid 2 thread 3 affinity:  4 5"));
}
