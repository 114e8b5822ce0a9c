use tracing::{debug, info, trace};

use super::records::LogRecords;
use super::shapes::{Record, RecordShape};
use crate::diag::{Diagnostic, Diagnostics, Section};

/// 扫描整段日志文本，抽取所有可识别的记录。
///
/// 未匹配任何形状的行直接忽略；匹配但无法解析的行记为 `MalformedRecord`。
/// 声明数量与实际描述条数不一致时记为 `CountMismatch`，继续使用已解析的条目；
/// 某段完全没有数量声明时，该段的描述被丢弃。
#[tracing::instrument(skip(text, diags), fields(bytes = text.len()))]
pub fn ingest(text: &str, diags: &mut Diagnostics) -> LogRecords {
    let mut records = LogRecords::default();

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        for shape in RecordShape::ALL {
            for caps in shape.regex().captures_iter(line) {
                match shape.extract(&caps, line_no) {
                    Ok(record) => {
                        trace!(line = line_no, shape = shape.name(), "匹配记录");
                        accept(&mut records, record);
                    }
                    Err(reason) => diags.push(Diagnostic::MalformedRecord {
                        line: line_no,
                        shape: shape.name(),
                        reason,
                    }),
                }
            }
        }
    }

    check_section(
        Section::NumaDomains,
        records.declared_numa,
        &mut records.numa_domains,
        diags,
    );
    check_section(
        Section::Nics,
        records.declared_nics,
        &mut records.nics,
        diags,
    );

    info!(
        ranks = records.ranks.len(),
        numa_domains = records.numa_domains.len(),
        nics = records.nics.len(),
        nic_selections = records.nic_selections.len(),
        threads = records.threads.len(),
        "📄 日志解析完成"
    );
    records
}

fn accept(records: &mut LogRecords, record: Record) {
    match record {
        Record::Rank(r) => records.ranks.push(r),
        Record::NumaCount(n) => declare(&mut records.declared_numa, n, Section::NumaDomains),
        Record::Numa(r) => records.numa_domains.push(r),
        Record::NicCount(n) => declare(&mut records.declared_nics, n, Section::Nics),
        Record::Nic(r) => records.nics.push(r),
        Record::NicSelection(r) => records.nic_selections.push(r),
        Record::ThreadAffinity(r) => records.threads.push(r),
    }
}

/// 只采用第一次出现的数量声明。
fn declare(slot: &mut Option<usize>, n: usize, section: Section) {
    match *slot {
        None => *slot = Some(n),
        Some(first) if first != n => {
            debug!(%section, first, ignored = n, "重复的数量声明，保留第一次");
        }
        Some(_) => {}
    }
}

fn check_section<T>(
    section: Section,
    declared: Option<usize>,
    descriptors: &mut Vec<T>,
    diags: &mut Diagnostics,
) {
    match declared {
        Some(declared) if declared != descriptors.len() => {
            diags.push(Diagnostic::CountMismatch {
                section,
                declared,
                found: descriptors.len(),
            });
        }
        Some(_) => {}
        None if descriptors.is_empty() => {
            debug!(%section, "日志中没有该段信息");
        }
        None => {
            diags.push(Diagnostic::CountMismatch {
                section,
                declared: 0,
                found: descriptors.len(),
            });
            descriptors.clear();
        }
    }
}
