use std::fs;
use std::path::Path;

use tracing::{info, warn};

use super::config::{AnalyzerConfig, View};
use crate::diag::{AnalyzeError, Diagnostics};
use crate::ingest::{LogRecords, ingest};
use crate::job::{Job, JobLabel, reconcile_job};
use crate::report::{ReportSnapshot, render_table, render_tree};
use crate::topo::{Cluster, build_cluster};

/// 一次分析的全部产物。拓扑在作业构建之前完成，此后只读。
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub records: LogRecords,
    pub cluster: Cluster,
    pub job: Job,
    pub diagnostics: Diagnostics,
}

impl Analysis {
    /// 没有任何输入时的空报告
    pub fn empty(label: JobLabel) -> Self {
        Self {
            job: Job {
                label,
                tasks: Vec::new(),
            },
            ..Self::default()
        }
    }

    pub fn render(&self, cfg: &AnalyzerConfig) -> String {
        let table = || render_table(&self.cluster, &self.job, &cfg.table);
        let tree = || render_tree(&self.cluster, &self.job, cfg.detailed_cpus);
        match cfg.view {
            View::Table => table(),
            View::Tree => tree(),
            View::Both => format!("{}\n{}", table(), tree()),
        }
    }

    pub fn snapshot(&self, cfg: &AnalyzerConfig) -> ReportSnapshot<'_> {
        ReportSnapshot::new(&self.cluster, &self.job, &self.diagnostics, &cfg.table)
    }

    /// 表格中带 NIC/NUMA 不匹配标记的任务数
    pub fn mismatch_count(&self) -> usize {
        self.job
            .tasks
            .iter()
            .filter(|t| t.nics.iter().any(|&nic| t.nic_numa_mismatch(&self.cluster, nic)))
            .count()
    }
}

/// 读取输入文件；这是唯一的致命错误来源。
pub fn read_log(path: &Path) -> Result<String, AnalyzeError> {
    fs::read_to_string(path).map_err(|source| AnalyzeError::MissingFile {
        path: path.to_path_buf(),
        source,
    })
}

#[tracing::instrument(skip(text, label, cfg), fields(job = label.id, bytes = text.len()))]
pub fn analyze(text: &str, label: JobLabel, cfg: &AnalyzerConfig) -> Analysis {
    let mut diagnostics = Diagnostics::default();
    let records = ingest(text, &mut diagnostics);
    if records.is_empty() {
        warn!("📭 日志中没有可识别的记录，输出空报告");
    }
    let cluster = build_cluster(&records, &cfg.build_opts(), &mut diagnostics);
    let job = reconcile_job(&records, &cluster, label, &mut diagnostics);
    info!(
        nodes = cluster.node_count(),
        tasks = job.num_tasks(),
        diagnostics = diagnostics.len(),
        "✅ 分析完成"
    );
    Analysis {
        records,
        cluster,
        job,
        diagnostics,
    }
}

pub fn analyze_file(path: &Path, cfg: &AnalyzerConfig) -> Result<Analysis, AnalyzeError> {
    let text = read_log(path)?;
    Ok(analyze(&text, JobLabel::from_path(path), cfg))
}
