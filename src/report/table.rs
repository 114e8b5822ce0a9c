//! 表格视图
//!
//! 每个 MPI 任务一行。选中的 NIC 不在任务 CPU 覆盖的 NUMA 域上时，
//! NIC 列追加 ` *` 标记，并在表后输出图例。

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::job::{Job, MpiTask};
use crate::topo::Cluster;

pub const MISMATCH_MARKER: &str = " *";
pub const MISMATCH_LEGEND: &str = "* - MPI task's selected NIC is on a different NUMA domain than its cores (NUMA domain mismatch, potential performance issue)";

const COLUMN_TITLES: [&str; 6] = [
    "Node name",
    "MPI ranks",
    "Cores (total)",
    "Core NUMA",
    "NIC ID",
    "NIC NUMA",
];

/// 单列宽度范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnWidth {
    pub min: usize,
    pub max: usize,
}

impl ColumnWidth {
    /// `clamp(max(observed, min), max)`；`max < min` 时以 `max` 为准
    pub fn fit(&self, observed: usize) -> usize {
        observed.max(self.min).min(self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableLayout {
    /// 依次为 Node name / MPI ranks / Cores / Core NUMA / NIC ID / NIC NUMA
    pub widths: [ColumnWidth; 6],
    /// CPU 区间串超过该长度时截断并以 `...` 结尾
    pub cpu_budget: usize,
    /// rank 补零后的位数
    pub rank_digits: usize,
}

impl Default for TableLayout {
    fn default() -> Self {
        let w = |min, max| ColumnWidth { min, max };
        Self {
            widths: [w(10, 15), w(6, 10), w(25, 31), w(9, 12), w(12, 12), w(8, 10)],
            cpu_budget: 25,
            rank_digits: 3,
        }
    }
}

/// 表格中的一行，同时用于 JSON 快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskRow {
    pub node: String,
    pub rank: String,
    pub cpu_ranges: String,
    pub cpu_count: usize,
    pub numa_ids: Vec<u32>,
    pub nics: Vec<String>,
    pub nic_numa_ids: Vec<u32>,
    pub flagged: bool,
    #[serde(skip)]
    cores_cell: String,
}

impl TaskRow {
    fn from_task(cluster: &Cluster, task: &MpiTask, layout: &TableLayout) -> Self {
        let cpu_ranges = codec::encode(task.cpu_ids(cluster));
        let cores_cell = format!(
            "{} ({})",
            truncate(&cpu_ranges, layout.cpu_budget),
            task.cpus.len()
        );
        let flagged = task
            .nics
            .iter()
            .any(|&nic| task.nic_numa_mismatch(cluster, nic));
        Self {
            node: cluster.node(task.node).name.clone(),
            rank: format!("{:0width$}", task.id, width = layout.rank_digits),
            cpu_ranges,
            cpu_count: task.cpus.len(),
            numa_ids: task.numa_ids(cluster).into_iter().collect(),
            nics: task
                .nics
                .iter()
                .map(|&nic| cluster.nic(nic).name.clone())
                .collect(),
            nic_numa_ids: task
                .nics
                .iter()
                .map(|&nic| cluster.numa(cluster.nic(nic).numa).id)
                .collect(),
            flagged,
            cores_cell,
        }
    }

    fn cells(&self) -> [String; 6] {
        let mut nic = self.nics.join(", ");
        if self.flagged {
            nic.push_str(MISMATCH_MARKER);
        }
        [
            self.node.clone(),
            self.rank.clone(),
            self.cores_cell.clone(),
            join_ids(&self.numa_ids),
            nic,
            join_ids(&self.nic_numa_ids),
        ]
    }
}

fn join_ids(ids: &[u32]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// 结果不超过 `budget` 个字符；预算放不下 `...` 时直接截断
fn truncate(s: &str, budget: usize) -> String {
    if s.chars().count() <= budget {
        return s.to_string();
    }
    if budget < 3 {
        return s.chars().take(budget).collect();
    }
    let keep = budget.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// 按任务 id 升序生成表格行
pub fn task_rows(cluster: &Cluster, job: &Job, layout: &TableLayout) -> Vec<TaskRow> {
    let mut tasks: Vec<&MpiTask> = job.tasks.iter().collect();
    tasks.sort_by_key(|t| t.id);
    tasks
        .into_iter()
        .map(|t| TaskRow::from_task(cluster, t, layout))
        .collect()
}

/// 渲染完整表格（含边框、两行表头和必要时的图例）
pub fn render_table(cluster: &Cluster, job: &Job, layout: &TableLayout) -> String {
    let task_rows = task_rows(cluster, job, layout);
    let rows: Vec<[String; 6]> = task_rows.iter().map(TaskRow::cells).collect();

    let widths: Vec<usize> = (0..COLUMN_TITLES.len())
        .map(|i| {
            let observed = rows
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(COLUMN_TITLES[i].len()))
                .max()
                .unwrap_or(0);
            layout.widths[i].fit(observed)
        })
        .collect();

    let groups: [(String, &[usize]); 4] = [
        ("Node".to_string(), &[0]),
        ("MPI".to_string(), &[1]),
        (
            format!(
                "{} x {} cores x {} threads",
                cluster.node_count(),
                cluster.cores_per_node(),
                cluster.threads_per_core()
            ),
            &[2, 3],
        ),
        (
            format!("NIC ({} avail)", cluster.unique_nic_names().len()),
            &[4, 5],
        ),
    ];

    let total_width = widths.iter().sum::<usize>() + widths.len() * 3 + 1;
    let border = "=".repeat(total_width);
    let separator: String = std::iter::once("|".to_string())
        .chain(widths.iter().map(|w| format!("-{}-|", "-".repeat(*w))))
        .collect();

    let mut out = String::new();
    let _ = writeln!(out, "{border}");

    out.push('|');
    for (title, cols) in &groups {
        let span = cols.iter().map(|&c| widths[c]).sum::<usize>() + (cols.len() - 1) * 3;
        let _ = write!(out, " {title:<span$} |");
    }
    out.push('\n');

    let _ = writeln!(out, "{separator}");
    push_row(&mut out, &COLUMN_TITLES.map(str::to_string), &widths);
    let _ = writeln!(out, "{separator}");
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    let _ = writeln!(out, "{border}");

    if task_rows.iter().any(|r| r.flagged) {
        let _ = write!(out, "\nLegend:\n{MISMATCH_LEGEND}\n");
    }
    out
}

fn push_row(out: &mut String, cells: &[String; 6], widths: &[usize]) {
    out.push('|');
    for (cell, &w) in cells.iter().zip(widths) {
        let _ = write!(out, " {cell:<w$} |");
    }
    out.push('\n');
}
