//! 报告输出
//!
//! 只读地消费构建完成的拓扑与作业：每个 rank 一行的表格、树形结构、
//! 汇总统计，以及供脚本使用的 JSON 快照。

mod snapshot;
mod summary;
mod table;
mod tree;

pub use snapshot::{NodeView, NumaView, ReportSnapshot};
pub use summary::{JobStats, format_avg};
pub use table::{ColumnWidth, MISMATCH_LEGEND, MISMATCH_MARKER, TableLayout, TaskRow, render_table, task_rows};
pub use tree::render_tree;
