//! 端到端流程
//!
//! 文本 → 记录 → 硬件拓扑 → 作业 → 报告。配置值显式地传给每个阶段。

mod config;
mod pipeline;

pub use config::{AnalyzerConfig, View};
pub use pipeline::{Analysis, analyze, analyze_file, read_log};
