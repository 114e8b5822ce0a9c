use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::diag::AnalyzeError;
use crate::report::TableLayout;
use crate::topo::BuildOpts;

/// 报告视图
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Table,
    Tree,
    Both,
}

/// 分析配置；可从 JSON 文件读取，缺省字段取默认值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// 超线程编号偏移，见 `BuildOpts::ht_stride`
    pub ht_stride: u32,
    /// 树形视图中逐个列出核与 CPU
    pub detailed_cpus: bool,
    pub verbose: bool,
    pub view: View,
    pub table: TableLayout,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            ht_stride: BuildOpts::default().ht_stride,
            detailed_cpus: false,
            verbose: false,
            view: View::default(),
            table: TableLayout::default(),
        }
    }
}

impl AnalyzerConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, AnalyzeError> {
        let raw = fs::read_to_string(path).map_err(|source| AnalyzeError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| AnalyzeError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn build_opts(&self) -> BuildOpts {
        BuildOpts {
            ht_stride: self.ht_stride,
        }
    }
}
