//! 非致命诊断的收集器

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// 带声明数量的日志段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    NumaDomains,
    Nics,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::NumaDomains => f.write_str("NUMA domains"),
            Section::Nics => f.write_str("NICs"),
        }
    }
}

/// 无法解析的交叉引用种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefKind {
    Cpu,
    Core,
    NumaDomain,
    Nic,
    Node,
    Rank,
    Process,
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RefKind::Cpu => "cpu",
            RefKind::Core => "core",
            RefKind::NumaDomain => "NUMA domain",
            RefKind::Nic => "NIC",
            RefKind::Node => "node",
            RefKind::Rank => "rank",
            RefKind::Process => "process",
        };
        f.write_str(s)
    }
}

/// 一条非致命诊断
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Diagnostic {
    #[error("line {line}: malformed {shape} record: {reason}")]
    MalformedRecord {
        line: usize,
        shape: &'static str,
        reason: String,
    },
    #[error("expected {declared} {section} but found {found}")]
    CountMismatch {
        section: Section,
        declared: usize,
        found: usize,
    },
    #[error("unresolved {kind}: {detail}")]
    UnresolvedReference { kind: RefKind, detail: String },
}

/// 各个 pass 共享的诊断收集器。
///
/// `push` 以 warn 级别记录，`push_quiet` 以 debug 级别记录；两者都会保留条目。
#[derive(Debug, Default, Clone, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn push(&mut self, diag: Diagnostic) {
        warn!("⚠️  {diag}");
        self.entries.push(diag);
    }

    pub fn push_quiet(&mut self, diag: Diagnostic) {
        debug!("{diag}");
        self.entries.push(diag);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count_mismatches(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| matches!(d, Diagnostic::CountMismatch { .. }))
    }

    pub fn unresolved(&self, kind: RefKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| {
            matches!(d, Diagnostic::UnresolvedReference { kind: k, .. } if *k == kind)
        })
    }

    pub fn malformed(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| matches!(d, Diagnostic::MalformedRecord { .. }))
    }
}
