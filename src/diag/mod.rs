//! 错误与诊断
//!
//! 只有读不到输入文件（以及坏的配置文件）是致命错误；其余问题都记成
//! 诊断条目，由对应的 pass 丢弃受影响的记录后继续执行。

mod diagnostic;
mod error;

pub use diagnostic::{Diagnostic, Diagnostics, RefKind, Section};
pub use error::AnalyzeError;
