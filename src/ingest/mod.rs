//! 日志解析
//!
//! 逐行扫描作业启动日志，按固定的形状表抽取五类记录：rank 所在节点、
//! NUMA 域描述、NIC 描述、每个 rank 选中的 NIC、OpenMP 线程亲和性。
//! 每类记录的抽取互不依赖，缺少某一段只影响下游对应的功能。

mod ingestor;
mod records;
mod shapes;

pub use ingestor::ingest;
pub use records::{
    LogRecords, NicRecord, NicSelectionRecord, NumaRecord, RankRecord, ThreadAffinityRecord,
};
pub use shapes::{Record, RecordShape};
