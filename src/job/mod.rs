//! 作业视图
//!
//! 在已建好的硬件拓扑上叠加 MPI rank 与 OpenMP 线程的绑定关系。

mod model;
mod reconcile;

pub use model::{Job, JobLabel, MpiTask, OpenMpThread};
pub use reconcile::{PidMapping, reconcile_job};
