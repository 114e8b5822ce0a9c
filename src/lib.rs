pub mod analysis;
pub mod codec;
pub mod diag;
pub mod ingest;
pub mod job;
pub mod report;
pub mod topo;

#[cfg(test)]
mod test;
