mod analysis;
mod codec;
mod fixtures;
mod ingest;
