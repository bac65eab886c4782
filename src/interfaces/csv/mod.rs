pub mod seed_writer;
pub mod stats_writer;
