// Library surface for the napilsa binary and its integration tests.
pub mod analysis;
pub mod cli;
pub mod config;
pub mod evaluation;
pub mod logging;
pub mod sink;
pub mod submission;
pub mod testing;
