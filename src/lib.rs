pub mod cli;
pub mod config;
pub mod format;
pub mod parser;
pub mod pipeline;
pub mod remote;
pub mod report;
pub mod severity;
pub mod util;
pub mod verdict;
