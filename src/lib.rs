pub mod cli;
pub mod config;
pub mod driver;
pub mod plan;
pub mod report;
pub mod scan;
pub mod tool;
pub mod util;
