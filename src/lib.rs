pub mod cli;
pub mod combat;
pub mod data;
pub mod optimizer;
pub mod parallel;
pub mod server;
