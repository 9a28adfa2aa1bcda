//! 外部 BLAST 程序的调用

pub mod launcher;
pub mod runner;

pub use launcher::{ProcessLauncher, ProcessOutput, SystemLauncher};
pub use runner::{SearchPrograms, ToolRunner};
