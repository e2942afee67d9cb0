//! CLIとビューアで共有する出力モジュール

#[cfg(feature = "excel")]
pub mod excel_core;
