//! tm-screen 共通ライブラリ
//!
//! CLIとデスクトップビューアで共有するレポートのスキーマと補助関数

pub mod error;
pub mod export;
pub mod filter;
pub mod report_file;
pub mod summary;
pub mod types;

pub use error::{Error, Result};
pub use filter::{sort_by_score, RowFilter, ScoreOrder};
pub use report_file::{read_report, write_report};
pub use summary::{summarize, TargetSummary};
pub use types::{MarkStatus, ReportRow, Verdict, CLASS_COLUMNS, EXACT_STEM, REPORT_COLUMNS};
