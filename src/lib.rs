//! Academic performance engine: turns raw, partial grade entries into subject
//! finals, a period GPA and standing, a GPA trend, attendance figures, and a
//! risk assessment with recommendations.
//!
//! All computation is pure. [`report::ReportCompiler`] is the entry point for a
//! single student and period; [`batch::compile_batch`] maps it over a class.

pub mod attendance;
pub mod batch;
pub mod cohort;
pub mod config;
pub mod error;
pub mod gpa;
pub mod grades;
pub mod input;
pub mod models;
pub mod report;
pub mod risk;
pub mod trend;

pub use batch::{compile_batch, BatchEntry, SkippedSubject};
pub use config::EngineConfig;
pub use error::{GradingError, ReportError};
pub use grades::{SubjectAggregator, WeightTable};
pub use models::*;
pub use report::ReportCompiler;
