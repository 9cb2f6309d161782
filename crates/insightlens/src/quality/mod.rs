//! Data quality analysis module.
//!
//! This module provides the rule-based validators (missingness, type
//! consistency, duplicates, IQR outliers, descriptive statistics) and the
//! analyzer that combines them into one summary.

mod analyzer;
mod validators;

pub use analyzer::DataQualityAnalyzer;
pub use validators::{
    DescriptiveStatsReport, DescriptiveStatsValidator, DuplicateDetector, DuplicateReport,
    IqrOutlierDetector, MissingnessReport, MissingnessValidator, OutlierReport, Rule,
    TypeConsistencyReport, TypeConsistencyValidator, Validator,
};
