//! Análisis de conectividad
//!
//! Núcleo puro del pipeline: resolución de columnas, normalización de
//! timestamps, clasificación por antigüedad, filtro por roster y KPIs.

pub mod aggregator;
pub mod classifier;
pub mod columns;
pub mod enricher;
pub mod roster_filter;
pub mod timestamps;

pub use aggregator::{summarize, KpiThresholds};
pub use classifier::{classify, ReferenceDate};
pub use enricher::enrich;
pub use roster_filter::SearchQuery;
pub use timestamps::normalize_report;
