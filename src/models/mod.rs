//! Modelos de datos
//!
//! Este módulo contiene los registros del reporte, el roster maestro
//! y los KPIs de conectividad.

pub mod analytics;
pub mod connectivity;
pub mod report;
pub mod roster;
pub mod vehicle;

pub use analytics::*;
pub use connectivity::*;
pub use report::*;
pub use roster::*;
pub use vehicle::*;
