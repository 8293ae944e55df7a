//! Servicios de negocio
//!
//! Este módulo contiene la descarga del reporte, la carga de archivos y
//! la orquestación del pipeline de conectividad.

pub mod auth_service;
pub mod connectivity_service;
pub mod report_fetcher;
pub mod report_loader;
pub mod report_store;
pub mod roster_loader;

pub use connectivity_service::{ConnectivityService, ConnectivitySettings};
pub use report_fetcher::{DownloadedReport, ReportFetcher};
pub use report_store::ReportStore;
