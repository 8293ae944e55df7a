//! Dashboard de conectividad de flota
//!
//! Clasifica la frescura de telemetría CAN y GPS de cada unidad del
//! reporte diario, filtra por el roster maestro y expone KPIs vía HTTP.

pub mod analysis;
pub mod cache;
pub mod client;
pub mod config;
pub mod controllers;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
