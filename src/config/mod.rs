//! Configuración del proyecto
//!
//! Este módulo contiene las variables de entorno y la configuración del
//! pipeline de conectividad.

pub mod environment;

pub use environment::*;
