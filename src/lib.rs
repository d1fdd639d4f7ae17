//! Pipeflow Rust Library
//!
//! Capa de aplicación sobre `pipeflow-core` y `pipeflow-adapters`:
//! - `config`: política de errores y nivel de log desde el entorno (.env).
//! - `errors`: `AppError` y códigos de salida.
//! - `logging`: bootstrap de `tracing-subscriber`.
//! - `runner`: carga de definiciones JSON y ejecución.
//!
//! Puede usarse desde `main.rs` o por otros crates/clientes.

pub mod config;
pub mod errors;
pub mod logging;
pub mod runner;
