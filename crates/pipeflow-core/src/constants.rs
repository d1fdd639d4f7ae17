//! Constantes del motor.
//!
//! `ENGINE_VERSION` participa en el `definition_hash` del reporte: un cambio de
//! versión del motor produce hashes distintos aunque la lista de steps sea la
//! misma.

/// Versión lógica del motor.
pub const ENGINE_VERSION: &str = "P1.0";

/// Longitud mínima de un pipeline válido.
pub const MIN_PIPELINE_STEPS: usize = 3;

/// Sufijo de la clave que escribe el fallback en `ExecutionContext::data`.
pub const FALLBACK_KEY_SUFFIX: &str = "_fallback";

/// Valor escrito por el fallback de errores de red.
pub const CACHED_FALLBACK_MARKER: &str = "cached";

/// Espera constante (segundos) de la estrategia `fixed`.
pub const FIXED_BACKOFF_SECS: u64 = 2;
