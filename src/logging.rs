//! Bootstrap de `tracing` para el binario.
//!
//! Las librerías (`pipeflow-core`, `pipeflow-adapters`) sólo emiten eventos;
//! el subscriber se instala una única vez acá.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Instala el subscriber global: filtro de `RUST_LOG` si está definido, si no
/// `default_filter` (o `warn` si es inválido). Salida a stderr, formato
/// compacto, para no mezclar logs con el reporte en stdout.
///
/// Llamadas posteriores no hacen nada.
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_filter))
                                                  .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::registry().with(filter)
                                          .with(fmt::layer().with_writer(std::io::stderr).compact())
                                          .try_init();
}
