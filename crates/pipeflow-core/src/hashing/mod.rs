//! Huella de la definición de un pipeline: JSON canónico (claves ordenadas)
//! hasheado con blake3.

mod canonical_json;
mod hash;

pub use canonical_json::to_canonical_json;
pub use hash::{hash_str, hash_value};
