//! Contexto compartido de una ejecución.
//!
//! Es un pizarrón (`data`) más la metadata de la ejecución, el registro por
//! step y el log de errores. No tiene lógica propia más allá de las reglas de
//! almacenamiento y merge.
//!
//! `data` guarda valores JSON opacos: nada ata una clave a un tipo en
//! compilación, así que los steps acuerdan fuera de banda qué hay en cada
//! clave. Leer una clave todavía no escrita devuelve `None`.
//!
//! No hay sincronización: el orquestador presta `&mut ExecutionContext` a un
//! único step a la vez.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::Value;
use uuid::Uuid;

use super::{RecordStatus, RecordedError, RunMetadata, StepRecord};
use crate::errors::StepError;

#[derive(Debug, Clone)]
pub struct ExecutionContext {
    id: Uuid,
    data: HashMap<String, Value>,
    pub(crate) metadata: RunMetadata,
    step_outputs: IndexMap<String, StepRecord>,
    errors: Vec<RecordedError>,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self { id: Uuid::new_v4(),
               data: HashMap::new(),
               metadata: RunMetadata::default(),
               step_outputs: IndexMap::new(),
               errors: Vec::new() }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Escribe (o sobrescribe) una clave del pizarrón.
    pub fn set_data(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
    }

    pub fn get_data(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn data(&self) -> &HashMap<String, Value> {
        &self.data
    }

    /// Guarda la salida de un step.
    ///
    /// Si el step no tiene registro se crea uno `Completed` con ambas marcas
    /// de tiempo en "ahora". Si ya existe sólo se reemplaza `output`; estado,
    /// tiempos y error se conservan.
    pub fn set_step_output(&mut self, name: &str, output: Value) {
        match self.step_outputs.get_mut(name) {
            Some(record) => record.output = output,
            None => {
                self.step_outputs.insert(name.to_string(), StepRecord::completed_now(output));
            }
        }
    }

    pub fn get_step_output(&self, name: &str) -> Option<&StepRecord> {
        self.step_outputs.get(name)
    }

    /// Registros en el orden en que cada step fue registrado por primera vez.
    pub fn step_outputs(&self) -> &IndexMap<String, StepRecord> {
        &self.step_outputs
    }

    pub fn metadata(&self) -> &RunMetadata {
        &self.metadata
    }

    /// Log de fallos, append-only.
    pub fn errors(&self) -> &[RecordedError] {
        &self.errors
    }

    /// Agrega un fallo al log sin tocar contadores.
    pub(crate) fn record_error(&mut self, error: RecordedError) {
        self.errors.push(error);
    }

    /// Crea o refresca el registro de un step que entra en ejecución.
    pub(crate) fn begin_step(&mut self, name: &str, at: DateTime<Utc>) {
        self.step_outputs.insert(name.to_string(), StepRecord::running(at));
    }

    pub(crate) fn complete_step(&mut self, name: &str, output: Value, at: DateTime<Utc>) {
        if let Some(record) = self.step_outputs.get_mut(name) {
            record.status = RecordStatus::Completed;
            record.output = output;
            record.error = None;
            record.end_time = Some(at);
            record.duration_ms = Some((at - record.start_time).num_milliseconds());
        }
    }

    pub(crate) fn fail_step(&mut self, name: &str, error: &StepError, at: DateTime<Utc>) {
        if let Some(record) = self.step_outputs.get_mut(name) {
            record.status = RecordStatus::Failed;
            record.error = Some(error.to_string());
            record.end_time = Some(at);
            record.duration_ms = Some((at - record.start_time).num_milliseconds());
        }
    }
}
