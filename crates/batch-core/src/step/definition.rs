use crate::errors::StepExecutionError;

use super::StepExecution;

/// Trait que define un Step ejecutable por un orquestador.
///
/// Un `Step` recibe un `StepExecution` en estado `Unstarted` y lo deja en un
/// estado terminal al volver, haya fallado o no.
pub trait Step {
    /// Nombre estable del step dentro del job.
    fn name(&self) -> &str;

    /// Ejecuta el step una sola vez sobre `execution`.
    fn execute(&mut self, execution: &mut StepExecution) -> Result<(), StepExecutionError>;
}
