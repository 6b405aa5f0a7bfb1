use crate::errors::BoxError;

use super::ExitStatus;

/// Unidad de trabajo que un `TaskletStep` ejecuta una única vez.
///
/// El tasklet gestiona por su cuenta transacciones, ciclos o I/O; el runner
/// sólo registra el resultado.
pub trait Tasklet {
    fn execute(&self) -> Result<ExitStatus, BoxError>;
}

impl<F> Tasklet for F where F: Fn() -> Result<ExitStatus, BoxError>
{
    fn execute(&self) -> Result<ExitStatus, BoxError> {
        self()
    }
}

/// Fija la firma de un closure para usarlo como `Tasklet` sin anotar tipos.
pub fn tasklet_fn<F>(f: F) -> F
    where F: Fn() -> Result<ExitStatus, BoxError>
{
    f
}
