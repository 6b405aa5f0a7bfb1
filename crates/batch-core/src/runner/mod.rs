//! Protocolo de ejecución de un step.
//!
//! `execute` lleva un `StepExecution` de `Unstarted` a un estado terminal:
//! 1. fija `start_time` y guarda el checkpoint `Started`;
//! 2. invoca el tasklet (una sola vez);
//! 3. guarda el checkpoint `Completed` o `Failed`;
//! 4. siempre: copia el `ExitStatus`, fija `end_time` y guarda el checkpoint
//!    terminal.
//!
//! Un monitor que lea el repositorio a mitad de la ejecución distingue así un
//! step que cayó tras iniciar (estado congelado en `Started`) de uno que llegó
//! a un estado terminal.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use chrono::Utc;
use log::{debug, error, warn};

use crate::errors::{BatchCriticalError, RepositoryError, StepExecutionError, TaskletFailure};
use crate::repo::JobRepository;
use crate::step::{BatchStatus, ExitStatus, StepExecution, Tasklet};

/// Resultado de la fase principal, antes del checkpoint terminal.
enum Outcome {
    Completed,
    TaskletFailed(TaskletFailure),
    StorageFailed(RepositoryError),
}

/// Ejecuta `tasklet` una vez sobre `execution`, persistiendo cada transición
/// en `repository`.
///
/// Devuelve:
/// - `Ok(())`: el registro quedó `Completed` con el `ExitStatus` reportado.
/// - `Err(StepExecutionError::Critical)`: el tasklet falló (o hizo panic) y el
///   registro quedó `Failed` con `ExitStatus::failed()` en todos los
///   checkpoints.
/// - `Err(StepExecutionError::Repository)`: algún checkpoint no pudo
///   guardarse. Se devuelve el primer error de almacenamiento sin envolver. Si
///   falló el checkpoint `Started` el tasklet no se invoca. Si sólo falla el
///   checkpoint terminal tras un `Completed` durable, el registro queda
///   `Completed`.
///
/// En todos los casos el checkpoint terminal se intenta y `end_time` queda
/// fijado.
pub fn execute<T, R>(execution: &mut StepExecution, tasklet: &T, repository: &mut R) -> Result<(), StepExecutionError>
    where T: Tasklet + ?Sized,
          R: JobRepository + ?Sized
{
    let started_at = Utc::now();
    execution.start_time = Some(started_at);

    let mut exit_status = ExitStatus::failed();
    let outcome = match update_status(execution, BatchStatus::Started, repository) {
        Err(e) => {
            execution.status = BatchStatus::Failed;
            Outcome::StorageFailed(e)
        }
        Ok(()) => match run_tasklet(tasklet) {
            Ok(reported) => match update_status(execution, BatchStatus::Completed, repository) {
                Ok(()) => {
                    exit_status = reported;
                    Outcome::Completed
                }
                // Sin checkpoint `Completed` el step no terminó.
                Err(e) => {
                    execution.status = BatchStatus::Failed;
                    Outcome::StorageFailed(e)
                }
            },
            Err(failure) => {
                error!("step '{}' ({}): encountered an error running the tasklet: {failure}",
                       execution.step_name,
                       execution.id);
                match update_status(execution, BatchStatus::Failed, repository) {
                    Ok(()) => Outcome::TaskletFailed(failure),
                    Err(e) => Outcome::StorageFailed(e),
                }
            }
        },
    };

    execution.exit_status = exit_status;
    execution.end_time = Some(Utc::now().max(started_at));
    let terminal = repository.save_or_update(execution);
    debug!("step '{}' ({}): terminal checkpoint status={} exit={} saved={}",
           execution.step_name,
           execution.id,
           execution.status,
           execution.exit_status,
           terminal.is_ok());

    match (outcome, terminal) {
        (Outcome::Completed, Ok(())) => Ok(()),
        (Outcome::TaskletFailed(failure), Ok(())) => {
            Err(BatchCriticalError::new(execution.step_name.clone(), failure).into())
        }
        (Outcome::StorageFailed(first), Ok(())) => Err(first.into()),
        (Outcome::Completed, Err(e)) => Err(e.into()),
        (Outcome::TaskletFailed(failure), Err(e)) => {
            error!("step '{}' ({}): tasklet failure not durably recorded: {failure}",
                   execution.step_name,
                   execution.id);
            Err(e.into())
        }
        (Outcome::StorageFailed(first), Err(e)) => {
            warn!("step '{}' ({}): terminal checkpoint also failed: {e}",
                  execution.step_name,
                  execution.id);
            Err(first.into())
        }
    }
}

fn update_status<R>(execution: &mut StepExecution, status: BatchStatus, repository: &mut R) -> Result<(), RepositoryError>
    where R: JobRepository + ?Sized
{
    execution.status = status;
    debug!("step '{}' ({}): checkpoint status={status}", execution.step_name, execution.id);
    repository.save_or_update(execution)
}

/// Invoca el tasklet convirtiendo un panic en `TaskletFailure::Panicked`.
fn run_tasklet<T>(tasklet: &T) -> Result<ExitStatus, TaskletFailure>
    where T: Tasklet + ?Sized
{
    match panic::catch_unwind(AssertUnwindSafe(|| tasklet.execute())) {
        Ok(Ok(exit_status)) => Ok(exit_status),
        Ok(Err(e)) => Err(TaskletFailure::Error(e)),
        Err(payload) => Err(TaskletFailure::Panicked(panic_message(payload))),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::BoxError;
    use crate::repo::InMemoryJobRepository;
    use crate::step::tasklet_fn;
    use uuid::Uuid;

    #[test]
    fn panic_message_from_str_and_string() {
        assert_eq!(panic_message(Box::new("boom")), "boom");
        assert_eq!(panic_message(Box::new(String::from("bang"))), "bang");
        assert_eq!(panic_message(Box::new(7u8)), "non-string panic payload");
    }

    #[test]
    fn panicking_tasklet_is_reported_as_critical() {
        let mut repo = InMemoryJobRepository::new();
        let mut execution = StepExecution::new("panics", Uuid::new_v4());
        let tasklet = tasklet_fn(|| -> Result<ExitStatus, BoxError> { panic!("tasklet exploded") });

        let err = execute(&mut execution, &tasklet, &mut repo).expect_err("panic must surface as error");

        let critical = err.as_critical().expect("critical failure");
        assert!(critical.cause().is_panic());
        assert_eq!(critical.cause().to_string(), "tasklet panicked: tasklet exploded");
        assert_eq!(execution.status, BatchStatus::Failed);
        assert!(execution.exit_status.is_failed());
        assert!(execution.end_time.is_some());
        assert_eq!(repo.status_history(execution.id),
                   vec![BatchStatus::Started, BatchStatus::Failed, BatchStatus::Failed]);
    }

    #[test]
    fn end_time_is_not_before_start_time() {
        let mut repo = InMemoryJobRepository::new();
        let mut execution = StepExecution::new("quick", Uuid::new_v4());
        execute(&mut execution, &tasklet_fn(|| Ok(ExitStatus::noop())), &mut repo).expect("completes");
        assert!(execution.start_time <= execution.end_time);
        assert!(execution.duration().map(|d| d >= chrono::Duration::zero()).unwrap_or(false));
    }
}
