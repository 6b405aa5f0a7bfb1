use crate::errors::StepExecutionError;
use crate::repo::JobRepository;
use crate::runner::execute;

use super::{Step, StepExecution, Tasklet};

/// `Step` que ejecuta un `Tasklet` directamente.
///
/// No gestiona transacciones ni ciclos: el tasklet se encarga de eso. El step
/// sólo aplica el protocolo de checkpoints contra su `JobRepository`.
#[derive(Debug)]
pub struct TaskletStep<T, R>
    where T: Tasklet,
          R: JobRepository
{
    name: String,
    tasklet: T,
    repository: R,
}

impl<T, R> TaskletStep<T, R>
    where T: Tasklet,
          R: JobRepository
{
    pub fn new(name: impl Into<String>, tasklet: T, repository: R) -> Self {
        Self { name: name.into(),
               tasklet,
               repository }
    }

    pub fn tasklet(&self) -> &T {
        &self.tasklet
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn repository_mut(&mut self) -> &mut R {
        &mut self.repository
    }

    pub fn into_parts(self) -> (T, R) {
        (self.tasklet, self.repository)
    }
}

impl<T, R> Step for TaskletStep<T, R>
    where T: Tasklet,
          R: JobRepository
{
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&mut self, execution: &mut StepExecution) -> Result<(), StepExecutionError> {
        execute(execution, &self.tasklet, &mut self.repository)
    }
}
