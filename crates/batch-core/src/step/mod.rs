//! Definiciones relacionadas a Steps.
//!
//! Un step ejecuta una única unidad de trabajo (`Tasklet`) y deja constancia
//! de su ciclo de vida en un `StepExecution`. Este módulo define:
//! - `BatchStatus` y `ExitStatus`: estado del ciclo de vida y resultado
//!   reportado.
//! - `StepExecution`: el registro mutable que se persiste.
//! - `Tasklet`: la unidad de trabajo.
//! - `Step` y `TaskletStep`: la interfaz usada por un orquestador.

mod definition;
mod execution;
mod exit_status;
mod status;
mod tasklet;
mod tasklet_step;

pub use definition::Step;
pub use execution::StepExecution;
pub use exit_status::ExitStatus;
pub use status::BatchStatus;
pub use tasklet::{tasklet_fn, Tasklet};
pub use tasklet_step::TaskletStep;
