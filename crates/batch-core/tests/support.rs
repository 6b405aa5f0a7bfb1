//! Dobles de prueba compartidos: repositorios que registran o fallan y un
//! journal común para verificar el orden de las llamadas.
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use batch_core::{BatchStatus, BoxError, ExitStatus, JobRepository, RepositoryError, StepExecution, Tasklet};

pub type Journal = Rc<RefCell<Vec<String>>>;

pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

/// Repositorio que anota cada save en el journal y guarda los snapshots.
pub struct RecordingRepository {
    pub journal: Journal,
    pub saved: Vec<StepExecution>,
}

impl RecordingRepository {
    pub fn new(journal: Journal) -> Self {
        Self { journal, saved: Vec::new() }
    }

    pub fn statuses(&self) -> Vec<BatchStatus> {
        self.saved.iter().map(|e| e.status).collect()
    }
}

impl JobRepository for RecordingRepository {
    fn save_or_update(&mut self, execution: &StepExecution) -> Result<(), RepositoryError> {
        self.journal.borrow_mut().push(format!("save:{}", execution.status));
        self.saved.push(execution.clone());
        Ok(())
    }
}

/// Repositorio que falla en los saves cuyo índice (0-based) esté en
/// `fail_on`.
pub struct FailingRepository {
    pub fail_on: Vec<usize>,
    pub calls: usize,
    pub saved: Vec<StepExecution>,
}

impl FailingRepository {
    pub fn failing_on(fail_on: &[usize]) -> Self {
        Self { fail_on: fail_on.to_vec(),
               calls: 0,
               saved: Vec::new() }
    }

    pub fn statuses(&self) -> Vec<BatchStatus> {
        self.saved.iter().map(|e| e.status).collect()
    }
}

impl JobRepository for FailingRepository {
    fn save_or_update(&mut self, execution: &StepExecution) -> Result<(), RepositoryError> {
        let call = self.calls;
        self.calls += 1;
        if self.fail_on.contains(&call) {
            return Err(RepositoryError::Unavailable(format!("save #{call} refused")));
        }
        self.saved.push(execution.clone());
        Ok(())
    }
}

/// Tasklet que anota su invocación en el journal y devuelve un resultado fijo.
pub struct ScriptedTasklet {
    pub journal: Journal,
    pub result: Result<ExitStatus, String>,
}

impl Tasklet for ScriptedTasklet {
    fn execute(&self) -> Result<ExitStatus, BoxError> {
        self.journal.borrow_mut().push("tasklet".to_string());
        self.result.clone().map_err(BoxError::from)
    }
}
