//! Descriptor de salida reportado por un tasklet.
//!
//! El runner lo almacena tal cual en el `StepExecution`; no interpreta el
//! código salvo para inicializar el centinela `FAILED`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    EXIT_COMPLETED, EXIT_DESCRIPTION_SEPARATOR, EXIT_EXECUTING, EXIT_FAILED, EXIT_NOOP, EXIT_UNKNOWN,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExitStatus {
    pub exit_code: String,
    #[serde(default)]
    pub exit_description: String,
}

impl ExitStatus {
    pub fn new(exit_code: impl Into<String>) -> Self {
        Self { exit_code: exit_code.into(),
               exit_description: String::new() }
    }

    pub fn unknown() -> Self {
        Self::new(EXIT_UNKNOWN)
    }

    pub fn executing() -> Self {
        Self::new(EXIT_EXECUTING)
    }

    pub fn completed() -> Self {
        Self::new(EXIT_COMPLETED)
    }

    pub fn noop() -> Self {
        Self::new(EXIT_NOOP)
    }

    /// Centinela usado por el runner mientras el tasklet no reporte éxito.
    pub fn failed() -> Self {
        Self::new(EXIT_FAILED)
    }

    /// Copia con la descripción reemplazada.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.exit_description = description.into();
        self
    }

    /// Copia con `description` agregada a la descripción existente (separada
    /// por `"; "`). Descripciones vacías no se agregan.
    pub fn add_exit_description(mut self, description: &str) -> Self {
        if description.is_empty() {
            return self;
        }
        if !self.exit_description.is_empty() {
            self.exit_description.push_str(EXIT_DESCRIPTION_SEPARATOR);
        }
        self.exit_description.push_str(description);
        self
    }

    /// Copia con otro código, conservando la descripción.
    pub fn replace_exit_code(mut self, exit_code: impl Into<String>) -> Self {
        self.exit_code = exit_code.into();
        self
    }

    pub fn is_failed(&self) -> bool {
        self.exit_code == EXIT_FAILED
    }
}

impl Default for ExitStatus {
    fn default() -> Self {
        Self::unknown()
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exit_description.is_empty() {
            write!(f, "{}", self.exit_code)
        } else {
            write!(f, "{} ({})", self.exit_code, self.exit_description)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptions_accumulate_with_separator() {
        let status = ExitStatus::completed().add_exit_description("read 10")
                                            .add_exit_description("")
                                            .add_exit_description("wrote 9");
        assert_eq!(status.exit_description, "read 10; wrote 9");
        assert_eq!(status.to_string(), "COMPLETED (read 10; wrote 9)");
    }

    #[test]
    fn replace_code_keeps_description() {
        let status = ExitStatus::noop().with_description("empty input").replace_exit_code("SKIPPED");
        assert_eq!(status.exit_code, "SKIPPED");
        assert_eq!(status.exit_description, "empty input");
    }

    #[test]
    fn sentinel_is_failed() {
        assert!(ExitStatus::failed().is_failed());
        assert!(!ExitStatus::completed().is_failed());
        assert_eq!(ExitStatus::default(), ExitStatus::unknown());
    }
}
