use std::io;
use std::path::PathBuf;
use std::process::Command;

use batch_core::{BoxError, ExitStatus, Tasklet};
use log::debug;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("'{program}' exited with code {code}")]
    NonZeroExit { program: String, code: i32 },
    #[error("'{program}' was terminated by a signal")]
    Terminated { program: String },
}

/// Ejecuta un programa externo de forma síncrona.
///
/// Código de salida 0 → `ExitStatus::completed()`; cualquier otro resultado es
/// una falla del tasklet.
#[derive(Debug, Clone)]
pub struct CommandTasklet {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl CommandTasklet {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into(),
               args: Vec::new(),
               working_dir: None }
    }

    /// Construye a partir de `[program, args...]`; `None` si está vacío.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone()).args(args.iter().cloned()))
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Tasklet for CommandTasklet {
    fn execute(&self) -> Result<ExitStatus, BoxError> {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        debug!("spawning {} {:?}", self.program, self.args);
        let status = command.status().map_err(|source| CommandError::Spawn { program: self.program.clone(),
                                                                             source })?;
        match status.code() {
            Some(0) => Ok(ExitStatus::completed().with_description("exit code 0")),
            Some(code) => Err(CommandError::NonZeroExit { program: self.program.clone(),
                                                          code }.into()),
            None => Err(CommandError::Terminated { program: self.program.clone() }.into()),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn zero_exit_is_completed() {
        let status = CommandTasklet::new("true").execute().expect("true succeeds");
        assert_eq!(status, ExitStatus::completed().with_description("exit code 0"));
    }

    #[test]
    fn non_zero_exit_is_a_failure() {
        let err = CommandTasklet::new("sh").arg("-c").arg("exit 3").execute().unwrap_err();
        assert_eq!(err.to_string(), "'sh' exited with code 3");
    }

    #[test]
    fn missing_program_is_a_spawn_failure() {
        let err = CommandTasklet::new("definitely-not-a-real-program-xyz").execute().unwrap_err();
        assert!(matches!(err.downcast_ref::<CommandError>(), Some(CommandError::Spawn { .. })));
    }

    #[test]
    fn from_argv_splits_program_and_args() {
        let argv = vec!["echo".to_string(), "a".to_string(), "b".to_string()];
        let tasklet = CommandTasklet::from_argv(&argv).expect("non-empty");
        assert_eq!(tasklet.program(), "echo");
        assert_eq!(tasklet.args, vec!["a", "b"]);
        assert!(CommandTasklet::from_argv(&[]).is_none());
    }
}
