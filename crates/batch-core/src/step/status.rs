use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Estado de un `StepExecution`.
///
/// Las transiciones válidas son:
/// - `Unstarted` -> `Started`
/// - `Started` -> `Completed`
/// - `Started` -> `Failed`
///
/// No se permiten reversiones: una vez iniciada la ejecución nunca se vuelve a
/// `Unstarted` ni a `Started`, y `Completed`/`Failed` son terminales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// Registro creado, ejecución aún no iniciada.
    #[default]
    Unstarted,
    /// El tasklet está (o estuvo, si el proceso cayó) en ejecución.
    Started,
    /// El tasklet terminó correctamente.
    Completed,
    /// El tasklet (o el almacenamiento) falló.
    Failed,
}

impl BatchStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Started)
    }

    /// Representación estable usada en almacenamiento.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unstarted => "unstarted",
            Self::Started => "started",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unstarted" => Ok(Self::Unstarted),
            "started" => Ok(Self::Started),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("invalid batch status: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(!BatchStatus::Unstarted.is_terminal());
        assert!(!BatchStatus::Started.is_terminal());
        assert!(BatchStatus::Completed.is_terminal());
        assert!(BatchStatus::Failed.is_terminal());
        assert!(BatchStatus::Started.is_running());
    }

    #[test]
    fn storage_names_parse_back() {
        for status in [BatchStatus::Unstarted, BatchStatus::Started, BatchStatus::Completed, BatchStatus::Failed] {
            assert_eq!(status.as_str().parse::<BatchStatus>(), Ok(status));
        }
        assert!("running".parse::<BatchStatus>().is_err());
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&BatchStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
    }
}
