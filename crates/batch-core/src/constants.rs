//! Códigos de salida conocidos.
//!
//! Los códigos se persisten tal cual en la columna `exit_code`; cambiarlos
//! rompe la lectura de ejecuciones ya almacenadas.

/// Estado desconocido: valor inicial de un `StepExecution` recién creado.
pub const EXIT_UNKNOWN: &str = "UNKNOWN";
/// El step sigue en ejecución.
pub const EXIT_EXECUTING: &str = "EXECUTING";
/// El tasklet terminó su trabajo con normalidad.
pub const EXIT_COMPLETED: &str = "COMPLETED";
/// El tasklet terminó sin nada que procesar.
pub const EXIT_NOOP: &str = "NOOP";
/// Centinela de fallo. Es el valor que queda registrado salvo que el tasklet
/// termine correctamente.
pub const EXIT_FAILED: &str = "FAILED";

/// Separador usado al acumular descripciones de salida.
pub const EXIT_DESCRIPTION_SEPARATOR: &str = "; ";
