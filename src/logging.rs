//! Log output setup.
//!
//! The codec only talks to the `log` facade. Embedding applications that have
//! no logger of their own can call [`enable_verbose_logging`] once at startup.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Once;

use log::LevelFilter;

use crate::error::CodecError;

static INIT_LOGGER: Once = Once::new();

/// Installs an `env_logger` at `level`, printing `[LEVEL] message` lines to
/// stderr, or appending them to `log_file` when given.
///
/// Only the first call does anything; later calls return `Ok(())` without
/// touching `log_file`. If the first call cannot open `log_file`, the error is
/// returned and no logger is installed.
pub fn enable_verbose_logging(level: LevelFilter, log_file: Option<&Path>) -> Result<(), CodecError> {
    let mut result = Ok(());

    INIT_LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();

        builder.is_test(false);
        builder.filter_level(level);

        builder.format(|buf, record| {
            writeln!(buf, "[{}] {}", record.level(), record.args())?;
            buf.flush()?;
            Ok(())
        });

        if let Some(path) = log_file {
            match open_log_file(path) {
                Ok(file) => {
                    builder.target(env_logger::Target::Pipe(Box::new(file)));
                }
                Err(e) => {
                    result = Err(CodecError::Io(e));
                    return;
                }
            }
        }

        let _ = builder.try_init();
    });
    result
}

fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().append(true).create(true).open(path)
}
