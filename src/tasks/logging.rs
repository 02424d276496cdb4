/* ************************************************************************ **
** This file is part of lchol, and is licensed under EITHER the MIT license **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use crate::FailResult;

use ansi_term::Colour;
use log::{Level, LevelFilter};
use std::fmt;
use std::path::{Path, PathBuf};

/// Builder-style setup for logging
#[derive(Debug, Clone, Default)]
pub struct GlobalLogger {
    path: Option<PathBuf>,
    verbosity: Verbosity,
}

impl GlobalLogger {
    /// Also write the log to a file (without colors).
    pub fn path<P: AsRef<Path>>(&mut self, path: P) -> &mut Self
    { self.path = Some(path.as_ref().to_owned()); self }

    /// Any integer will be accepted; the level will be truncated
    /// to the most extreme value supported.
    pub fn verbosity(&mut self, level: u64) -> &mut Self
    {
        self.verbosity = match level > 0 {
            true => Verbosity::Loud,
            false => Verbosity::Default,
        };
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Verbosity { Default, Loud }

impl Default for Verbosity {
    fn default() -> Self { Verbosity::Default }
}

impl GlobalLogger {
    /// Install the logger.  Logs go to stderr, leaving stdout for output.
    ///
    /// Fails if a logger was already installed.
    pub fn apply(&mut self) -> FailResult<()>
    {
        use std::time::Instant;

        let our_level = match self.verbosity {
            Verbosity::Default => LevelFilter::Debug,
            Verbosity::Loud => LevelFilter::Trace,
        };

        let start = Instant::now();
        let elapsed = move || {
            let t = start.elapsed();
            format!("{:>4}.{:03}s", t.as_secs(), t.subsec_millis())
        };
        let base = fern::Dispatch::new()
            .level(LevelFilter::Info)
            .level_for("lchol", our_level)
            .level_for("lchol_tasks", our_level)
            .level_for("lchol_linalg", our_level);

        let elapsed_term = elapsed.clone();
        let mut dispatch = base.chain({
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    out.finish(format_args!("[{}][{}][{}] {}",
                        elapsed_term(),
                        record.target(),
                        ColorizedLevel(record.level()),
                        message))
                })
                .chain(std::io::stderr())
        });

        if let Some(path) = self.path.as_ref() {
            dispatch = dispatch.chain({
                fern::Dispatch::new()
                    .format(move |out, message, record| {
                        out.finish(format_args!("[{}][{}][{}] {}",
                            elapsed(),
                            record.target(),
                            record.level(),
                            message))
                    })
                    .chain(fern::log_file(path)?)
            });
        }

        dispatch.apply()?;
        Ok(())
    }
}

#[derive(Debug, Copy, Clone)]
pub struct ColorizedLevel(pub Level);
impl fmt::Display for ColorizedLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let style = match self.0 {
            Level::Error => Colour::Red.bold(),
            Level::Warn  => Colour::Red.normal(),
            Level::Info  => Colour::Cyan.bold(),
            Level::Debug => Colour::Yellow.dimmed(),
            Level::Trace => Colour::Cyan.normal(),
        };
        write!(f, "{}", style.paint(self.0.to_string()))
    }
}
