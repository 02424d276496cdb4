/* ************************************************************************ **
** This file is part of lchol, and is licensed under EITHER the MIT license **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use crate::FailResult;
use crate::config::{Settings, YamlRead};
use crate::logging::GlobalLogger;
use clap::{App, Arg};
use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, BufReader, Write};

fn wrap_result_main<F>(main: F)
where F: FnOnce() -> FailResult<()>,
{
    main().unwrap_or_else(|e| {
        for cause in e.iter_chain() {
            error!("{}", cause);
        }

        if std::env::var_os("RUST_BACKTRACE") == Some(OsStr::new("1").to_owned()) {
            error!("{}", e.backtrace());
        }
        std::process::exit(1);
    });
}

/// `lchol CONFIG [-o OUTPUT] [-v] [--log FILE]`
pub fn lchol(version: &str) {
    wrap_result_main(|| {
        let matches = App::new("lchol")
            .version(version)
            .about("Cholesky-factorize a symmetric positive definite matrix.")
            .args(&[
                Arg::with_name("config")
                    .required(true)
                    .value_name("CONFIG")
                    .help("config yaml describing the matrix and the quantities to compute"),
                Arg::with_name("output")
                    .short("o")
                    .long("output")
                    .takes_value(true)
                    .number_of_values(1)
                    .value_name("OUTPUT")
                    .help("write the json report here instead of to stdout"),
                Arg::with_name("log")
                    .long("log")
                    .takes_value(true)
                    .number_of_values(1)
                    .value_name("FILE")
                    .help("also write the log to this file"),
                Arg::with_name("verbose")
                    .short("v")
                    .long("verbose")
                    .multiple(true)
                    .help("log the backend calls"),
            ])
            .get_matches();

        let mut logger = GlobalLogger::default();
        logger.verbosity(matches.occurrences_of("verbose"));
        if let Some(path) = matches.value_of("log") {
            logger.path(path);
        }
        logger.apply()?;

        // "config" is required
        let config_path = matches.value_of("config").unwrap_or_default();
        let file = File::open(config_path)
            .map_err(|e| format_err!("while opening config '{}': {}", config_path, e))?;
        let settings = Settings::from_reader(BufReader::new(file))?;

        let report = crate::cmd::run(&settings)?;

        match matches.value_of("output") {
            Some(path) => {
                let file = File::create(path)
                    .map_err(|e| format_err!("could not create '{}': {}", path, e))?;
                serde_json::to_writer_pretty(file, &report)?;
                info!("Wrote {}", path);
            },
            None => {
                let stdout = io::stdout();
                let mut stdout = stdout.lock();
                serde_json::to_writer_pretty(&mut stdout, &report)?;
                writeln!(stdout)?;
            },
        }
        Ok(())
    });
}
