/* ************************************************************************ **
** This file is part of lchol, and is licensed under EITHER the MIT license **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

#[macro_use] extern crate failure;
#[macro_use] extern crate log;
#[macro_use] extern crate serde_derive;
#[cfg(test)]
#[macro_use] extern crate lchol_assert_close;

mod cmd;
mod config;
mod logging;
mod report;
pub mod entry_points;

pub use crate::cmd::run;
pub use crate::config::{Backend, Precision, Settings, YamlRead};
pub use crate::logging::GlobalLogger;
pub use crate::report::{Report, Solve};

pub type FailResult<T> = Result<T, failure::Error>;
