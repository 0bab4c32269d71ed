//! Outer surfaces: the CSV replay script and report formats used by the
//! command-line driver.

pub mod csv;
pub mod script;
