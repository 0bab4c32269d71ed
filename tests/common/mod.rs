#![allow(dead_code)]

use bils::application::engine::SplitEngine;
use bils::config::AppConfig;
use bils::infrastructure::scheduler::InProcessScheduler;
use std::io::{Error, Write};
use std::sync::Arc;
use tempfile::NamedTempFile;

pub const SCRIPT_HEADER: &str = "action,ref,name,amount,category,with,note,phone";

/// Writes a replay script with the standard header to a temp file.
pub fn write_script(rows: &[&str]) -> Result<NamedTempFile, Error> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "{SCRIPT_HEADER}")?;
    for row in rows {
        writeln!(file, "{row}")?;
    }
    file.flush()?;
    Ok(file)
}

/// Engine over in-memory stores with every notification delay at zero.
pub fn engine() -> (SplitEngine, InProcessScheduler) {
    let config = AppConfig {
        payment_prompt_delay_secs: 0,
        reminder_delay_secs: 0,
        incoming_prompt_delay_secs: 0,
        ..AppConfig::default()
    };
    let scheduler = InProcessScheduler::new(true);
    let engine = SplitEngine::in_memory(Arc::new(scheduler.clone()), config);
    (engine, scheduler)
}
