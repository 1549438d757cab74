//! JSON dump/restore of full school state.

use super::{io_error, BackupResult};
use crate::model::school::School;
use log::info;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Writes `school` as pretty-printed JSON to `path`, replacing any existing file.
pub fn save_to_file(school: &School, path: impl AsRef<Path>) -> BackupResult<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(io_error(path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, school)?;
    writer.flush().map_err(io_error(path))?;
    info!(
        "event=json_save module=backup status=ok entities={}",
        school.len()
    );
    Ok(())
}

/// Reads a full `School` from `path`.
///
/// Every nested record is validated; the caller replaces its state wholesale.
pub fn load_from_file(path: impl AsRef<Path>) -> BackupResult<School> {
    let path = path.as_ref();
    let file = File::open(path).map_err(io_error(path))?;
    let school: School = serde_json::from_reader(BufReader::new(file))?;
    info!(
        "event=json_load module=backup status=ok entities={}",
        school.len()
    );
    Ok(school)
}
