use std::{fs::File, io::ErrorKind, path::Path};

use log::debug;
use vitalog_model::record::Record;

use crate::repository::Error;

/// Read the whole table file, sorted by date ascending. A missing file
/// reads as an empty table.
pub fn read_records(path: &Path) -> Result<Vec<Record>, Error> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Table file {} not found, starting empty", path.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let mut records = csv::Reader::from_reader(file)
        .deserialize()
        .collect::<Result<Vec<Record>, _>>()?;
    records.sort_by(|a, b| a.date.cmp(&b.date));

    debug!("Read {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Rewrite the table file in full. The whole table is the unit of
/// persistence.
pub fn write_records(path: &Path, records: &[Record]) -> Result<(), Error> {
    let mut writer = csv::Writer::from_writer(File::create(path)?);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    debug!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}
