//! CSV export of all records using the table layout: `Name, ID, Type, Details`.

use std::io::Write;

use crate::registry::School;
use crate::render::{records, Record};

pub fn write_csv<W: Write>(school: &School, writer: W) -> Result<usize, csv::Error> {
    write_records(&records(school), writer)
}

/// Write `rows` with a header line. Returns the number of data rows.
pub fn write_records<W: Write>(rows: &[Record], writer: W) -> Result<usize, csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(["Name", "ID", "Type", "Details"])?;
    for row in rows {
        out.write_record(row.fields())?;
    }
    out.flush()?;
    Ok(rows.len())
}
