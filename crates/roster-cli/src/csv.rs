//! CSV encoding of attendee rows.

use std::io::{self, Write};

use roster_core::AttendeeRow;

/// Column headers, in output order.
pub const HEADER: [&str; 4] = [
    "Name (original name)",
    "Email",
    "Total duration (minutes)",
    "Guest",
];

/// Writes the header and one line per row, `\n`-terminated.
pub fn write_rows<W: Write>(writer: &mut W, rows: &[AttendeeRow]) -> io::Result<()> {
    write_record(writer, &HEADER)?;
    for row in rows {
        let minutes = row.minutes.to_string();
        write_record(
            writer,
            &[
                row.display_name.as_str(),
                row.email.as_str(),
                minutes.as_str(),
                row.guest.as_label(),
            ],
        )?;
    }
    Ok(())
}

/// Encodes rows into an in-memory UTF-8 buffer.
pub fn to_bytes(rows: &[AttendeeRow]) -> Vec<u8> {
    let mut buf = Vec::new();
    // Writing to a Vec cannot fail.
    let _ = write_rows(&mut buf, rows);
    buf
}

fn write_record<W: Write>(writer: &mut W, fields: &[&str]) -> io::Result<()> {
    for (idx, field) in fields.iter().enumerate() {
        if idx > 0 {
            writer.write_all(b",")?;
        }
        write_field(writer, field)?;
    }
    writer.write_all(b"\n")
}

/// Quotes fields containing a delimiter, quote or line break; quotes are
/// doubled.
fn write_field<W: Write>(writer: &mut W, field: &str) -> io::Result<()> {
    if field.contains([',', '"', '\r', '\n']) {
        write!(writer, "\"{}\"", field.replace('"', "\"\""))
    } else {
        writer.write_all(field.as_bytes())
    }
}
