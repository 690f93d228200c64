
use crate::error::{FormatError, Result};
use crate::table::{OpcodeRecord, OpcodeTable, Section};

use log::info;

use std::io::Write;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Order {
    /// Sort by opcode value.
    Numeric,
    /// Keep the order the opcodes appear in the input file.
    Document,
}

/// Renders one record as `opcode, "mnemonic", bytes, cycle[, cycle]`.
pub fn format_line(opcode: &str, record: &OpcodeRecord) -> String {
    let mut line = format!("{}, \"{}\", {}", opcode, record.mnemonic, record.bytes);
    for c in &record.cycles {
        line.push_str(&format!(", {}", c));
    }
    line
}

/// Renders every record of a section. Nothing is returned unless the whole
/// section is valid.
pub fn render(table: &OpcodeTable, section: Section, order: Order) -> Result<Vec<String>> {
    let mut entries = table.section(section)?;
    if order == Order::Numeric {
        // stable, so "0x0A" and "0xa" (same value, different keys) keep document order
        entries.sort_by_key(|e| e.value);
    }
    let lines: Vec<String> = entries.iter()
        .map(|e| format_line(&e.opcode, &e.record))
        .collect();
    info!("rendered {} lines from {} in {:?} order", lines.len(), section, order);
    Ok(lines)
}

pub fn write_lines<W: Write>(lines: &[String], mut out: W) -> Result<()> {
    for line in lines {
        writeln!(out, "{}", line).map_err(|e| FormatError::io("couldn't write listing", e))?;
    }
    out.flush().map_err(|e| FormatError::io("couldn't write listing", e))
}
