pub mod serialize;

use crate::error::{FormatError, Result};
use serialize::RecordData;

use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::{Map, Value};

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

// the SM83 has two 256-entry opcode tables: the base one, and the one reached through the 0xCB prefix byte
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Section {
    Unprefixed,
    #[value(name = "cbprefixed", alias = "cb")]
    CbPrefixed,
}

impl Section {
    /// Top-level key of this section in the document.
    pub fn key(&self) -> &'static str {
        match self {
            Section::Unprefixed => "unprefixed",
            Section::CbPrefixed => "cbprefixed",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct OpcodeRecord {
    pub mnemonic: String,
    pub bytes: u32,
    pub cycles: Vec<u32>, // one value, or taken/not-taken for conditional branches
}

/// A validated record together with the identifier it was filed under.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    pub opcode: String, // exactly as written in the document
    pub value: u8,
    pub record: OpcodeRecord,
}

pub struct OpcodeTable {
    root: Map<String, Value>,
}

impl OpcodeTable {
    /// Reads a table from disk. A path of `-` reads standard input.
    pub fn load(path: &Path) -> Result<Self> {
        if path == Path::new("-") {
            info!("reading opcode table from stdin");
            return Self::from_reader(std::io::stdin().lock());
        }
        let f = File::open(path)
            .map_err(|e| FormatError::io(format!("couldn't open {:?}", path), e))?;
        info!("loading opcode table from file: {:?}", path);
        Self::from_reader(f)
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = vec![];
        reader.read_to_end(&mut data)
            .map_err(|e| FormatError::io("couldn't read opcode table", e))?;
        let text = std::str::from_utf8(&data)
            .map_err(|e| FormatError::malformed(format!("input is not UTF-8: {}", e)))?;
        text.parse()
    }

    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(root) => {
                debug!("top-level keys: {:?}", root.keys().collect::<Vec<_>>());
                Ok(OpcodeTable { root })
            }
            _ => Err(FormatError::malformed("top level of the document is not an object")),
        }
    }

    /// Validates and extracts every record of `section`, in document order.
    /// Stops at the first bad record.
    pub fn section(&self, section: Section) -> Result<Vec<Entry>> {
        let records = match self.root.get(section.key()) {
            Some(Value::Object(records)) => records,
            Some(_) => {
                return Err(FormatError::malformed(format!("section \"{}\" is not an object", section)))
            }
            None => return Err(FormatError::malformed(format!("no \"{}\" section", section))),
        };
        let mut entries = Vec::with_capacity(records.len());
        for (opcode, raw) in records {
            let value = parse_opcode(opcode)
                .ok_or_else(|| FormatError::malformed_at(opcode, "identifier is not a hex byte"))?;
            let record = to_record(opcode, raw)?;
            debug!("{} {}: {:?}", section, opcode, record);
            entries.push(Entry { opcode: opcode.clone(), value, record });
        }
        info!("section {}: {} records", section, entries.len());
        Ok(entries)
    }
}

impl FromStr for OpcodeTable {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(s)?;
        Self::from_value(value)
    }
}

fn to_record(opcode: &str, raw: &Value) -> Result<OpcodeRecord> {
    if !raw.is_object() {
        return Err(FormatError::malformed_at(opcode, "record is not an object"));
    }
    let data = RecordData::deserialize(raw)
        .map_err(|e| FormatError::malformed_at(opcode, e.to_string()))?;
    let mnemonic = data.mnemonic.ok_or_else(|| FormatError::missing(opcode, "mnemonic"))?;
    let bytes = data.bytes.ok_or_else(|| FormatError::missing(opcode, "bytes"))?;
    let cycles = data.cycles.ok_or_else(|| FormatError::missing(opcode, "cycles"))?;
    // these would make the listing line ambiguous to split
    if mnemonic.contains(|c: char| c == '"' || c == ',' || c == '\n' || c == '\r') {
        return Err(FormatError::malformed_at(
            opcode,
            format!("mnemonic {:?} contains a quote, comma or line break", mnemonic),
        ));
    }
    match cycles.len() {
        1 | 2 => (),
        n => {
            return Err(FormatError::malformed_at(
                opcode,
                format!("expected 1 or 2 cycle values, found {}", n),
            ))
        }
    }
    if bytes == 0 {
        warn!("opcode {} ({}) claims to be 0 bytes long", opcode, mnemonic);
    }
    Ok(OpcodeRecord { mnemonic, bytes, cycles })
}

/// Parses an identifier like `0xCB`, `0Xcb` or `CB` into its byte value.
pub fn parse_opcode(id: &str) -> Option<u8> {
    let digits = id.strip_prefix("0x").or_else(|| id.strip_prefix("0X")).unwrap_or(id);
    // from_str_radix would also take a leading '+'
    if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u8::from_str_radix(digits, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(v: Value) -> OpcodeTable {
        OpcodeTable::from_value(v).unwrap()
    }

    fn failing_opcode(t: &OpcodeTable) -> Option<String> {
        match t.section(Section::Unprefixed).unwrap_err() {
            FormatError::MalformedInput { opcode, .. } => opcode,
            FormatError::MissingField { opcode, .. } => Some(opcode),
            FormatError::Io { .. } => None,
        }
    }

    #[test]
    fn parses_identifiers() {
        assert_eq!(parse_opcode("0x00"), Some(0x00));
        assert_eq!(parse_opcode("0xCB"), Some(0xCB));
        assert_eq!(parse_opcode("0Xff"), Some(0xFF));
        assert_eq!(parse_opcode("1a"), Some(0x1A));
        assert_eq!(parse_opcode("0x"), None);
        assert_eq!(parse_opcode("0x100"), None);
        assert_eq!(parse_opcode("0x+1"), None);
        assert_eq!(parse_opcode("+1"), None);
        assert_eq!(parse_opcode("+F"), None);
        assert_eq!(parse_opcode("NOP"), None);
    }

    #[test]
    fn extracts_records_in_document_order() {
        let t = table(json!({
            "unprefixed": {
                "0x10": {"mnemonic": "STOP", "bytes": 2, "cycles": [4]},
                "0x00": {"mnemonic": "NOP", "bytes": 1, "cycles": [4]}
            }
        }));
        let entries = t.section(Section::Unprefixed).unwrap();
        let ids: Vec<&str> = entries.iter().map(|e| e.opcode.as_str()).collect();
        assert_eq!(ids, vec!["0x10", "0x00"]);
        assert_eq!(entries[1].value, 0);
        assert_eq!(entries[1].record, OpcodeRecord { mnemonic: "NOP".to_string(), bytes: 1, cycles: vec![4] });
    }

    #[test]
    fn missing_section_is_malformed() {
        let t = table(json!({"cbprefixed": {}}));
        match t.section(Section::Unprefixed) {
            Err(FormatError::MalformedInput { opcode: None, .. }) => (),
            other => panic!("unexpected result: {:?}", other.map(|e| e.len())),
        }
        assert!(t.section(Section::CbPrefixed).unwrap().is_empty());
    }

    #[test]
    fn section_must_be_an_object() {
        let t = table(json!({"unprefixed": [1, 2, 3]}));
        assert!(matches!(t.section(Section::Unprefixed), Err(FormatError::MalformedInput { .. })));
    }

    #[test]
    fn missing_fields_are_named() {
        for (field, record) in vec![
            ("mnemonic", json!({"bytes": 1, "cycles": [4]})),
            ("bytes", json!({"mnemonic": "NOP", "cycles": [4]})),
            ("cycles", json!({"mnemonic": "NOP", "bytes": 1})),
        ] {
            let t = table(json!({"unprefixed": {"0x00": record}}));
            let err = t.section(Section::Unprefixed).unwrap_err();
            match err {
                FormatError::MissingField { ref opcode, field: f } => {
                    assert_eq!(opcode, "0x00");
                    assert_eq!(f, field);
                }
                other => panic!("unexpected error: {:?}", other),
            }
        }
    }

    #[test]
    fn cycle_count_must_be_one_or_two() {
        let t = table(json!({"unprefixed": {
            "0x00": {"mnemonic": "NOP", "bytes": 1, "cycles": []}
        }}));
        assert_eq!(failing_opcode(&t).as_deref(), Some("0x00"));

        let t = table(json!({"unprefixed": {
            "0xC4": {"mnemonic": "CALL", "bytes": 3, "cycles": [24, 12, 4]}
        }}));
        assert_eq!(failing_opcode(&t).as_deref(), Some("0xC4"));
    }

    #[test]
    fn bad_identifier_and_bad_record_name_the_opcode() {
        let t = table(json!({"unprefixed": {"zz": {"mnemonic": "NOP", "bytes": 1, "cycles": [4]}}}));
        assert_eq!(failing_opcode(&t).as_deref(), Some("zz"));

        let t = table(json!({"unprefixed": {"+1": {"mnemonic": "LD", "bytes": 3, "cycles": [12]}}}));
        assert_eq!(failing_opcode(&t).as_deref(), Some("+1"));

        let t = table(json!({"unprefixed": {"0x01": "LD BC,n16"}}));
        assert_eq!(failing_opcode(&t).as_deref(), Some("0x01"));

        let t = table(json!({"unprefixed": {"0x01": {"mnemonic": "LD", "bytes": "3", "cycles": [12]}}}));
        assert_eq!(failing_opcode(&t).as_deref(), Some("0x01"));
    }

    #[test]
    fn mnemonic_must_survive_the_listing_format() {
        for mnemonic in vec!["A, B", "LD\"", "RET\nNZ", "JP,HL"] {
            let t = table(json!({"unprefixed": {"0xE9": {"mnemonic": mnemonic, "bytes": 1, "cycles": [4]}}}));
            match t.section(Section::Unprefixed) {
                Err(FormatError::MalformedInput { opcode: Some(ref op), .. }) if op == "0xE9" => (),
                other => panic!("{:?} accepted: {:?}", mnemonic, other),
            }
        }
        let t = table(json!({"unprefixed": {"0xE9": {"mnemonic": "PREFIX CB", "bytes": 1, "cycles": [4]}}}));
        assert_eq!(t.section(Section::Unprefixed).unwrap()[0].record.mnemonic, "PREFIX CB");
    }

    #[test]
    fn document_must_be_json_object() {
        assert!("[]".parse::<OpcodeTable>().is_err());
        assert!("not json".parse::<OpcodeTable>().is_err());
        assert!("{}".parse::<OpcodeTable>().is_ok());
    }

    #[test]
    fn reads_from_any_reader() {
        let doc = br#"{"cbprefixed": {"0x37": {"mnemonic": "SWAP", "bytes": 2, "cycles": [8]}}}"#;
        let t = OpcodeTable::from_reader(&doc[..]).unwrap();
        assert_eq!(t.section(Section::CbPrefixed).unwrap()[0].record.mnemonic, "SWAP");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = OpcodeTable::load(Path::new("/nonexistent/opcodes.json")).err().unwrap();
        assert!(matches!(err, FormatError::Io { .. }));
    }
}
