use serde::Deserialize;

// One record as it sits in opcodes.json. Fields are optional here so a
// missing one can be reported by name instead of as a generic serde error.
// Anything else in the record (operands, immediate, flags) is skipped.
#[derive(Deserialize, Debug)]
pub struct RecordData {
    #[serde(default)]
    pub mnemonic: Option<String>,
    #[serde(default)]
    pub bytes: Option<u32>,
    #[serde(default)]
    pub cycles: Option<Vec<u32>>,
}
