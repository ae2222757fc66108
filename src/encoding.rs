use std::path::Path;

use encoding_rs::mem::{decode_latin1, encode_latin1_lossy};

use crate::error::Result;

/// Read a file in the bank's export encoding (ISO-8859-1).
pub fn read_latin1(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(decode_latin1(&bytes).into_owned())
}

/// Write text as ISO-8859-1, the same encoding the raw exports use.
pub fn write_latin1(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, encode_latin1_lossy(text))?;
    Ok(())
}

/// One byte per character, unmappable characters replaced. Digest input must
/// go through this so hashes do not depend on the UTF-8 byte layout.
pub fn latin1_bytes(text: &str) -> Vec<u8> {
    encode_latin1_lossy(text).into_owned()
}
