//! Minimal class file header reader.
//!
//! Only walks as far as `this_class`: magic, version, constant pool and
//! access flags. Everything past the header is left unread.

use std::path::Path;

use crate::error::BrowserError;

const MAGIC: u32 = 0xCAFE_BABE;

const TAG_UTF8: u8 = 1;
const TAG_INTEGER: u8 = 3;
const TAG_FLOAT: u8 = 4;
const TAG_LONG: u8 = 5;
const TAG_DOUBLE: u8 = 6;
const TAG_CLASS: u8 = 7;
const TAG_STRING: u8 = 8;
const TAG_FIELD_REF: u8 = 9;
const TAG_METHOD_REF: u8 = 10;
const TAG_INTERFACE_METHOD_REF: u8 = 11;
const TAG_NAME_AND_TYPE: u8 = 12;
const TAG_METHOD_HANDLE: u8 = 15;
const TAG_METHOD_TYPE: u8 = 16;
const TAG_DYNAMIC: u8 = 17;
const TAG_INVOKE_DYNAMIC: u8 = 18;
const TAG_MODULE: u8 = 19;
const TAG_PACKAGE: u8 = 20;

#[derive(Debug, Clone)]
enum Constant {
    Utf8(String),
    Class { name_index: u16 },
    Other,
    /// Second slot of a long or double.
    Unusable,
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], BrowserError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| BrowserError::InvalidClassFile(format!("truncated at offset {}", self.pos)))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u1(&mut self) -> Result<u8, BrowserError> {
        Ok(self.take(1)?[0])
    }

    fn u2(&mut self) -> Result<u16, BrowserError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u4(&mut self) -> Result<u32, BrowserError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }
}

/// Reads the internal name (`com/foo/Bar`) of the class defined by `bytes`.
pub fn read_this_class_name(bytes: &[u8]) -> Result<String, BrowserError> {
    let mut r = Reader::new(bytes);
    let magic = r.u4()?;
    if magic != MAGIC {
        return Err(BrowserError::InvalidClassFile(format!("bad magic {magic:#010x}")));
    }
    let _minor = r.u2()?;
    let _major = r.u2()?;

    let pool = read_constant_pool(&mut r)?;
    let _access_flags = r.u2()?;
    let this_class = r.u2()?;

    let name_index = match pool.get(usize::from(this_class)) {
        Some(Constant::Class { name_index }) => *name_index,
        _ => {
            return Err(BrowserError::InvalidClassFile(format!(
                "this_class #{this_class} is not a class constant"
            )));
        }
    };
    match pool.get(usize::from(name_index)) {
        Some(Constant::Utf8(name)) => Ok(name.clone()),
        _ => Err(BrowserError::InvalidClassFile(format!(
            "class name #{name_index} is not a utf8 constant"
        ))),
    }
}

pub fn read_this_class_name_from_file(path: &Path) -> Result<String, BrowserError> {
    let bytes = std::fs::read(path).map_err(|e| BrowserError::storage(path, e))?;
    read_this_class_name(&bytes)
}

fn read_constant_pool(r: &mut Reader<'_>) -> Result<Vec<Constant>, BrowserError> {
    let count = usize::from(r.u2()?);
    // Index 0 is never valid.
    let mut pool = vec![Constant::Unusable];
    while pool.len() < count {
        let tag = r.u1()?;
        let constant = match tag {
            TAG_UTF8 => {
                let len = usize::from(r.u2()?);
                Constant::Utf8(String::from_utf8_lossy(r.take(len)?).into_owned())
            }
            TAG_CLASS => Constant::Class {
                name_index: r.u2()?,
            },
            TAG_STRING | TAG_METHOD_TYPE | TAG_MODULE | TAG_PACKAGE => {
                r.take(2)?;
                Constant::Other
            }
            TAG_METHOD_HANDLE => {
                r.take(3)?;
                Constant::Other
            }
            TAG_INTEGER
            | TAG_FLOAT
            | TAG_FIELD_REF
            | TAG_METHOD_REF
            | TAG_INTERFACE_METHOD_REF
            | TAG_NAME_AND_TYPE
            | TAG_DYNAMIC
            | TAG_INVOKE_DYNAMIC => {
                r.take(4)?;
                Constant::Other
            }
            TAG_LONG | TAG_DOUBLE => {
                r.take(8)?;
                pool.push(Constant::Other);
                Constant::Unusable
            }
            other => {
                return Err(BrowserError::InvalidClassFile(format!(
                    "unknown constant pool tag {other} at #{}",
                    pool.len()
                )));
            }
        };
        pool.push(constant);
    }
    Ok(pool)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builds a minimal class file whose `this_class` is `name`.
    pub(crate) fn class_bytes(name: &str) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&MAGIC.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&52u16.to_be_bytes());
        // #1 long (takes #1 and #2), #3 utf8 name, #4 class -> #3
        out.extend_from_slice(&5u16.to_be_bytes());
        out.push(TAG_LONG);
        out.extend_from_slice(&42u64.to_be_bytes());
        out.push(TAG_UTF8);
        out.extend_from_slice(&(name.len() as u16).to_be_bytes());
        out.extend_from_slice(name.as_bytes());
        out.push(TAG_CLASS);
        out.extend_from_slice(&3u16.to_be_bytes());
        out.extend_from_slice(&0x0021u16.to_be_bytes());
        out.extend_from_slice(&4u16.to_be_bytes());
        out
    }

    #[test]
    fn reads_this_class_past_wide_constants() {
        let bytes = class_bytes("com/foo/Bar");
        assert_eq!(read_this_class_name(&bytes).unwrap(), "com/foo/Bar");
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = class_bytes("A");
        bytes[0] = 0;
        assert!(matches!(
            read_this_class_name(&bytes),
            Err(BrowserError::InvalidClassFile(_))
        ));
    }

    #[test]
    fn rejects_truncated_input() {
        let bytes = class_bytes("com/foo/Bar");
        assert!(read_this_class_name(&bytes[..bytes.len() - 1]).is_err());
        assert!(read_this_class_name(&[]).is_err());
    }

    #[test]
    fn rejects_this_class_pointing_at_utf8() {
        let mut bytes = class_bytes("A");
        let len = bytes.len();
        bytes[len - 2..].copy_from_slice(&3u16.to_be_bytes());
        assert!(read_this_class_name(&bytes).is_err());
    }
}
