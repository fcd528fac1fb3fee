//! Constant pool codec for compiled class files
//!
//! Only `CONSTANT_Utf8` entries are rewritten. Every other constant keeps its
//! bytes and its index, so the fields, methods and attributes that follow the
//! pool are copied verbatim.

use thiserror::Error;

/// Magic number opening every class file
pub const MAGIC: [u8; 4] = [0xCA, 0xFE, 0xBA, 0xBE];

const TAG_UTF8: u8 = 1;
const TAG_INTEGER: u8 = 3;
const TAG_FLOAT: u8 = 4;
const TAG_LONG: u8 = 5;
const TAG_DOUBLE: u8 = 6;
const TAG_CLASS: u8 = 7;
const TAG_STRING: u8 = 8;
const TAG_FIELDREF: u8 = 9;
const TAG_METHODREF: u8 = 10;
const TAG_INTERFACE_METHODREF: u8 = 11;
const TAG_NAME_AND_TYPE: u8 = 12;
const TAG_METHOD_HANDLE: u8 = 15;
const TAG_METHOD_TYPE: u8 = 16;
const TAG_DYNAMIC: u8 = 17;
const TAG_INVOKE_DYNAMIC: u8 = 18;
const TAG_MODULE: u8 = 19;
const TAG_PACKAGE: u8 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassFileError {
    #[error("not a class file (bad magic number)")]
    BadMagic,

    #[error("truncated at offset {offset}")]
    Truncated { offset: usize },

    #[error("unknown constant tag {tag} at index {index}")]
    UnknownTag { tag: u8, index: u16 },

    #[error("constant {index} exceeds 65535 bytes after rewriting")]
    TooLong { index: u16 },
}

/// How a `Utf8` constant is used by the rest of the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utf8Role {
    /// Name of a `Class` constant: internal name or array descriptor
    ClassName,
    /// Name of a `Package` constant, slash separated
    PackageName,
    /// Value of a `String` constant
    StringLiteral,
    /// Anything else: member names, descriptors, signatures, attribute names
    Other,
}

#[derive(Debug)]
enum Entry {
    Utf8 { start: usize, end: usize },
    Other,
    Unusable,
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], ClassFileError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(ClassFileError::Truncated { offset: self.pos })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u1(&mut self) -> Result<u8, ClassFileError> {
        Ok(self.take(1)?[0])
    }

    fn u2(&mut self) -> Result<u16, ClassFileError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }
}

/// Parsed view over a class file's constant pool
pub struct ConstantPool<'a> {
    bytes: &'a [u8],
    entries: Vec<Entry>,
    roles: Vec<Utf8Role>,
    pool_end: usize,
}

impl<'a> ConstantPool<'a> {
    /// Parse the header and constant pool of `bytes`
    ///
    /// # Errors
    ///
    /// Returns an error if the magic number is wrong, the pool is truncated
    /// or a constant has an unknown tag.
    pub fn parse(bytes: &'a [u8]) -> Result<Self, ClassFileError> {
        let mut reader = Reader { bytes, pos: 0 };
        if reader.take(4)? != MAGIC {
            return Err(ClassFileError::BadMagic);
        }
        reader.take(4)?; // minor, major
        let count = reader.u2()?;

        // Index 0 is unused; long and double occupy two slots.
        let mut entries = vec![Entry::Unusable];
        let mut roles = vec![Utf8Role::Other; usize::from(count.max(1))];
        let mut index: u16 = 1;
        while index < count {
            let start = reader.pos;
            let tag = reader.u1()?;
            match tag {
                TAG_UTF8 => {
                    let len = reader.u2()?;
                    reader.take(usize::from(len))?;
                    entries.push(Entry::Utf8 {
                        start,
                        end: reader.pos,
                    });
                }
                TAG_CLASS | TAG_STRING | TAG_PACKAGE => {
                    let target = usize::from(reader.u2()?);
                    let role = match tag {
                        TAG_CLASS => Utf8Role::ClassName,
                        TAG_STRING => Utf8Role::StringLiteral,
                        _ => Utf8Role::PackageName,
                    };
                    if let Some(slot) = roles.get_mut(target) {
                        // A class name shared with a literal is still rewritten as a name.
                        if *slot == Utf8Role::Other || role == Utf8Role::ClassName {
                            *slot = role;
                        }
                    }
                    entries.push(Entry::Other);
                }
                TAG_METHOD_TYPE | TAG_MODULE => {
                    reader.take(2)?;
                    entries.push(Entry::Other);
                }
                TAG_METHOD_HANDLE => {
                    reader.take(3)?;
                    entries.push(Entry::Other);
                }
                TAG_INTEGER
                | TAG_FLOAT
                | TAG_FIELDREF
                | TAG_METHODREF
                | TAG_INTERFACE_METHODREF
                | TAG_NAME_AND_TYPE
                | TAG_DYNAMIC
                | TAG_INVOKE_DYNAMIC => {
                    reader.take(4)?;
                    entries.push(Entry::Other);
                }
                TAG_LONG | TAG_DOUBLE => {
                    reader.take(8)?;
                    entries.push(Entry::Other);
                    entries.push(Entry::Unusable);
                    index += 1;
                }
                tag => return Err(ClassFileError::UnknownTag { tag, index }),
            }
            index += 1;
        }

        Ok(Self {
            bytes,
            entries,
            roles,
            pool_end: reader.pos,
        })
    }

    /// Rewrite `Utf8` constants with `rewrite`, which receives the role and
    /// decoded text and returns the replacement text when it changes it
    ///
    /// Returns `None` when nothing changed. Constants that are not valid
    /// modified UTF-8 are left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if a rewritten constant no longer fits in 65535 bytes.
    pub fn rewrite<F>(&self, mut rewrite: F) -> Result<Option<Vec<u8>>, ClassFileError>
    where
        F: FnMut(Utf8Role, &str) -> Option<String>,
    {
        let mut out: Option<Vec<u8>> = None;
        let mut copied_to = 0;

        for (index, entry) in self.entries.iter().enumerate() {
            let Entry::Utf8 { start, end } = *entry else {
                continue;
            };
            let Some(text) = decode_modified_utf8(&self.bytes[start + 3..end]) else {
                continue;
            };
            let role = self.roles.get(index).copied().unwrap_or(Utf8Role::Other);
            let Some(replacement) = rewrite(role, &text) else {
                continue;
            };
            if replacement == text {
                continue;
            }

            let encoded = encode_modified_utf8(&replacement);
            let len = u16::try_from(encoded.len()).map_err(|_| ClassFileError::TooLong {
                index: u16::try_from(index).unwrap_or(u16::MAX),
            })?;

            let buffer = out.get_or_insert_with(|| Vec::with_capacity(self.bytes.len() + 64));
            buffer.extend_from_slice(&self.bytes[copied_to..start]);
            buffer.push(TAG_UTF8);
            buffer.extend_from_slice(&len.to_be_bytes());
            buffer.extend_from_slice(&encoded);
            copied_to = end;
        }

        Ok(out.map(|mut buffer| {
            buffer.extend_from_slice(&self.bytes[copied_to..]);
            buffer
        }))
    }

    /// Number of pool slots, including the unused slot 0
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    /// Offset of the first byte after the pool
    #[must_use]
    pub fn pool_end(&self) -> usize {
        self.pool_end
    }
}

/// Decode the JVM's modified UTF-8
#[must_use]
pub fn decode_modified_utf8(bytes: &[u8]) -> Option<String> {
    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b & 0x80 == 0 {
            if b == 0 {
                return None;
            }
            units.push(u16::from(b));
            i += 1;
        } else if b & 0xE0 == 0xC0 {
            let b2 = *bytes.get(i + 1)?;
            if b2 & 0xC0 != 0x80 {
                return None;
            }
            units.push((u16::from(b & 0x1F) << 6) | u16::from(b2 & 0x3F));
            i += 2;
        } else if b & 0xF0 == 0xE0 {
            let b2 = *bytes.get(i + 1)?;
            let b3 = *bytes.get(i + 2)?;
            if b2 & 0xC0 != 0x80 || b3 & 0xC0 != 0x80 {
                return None;
            }
            units.push(
                (u16::from(b & 0x0F) << 12) | (u16::from(b2 & 0x3F) << 6) | u16::from(b3 & 0x3F),
            );
            i += 3;
        } else {
            return None;
        }
    }
    String::from_utf16(&units).ok()
}

/// Encode text as the JVM's modified UTF-8
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn encode_modified_utf8(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for unit in text.encode_utf16() {
        match unit {
            0x0001..=0x007F => out.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                out.push(0xC0 | (unit >> 6) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                out.push(0xE0 | (unit >> 12) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }
    out
}
