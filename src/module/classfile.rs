//! Reader for compiled `module-info.class` files.
//!
//! Only the parts of the class file format needed to recover a module
//! declaration are interpreted: the constant pool, the `Module` attribute and
//! the `ModuleMainClass` attribute. Fields and methods are skipped.

use super::{Exports, ModuleDescriptor, ModuleNameSource, Provides, Requires, RequiresModifier};
use thiserror::Error;

const CLASS_MAGIC: u32 = 0xCAFE_BABE;
const ACC_MODULE: u16 = 0x8000;
const ACC_OPEN: u16 = 0x0020;

const ACC_TRANSITIVE: u16 = 0x0020;
const ACC_STATIC_PHASE: u16 = 0x0040;
const ACC_SYNTHETIC: u16 = 0x1000;
const ACC_MANDATED: u16 = 0x8000;

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

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClassFormatError {
    #[error("Unexpected end of class file at offset {0}")]
    UnexpectedEof(usize),

    #[error("Invalid class file magic: {0:#010x}")]
    InvalidMagic(u32),

    #[error("Not a module descriptor: ACC_MODULE flag is missing")]
    NotAModule,

    #[error("Invalid constant pool index {0}")]
    InvalidConstantIndex(u16),

    #[error("Unknown constant pool tag {tag} at index {index}")]
    UnknownConstantTag { tag: u8, index: u16 },

    #[error("Constant pool entry {index} is not a {expected}")]
    UnexpectedConstant { index: u16, expected: &'static str },

    #[error("Invalid modified UTF-8 in constant pool entry {0}")]
    InvalidUtf8(u16),

    #[error("Missing Module attribute")]
    MissingModuleAttribute,
}

#[derive(Debug, Clone)]
enum Constant {
    Utf8(String),
    Class(u16),
    Module(u16),
    Package(u16),
    Other,
    /// Second slot of a long or double
    Unusable,
}

struct ClassReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ClassReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], ClassFormatError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(ClassFormatError::UnexpectedEof(self.pos))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn skip(&mut self, len: usize) -> Result<(), ClassFormatError> {
        self.take(len).map(|_| ())
    }

    fn read_u8(&mut self) -> Result<u8, ClassFormatError> {
        Ok(self.take(1)?[0])
    }

    fn read_u16(&mut self) -> Result<u16, ClassFormatError> {
        let buf = self.take(2)?;
        Ok(u16::from_be_bytes([buf[0], buf[1]]))
    }

    fn read_u32(&mut self) -> Result<u32, ClassFormatError> {
        let buf = self.take(4)?;
        Ok(u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]))
    }
}

struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    fn read(reader: &mut ClassReader<'_>) -> Result<Self, ClassFormatError> {
        let count = reader.read_u16()?;
        // index 0 is never valid
        let mut entries = vec![Constant::Unusable];
        let mut index: u16 = 1;
        while index < count {
            let tag = reader.read_u8()?;
            let entry = match tag {
                TAG_UTF8 => {
                    let len = reader.read_u16()? as usize;
                    let raw = reader.take(len)?;
                    let text =
                        decode_modified_utf8(raw).ok_or(ClassFormatError::InvalidUtf8(index))?;
                    Constant::Utf8(text)
                }
                TAG_CLASS => Constant::Class(reader.read_u16()?),
                TAG_MODULE => Constant::Module(reader.read_u16()?),
                TAG_PACKAGE => Constant::Package(reader.read_u16()?),
                TAG_STRING | TAG_METHOD_TYPE => {
                    reader.skip(2)?;
                    Constant::Other
                }
                TAG_METHOD_HANDLE => {
                    reader.skip(3)?;
                    Constant::Other
                }
                TAG_INTEGER
                | TAG_FLOAT
                | TAG_FIELDREF
                | TAG_METHODREF
                | TAG_INTERFACE_METHODREF
                | TAG_NAME_AND_TYPE
                | TAG_DYNAMIC
                | TAG_INVOKE_DYNAMIC => {
                    reader.skip(4)?;
                    Constant::Other
                }
                TAG_LONG | TAG_DOUBLE => {
                    // takes two slots, so it cannot be the last entry
                    if index + 1 >= count {
                        return Err(ClassFormatError::InvalidConstantIndex(index));
                    }
                    reader.skip(8)?;
                    entries.push(Constant::Other);
                    index += 1;
                    Constant::Unusable
                }
                _ => return Err(ClassFormatError::UnknownConstantTag { tag, index }),
            };
            entries.push(entry);
            index += 1;
        }
        Ok(Self { entries })
    }

    fn get(&self, index: u16) -> Result<&Constant, ClassFormatError> {
        self.entries
            .get(index as usize)
            .filter(|c| !matches!(c, Constant::Unusable))
            .ok_or(ClassFormatError::InvalidConstantIndex(index))
    }

    fn utf8(&self, index: u16) -> Result<&str, ClassFormatError> {
        match self.get(index)? {
            Constant::Utf8(s) => Ok(s),
            _ => Err(ClassFormatError::UnexpectedConstant {
                index,
                expected: "Utf8",
            }),
        }
    }

    fn optional_utf8(&self, index: u16) -> Result<Option<String>, ClassFormatError> {
        if index == 0 {
            return Ok(None);
        }
        self.utf8(index).map(|s| Some(s.to_string()))
    }

    fn module_name(&self, index: u16) -> Result<String, ClassFormatError> {
        match self.get(index)? {
            Constant::Module(name) => self.utf8(*name).map(str::to_string),
            _ => Err(ClassFormatError::UnexpectedConstant {
                index,
                expected: "Module",
            }),
        }
    }

    fn package_name(&self, index: u16) -> Result<String, ClassFormatError> {
        match self.get(index)? {
            Constant::Package(name) => self.utf8(*name).map(binary_name),
            _ => Err(ClassFormatError::UnexpectedConstant {
                index,
                expected: "Package",
            }),
        }
    }

    fn class_name(&self, index: u16) -> Result<String, ClassFormatError> {
        match self.get(index)? {
            Constant::Class(name) => self.utf8(*name).map(binary_name),
            _ => Err(ClassFormatError::UnexpectedConstant {
                index,
                expected: "Class",
            }),
        }
    }
}

/// Decodes the modified UTF-8 of `CONSTANT_Utf8` entries: NUL is `C0 80`
/// and supplementary characters are encoded as surrogate pairs.
fn decode_modified_utf8(raw: &[u8]) -> Option<String> {
    if let Ok(text) = std::str::from_utf8(raw) {
        if !raw.contains(&0) {
            return Some(text.to_string());
        }
    }

    let mut units = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        let b = raw[i];
        let unit = match b {
            0x01..=0x7F => {
                i += 1;
                b as u16
            }
            0xC0..=0xDF => {
                let b2 = *raw.get(i + 1)?;
                if b2 & 0xC0 != 0x80 {
                    return None;
                }
                i += 2;
                (((b & 0x1F) as u16) << 6) | (b2 & 0x3F) as u16
            }
            0xE0..=0xEF => {
                let b2 = *raw.get(i + 1)?;
                let b3 = *raw.get(i + 2)?;
                if b2 & 0xC0 != 0x80 || b3 & 0xC0 != 0x80 {
                    return None;
                }
                i += 3;
                (((b & 0x0F) as u16) << 12) | (((b2 & 0x3F) as u16) << 6) | (b3 & 0x3F) as u16
            }
            _ => return None,
        };
        units.push(unit);
    }
    String::from_utf16(&units).ok()
}

/// Internal names use `/` between package segments.
fn binary_name(internal: &str) -> String {
    internal.replace('/', ".")
}

fn requires_modifiers(flags: u16) -> Vec<RequiresModifier> {
    let mut modifiers = Vec::new();
    if flags & ACC_TRANSITIVE != 0 {
        modifiers.push(RequiresModifier::Transitive);
    }
    if flags & ACC_STATIC_PHASE != 0 {
        modifiers.push(RequiresModifier::Static);
    }
    if flags & ACC_SYNTHETIC != 0 {
        modifiers.push(RequiresModifier::Synthetic);
    }
    if flags & ACC_MANDATED != 0 {
        modifiers.push(RequiresModifier::Mandated);
    }
    modifiers
}

fn skip_members(reader: &mut ClassReader<'_>) -> Result<(), ClassFormatError> {
    let count = reader.read_u16()?;
    for _ in 0..count {
        // access_flags, name_index, descriptor_index
        reader.skip(6)?;
        skip_attributes(reader)?;
    }
    Ok(())
}

fn skip_attributes(reader: &mut ClassReader<'_>) -> Result<(), ClassFormatError> {
    let count = reader.read_u16()?;
    for _ in 0..count {
        reader.skip(2)?;
        let len = reader.read_u32()? as usize;
        reader.skip(len)?;
    }
    Ok(())
}

fn read_module_attribute(
    reader: &mut ClassReader<'_>,
    pool: &ConstantPool,
) -> Result<ModuleDescriptor, ClassFormatError> {
    let name = pool.module_name(reader.read_u16()?)?;
    let flags = reader.read_u16()?;
    let version = pool.optional_utf8(reader.read_u16()?)?;

    let mut requires = Vec::new();
    for _ in 0..reader.read_u16()? {
        let module = pool.module_name(reader.read_u16()?)?;
        let flags = reader.read_u16()?;
        let version = pool.optional_utf8(reader.read_u16()?)?;
        requires.push(Requires {
            name: module,
            modifiers: requires_modifiers(flags),
            version,
        });
    }

    let mut exports = Vec::new();
    for _ in 0..reader.read_u16()? {
        let source = pool.package_name(reader.read_u16()?)?;
        let _flags = reader.read_u16()?;
        let target_count = reader.read_u16()?;
        let mut targets = Vec::with_capacity(target_count as usize);
        for _ in 0..target_count {
            targets.push(pool.module_name(reader.read_u16()?)?);
        }
        exports.push(Exports {
            source,
            targets: if targets.is_empty() {
                None
            } else {
                Some(targets)
            },
        });
    }

    // opens: same layout as exports, not needed for diagnostics
    for _ in 0..reader.read_u16()? {
        reader.skip(4)?;
        let target_count = reader.read_u16()? as usize;
        reader.skip(target_count * 2)?;
    }

    let mut uses = Vec::new();
    for _ in 0..reader.read_u16()? {
        uses.push(pool.class_name(reader.read_u16()?)?);
    }

    let mut provides = Vec::new();
    for _ in 0..reader.read_u16()? {
        let service = pool.class_name(reader.read_u16()?)?;
        let with_count = reader.read_u16()?;
        let mut providers = Vec::with_capacity(with_count as usize);
        for _ in 0..with_count {
            providers.push(pool.class_name(reader.read_u16()?)?);
        }
        provides.push(Provides { service, providers });
    }

    Ok(ModuleDescriptor {
        name,
        source: ModuleNameSource::ModuleDescriptor,
        version,
        open: flags & ACC_OPEN != 0,
        requires,
        exports,
        provides,
        uses,
        main_class: None,
    })
}

/// Parses the bytes of a `module-info.class` into a declared module descriptor.
pub fn parse_module_info(bytes: &[u8]) -> Result<ModuleDescriptor, ClassFormatError> {
    let mut reader = ClassReader::new(bytes);

    let magic = reader.read_u32()?;
    if magic != CLASS_MAGIC {
        return Err(ClassFormatError::InvalidMagic(magic));
    }
    // minor_version, major_version
    reader.skip(4)?;

    let pool = ConstantPool::read(&mut reader)?;

    let access_flags = reader.read_u16()?;
    if access_flags & ACC_MODULE == 0 {
        return Err(ClassFormatError::NotAModule);
    }
    // this_class, super_class
    reader.skip(4)?;
    let interfaces = reader.read_u16()? as usize;
    reader.skip(interfaces * 2)?;
    skip_members(&mut reader)?;
    skip_members(&mut reader)?;

    let mut descriptor = None;
    let mut main_class = None;
    for _ in 0..reader.read_u16()? {
        let name_index = reader.read_u16()?;
        let len = reader.read_u32()? as usize;
        let body = reader.take(len)?;
        match pool.utf8(name_index)? {
            "Module" => {
                let mut body_reader = ClassReader::new(body);
                descriptor = Some(read_module_attribute(&mut body_reader, &pool)?);
            }
            "ModuleMainClass" => {
                let mut body_reader = ClassReader::new(body);
                main_class = Some(pool.class_name(body_reader.read_u16()?)?);
            }
            _ => {}
        }
    }

    let mut descriptor = descriptor.ok_or(ClassFormatError::MissingModuleAttribute)?;
    descriptor.main_class = main_class;
    Ok(descriptor)
}
