//! Automatic module names
//!
//! An archive without `module-info.class` and without an
//! `Automatic-Module-Name` manifest attribute gets a module name derived from
//! its file name: the `.jar` extension and any trailing `-<version>` are
//! dropped, every non-alphanumeric character becomes a dot, repeated dots are
//! collapsed and leading/trailing dots removed.

use thiserror::Error;

const RESERVED_WORDS: &[&str] = &[
    "abstract",
    "assert",
    "boolean",
    "break",
    "byte",
    "case",
    "catch",
    "char",
    "class",
    "const",
    "continue",
    "default",
    "do",
    "double",
    "else",
    "enum",
    "extends",
    "final",
    "finally",
    "float",
    "for",
    "goto",
    "if",
    "implements",
    "import",
    "instanceof",
    "int",
    "interface",
    "long",
    "native",
    "new",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "short",
    "static",
    "strictfp",
    "super",
    "switch",
    "synchronized",
    "this",
    "throw",
    "throws",
    "transient",
    "try",
    "void",
    "volatile",
    "while",
    "true",
    "false",
    "null",
    "_",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModuleNameError {
    #[error("Unable to derive module name from '{0}'")]
    Underivable(String),

    #[error("Invalid module name '{name}': '{part}' is not a Java identifier")]
    NotAnIdentifier { name: String, part: String },

    #[error("Invalid module name '{name}': '{part}' is a reserved word")]
    ReservedWord { name: String, part: String },
}

/// Derived name and the version split off the file name, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedName {
    pub name: String,
    pub version: Option<String>,
}

/// Finds the first `-<digits>` followed by a dot or the end of the string.
fn version_start(stem: &str) -> Option<usize> {
    let bytes = stem.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b != b'-' {
            continue;
        }
        let digits = bytes[i + 1..]
            .iter()
            .take_while(|c| c.is_ascii_digit())
            .count();
        if digits == 0 {
            continue;
        }
        match bytes.get(i + 1 + digits) {
            None | Some(b'.') => return Some(i),
            _ => {}
        }
    }
    None
}

fn clean_module_name(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    for c in raw.chars() {
        let c = if c.is_ascii_alphanumeric() { c } else { '.' };
        if c == '.' && cleaned.ends_with('.') {
            continue;
        }
        cleaned.push(c);
    }
    cleaned.trim_matches('.').to_string()
}

/// Derives an automatic module name from an archive file name.
pub fn derive_module_name(file_name: &str) -> Result<DerivedName, ModuleNameError> {
    let stem = file_name
        .strip_suffix(".jar")
        .or_else(|| file_name.strip_suffix(".JAR"))
        .unwrap_or(file_name);

    let (base, version) = match version_start(stem) {
        Some(start) => (&stem[..start], Some(stem[start + 1..].to_string())),
        None => (stem, None),
    };

    let name = clean_module_name(base);
    if name.is_empty() {
        return Err(ModuleNameError::Underivable(file_name.to_string()));
    }
    validate_module_name(&name)?;

    Ok(DerivedName { name, version })
}

fn is_java_identifier(part: &str) -> bool {
    let mut chars = part.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Checks that every dot-separated part is a legal, non-reserved identifier.
pub fn validate_module_name(name: &str) -> Result<(), ModuleNameError> {
    for part in name.split('.') {
        if RESERVED_WORDS.contains(&part) {
            return Err(ModuleNameError::ReservedWord {
                name: name.to_string(),
                part: part.to_string(),
            });
        }
        if !is_java_identifier(part) {
            return Err(ModuleNameError::NotAnIdentifier {
                name: name.to_string(),
                part: part.to_string(),
            });
        }
    }
    Ok(())
}
