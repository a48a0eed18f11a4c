//! Module descriptor extraction from artifacts
//!
//! Handles the locations a module can live in: exploded directories, a bare
//! `module-info.class`, JMOD files and JAR archives (including multi-release
//! JARs). A location without any module information yields `Ok(None)`; only
//! genuine I/O, archive or class-format problems are errors.

use super::automatic::{derive_module_name, validate_module_name, ModuleNameError};
use super::classfile::{parse_module_info, ClassFormatError};
use super::manifest::{Manifest, MANIFEST_PATH};
use super::toolchain::ToolchainHome;
use super::{ModuleDescriptor, ModuleNameSource, DESCRIPTOR_NAME};
use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::trace;
use zip::result::ZipError;
use zip::ZipArchive;

const JMOD_MAGIC: [u8; 4] = [b'J', b'M', 0x01, 0x00];
const JMOD_DESCRIPTOR: &str = "classes/module-info.class";
const VERSIONS_PREFIX: &str = "META-INF/versions/";
const FIRST_MODULAR_RELEASE: u32 = 9;
const MAX_PREALLOCATION: u64 = 1 << 20;

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("Path does not exist: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: ZipError,
    },

    #[error("Malformed {entry} in {path}: {source}")]
    ClassFormat {
        path: PathBuf,
        entry: String,
        #[source]
        source: ClassFormatError,
    },

    #[error("JMOD file without module descriptor: {0}")]
    JmodWithoutDescriptor(PathBuf),

    #[error("Unable to name module {path}: {source}")]
    ModuleName {
        path: PathBuf,
        #[source]
        source: ModuleNameError,
    },
}

/// Reads the module descriptor carried by `path`, if any.
pub fn read_descriptor(
    path: &Path,
    toolchain: Option<&ToolchainHome>,
) -> Result<Option<ModuleDescriptor>, DescriptorError> {
    let metadata = fs::metadata(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            DescriptorError::NotFound(path.to_path_buf())
        } else {
            io_error(path, e)
        }
    })?;

    if metadata.is_dir() {
        return read_exploded(path);
    }

    if path.file_name().and_then(|n| n.to_str()) == Some(DESCRIPTOR_NAME) {
        let bytes = fs::read(path).map_err(|e| io_error(path, e))?;
        return parse_class(path, DESCRIPTOR_NAME, &bytes).map(Some);
    }

    if is_jmod(path)? {
        return read_jmod(path).map(Some);
    }

    read_jar(path, toolchain.and_then(ToolchainHome::feature_release))
}

fn io_error(path: &Path, source: io::Error) -> DescriptorError {
    DescriptorError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn archive_error(path: &Path, source: ZipError) -> DescriptorError {
    DescriptorError::Archive {
        path: path.to_path_buf(),
        source,
    }
}

fn parse_class(path: &Path, entry: &str, bytes: &[u8]) -> Result<ModuleDescriptor, DescriptorError> {
    parse_module_info(bytes).map_err(|source| DescriptorError::ClassFormat {
        path: path.to_path_buf(),
        entry: entry.to_string(),
        source,
    })
}

fn manifest_descriptor(
    path: &Path,
    manifest: &Manifest,
) -> Result<Option<ModuleDescriptor>, DescriptorError> {
    let Some(name) = manifest.automatic_module_name() else {
        return Ok(None);
    };
    validate_module_name(name).map_err(|source| DescriptorError::ModuleName {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(ModuleDescriptor::automatic(
        name,
        ModuleNameSource::Manifest,
    )))
}

fn read_exploded(dir: &Path) -> Result<Option<ModuleDescriptor>, DescriptorError> {
    let descriptor_path = dir.join(DESCRIPTOR_NAME);
    if descriptor_path.is_file() {
        let bytes = fs::read(&descriptor_path).map_err(|e| io_error(&descriptor_path, e))?;
        return parse_class(dir, DESCRIPTOR_NAME, &bytes).map(Some);
    }

    let manifest_path = dir.join(MANIFEST_PATH);
    if manifest_path.is_file() {
        let content = fs::read_to_string(&manifest_path).map_err(|e| io_error(&manifest_path, e))?;
        return manifest_descriptor(dir, &Manifest::parse(&content));
    }

    trace!(path = %dir.display(), "Exploded directory without module information");
    Ok(None)
}

fn is_jmod(path: &Path) -> Result<bool, DescriptorError> {
    let mut file = File::open(path).map_err(|e| io_error(path, e))?;
    let mut magic = [0u8; 4];
    match file.read_exact(&mut magic) {
        Ok(()) => Ok(magic == JMOD_MAGIC),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(io_error(path, e)),
    }
}

fn open_archive(path: &Path) -> Result<ZipArchive<BufReader<File>>, DescriptorError> {
    let file = File::open(path).map_err(|e| io_error(path, e))?;
    ZipArchive::new(BufReader::new(file)).map_err(|e| archive_error(path, e))
}

fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<Vec<u8>>, ZipError> {
    match archive.by_name(name) {
        Ok(mut entry) => {
            // declared sizes are untrusted
            let capacity = entry.size().min(MAX_PREALLOCATION) as usize;
            let mut bytes = Vec::with_capacity(capacity);
            entry.read_to_end(&mut bytes)?;
            Ok(Some(bytes))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(e),
    }
}

/// JMOD files are zip archives behind a four byte header.
fn read_jmod(path: &Path) -> Result<ModuleDescriptor, DescriptorError> {
    let mut archive = open_archive(path)?;
    let bytes = read_entry(&mut archive, JMOD_DESCRIPTOR)
        .map_err(|e| archive_error(path, e))?
        .ok_or_else(|| DescriptorError::JmodWithoutDescriptor(path.to_path_buf()))?;
    parse_class(path, JMOD_DESCRIPTOR, &bytes)
}

/// Picks the highest `META-INF/versions/<N>/module-info.class` with N not
/// above `release`.
fn versioned_descriptor_entry<'a>(
    names: impl Iterator<Item = &'a str>,
    release: Option<u32>,
) -> Option<String> {
    names
        .filter_map(|name| {
            let version = name
                .strip_prefix(VERSIONS_PREFIX)?
                .strip_suffix(DESCRIPTOR_NAME)?
                .strip_suffix('/')?
                .parse::<u32>()
                .ok()?;
            let applies =
                version >= FIRST_MODULAR_RELEASE && release.map(|r| version <= r).unwrap_or(true);
            applies.then_some((version, name))
        })
        .max_by_key(|(version, _)| *version)
        .map(|(_, name)| name.to_string())
}

fn read_jar(path: &Path, release: Option<u32>) -> Result<Option<ModuleDescriptor>, DescriptorError> {
    let mut archive = open_archive(path)?;

    let manifest = read_entry(&mut archive, MANIFEST_PATH)
        .map_err(|e| archive_error(path, e))?
        .map(|bytes| Manifest::parse(&String::from_utf8_lossy(&bytes)))
        .unwrap_or_default();

    let mut entry = None;
    if manifest.is_multi_release() {
        entry = versioned_descriptor_entry(archive.file_names(), release);
    }
    if entry.is_none() && archive.file_names().any(|n| n == DESCRIPTOR_NAME) {
        entry = Some(DESCRIPTOR_NAME.to_string());
    }

    if let Some(entry) = entry {
        let bytes = read_entry(&mut archive, &entry)
            .map_err(|e| archive_error(path, e))?
            .ok_or_else(|| archive_error(path, ZipError::FileNotFound))?;
        return parse_class(path, &entry, &bytes).map(Some);
    }

    if let Some(descriptor) = manifest_descriptor(path, &manifest)? {
        return Ok(Some(descriptor));
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let derived = derive_module_name(&file_name).map_err(|source| DescriptorError::ModuleName {
        path: path.to_path_buf(),
        source,
    })?;

    let mut descriptor = ModuleDescriptor::automatic(derived.name, ModuleNameSource::Filename);
    descriptor.version = derived.version;
    Ok(Some(descriptor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    fn write_jar(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        for (name, content) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_versioned_entry_selection() {
        let names = [
            "META-INF/versions/9/module-info.class",
            "META-INF/versions/11/module-info.class",
            "META-INF/versions/17/module-info.class",
            "META-INF/versions/11/org/Foo.class",
        ];
        assert_eq!(
            versioned_descriptor_entry(names.iter().copied(), Some(15)),
            Some("META-INF/versions/11/module-info.class".to_string())
        );
        assert_eq!(
            versioned_descriptor_entry(names.iter().copied(), None),
            Some("META-INF/versions/17/module-info.class".to_string())
        );
        assert_eq!(versioned_descriptor_entry(names.iter().copied(), Some(8)), None);
    }

    #[test]
    fn test_jar_with_manifest_name() {
        let temp = TempDir::new().unwrap();
        let jar = temp.path().join("lib-1.2.jar");
        write_jar(
            &jar,
            &[(MANIFEST_PATH, b"Manifest-Version: 1.0\nAutomatic-Module-Name: org.example.lib\n")],
        );

        let descriptor = read_descriptor(&jar, None).unwrap().unwrap();
        assert_eq!(descriptor.name, "org.example.lib");
        assert_eq!(descriptor.source, ModuleNameSource::Manifest);
        assert!(descriptor.is_automatic());
    }

    #[test]
    fn test_jar_named_from_filename() {
        let temp = TempDir::new().unwrap();
        let jar = temp.path().join("commons-io-2.11.0.jar");
        write_jar(&jar, &[("org/apache/commons/io/IOUtils.class", b"\xCA\xFE")]);

        let descriptor = read_descriptor(&jar, None).unwrap().unwrap();
        assert_eq!(descriptor.name, "commons.io");
        assert_eq!(descriptor.version.as_deref(), Some("2.11.0"));
        assert_eq!(descriptor.source, ModuleNameSource::Filename);
    }

    #[test]
    fn test_exploded_directory_without_descriptor() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("org/example")).unwrap();
        assert_eq!(read_descriptor(temp.path(), None).unwrap(), None);
    }

    #[test]
    fn test_missing_path() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.jar");
        assert!(matches!(
            read_descriptor(&missing, None),
            Err(DescriptorError::NotFound(_))
        ));
    }

    #[test]
    fn test_corrupt_archive() {
        let temp = TempDir::new().unwrap();
        let jar = temp.path().join("broken.jar");
        fs::write(&jar, b"this is not a zip file").unwrap();
        assert!(matches!(
            read_descriptor(&jar, None),
            Err(DescriptorError::Archive { .. })
        ));
    }

    #[test]
    fn test_inflated_declared_size() {
        let temp = TempDir::new().unwrap();
        let jar = temp.path().join("lib.jar");
        let file = File::create(&jar).unwrap();
        let mut zip = ZipWriter::new(file);
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        zip.start_file(MANIFEST_PATH, stored).unwrap();
        zip.write_all(b"Automatic-Module-Name: org.example.lib\n").unwrap();
        zip.finish().unwrap();

        // claim a ~4 GiB uncompressed size in both headers
        let mut bytes = fs::read(&jar).unwrap();
        let declared = 0xFFFF_FFF0u32.to_le_bytes();
        for (signature, offset) in [(0x0403_4b50u32, 22), (0x0201_4b50u32, 24)] {
            let start = bytes
                .windows(4)
                .position(|w| w == signature.to_le_bytes())
                .unwrap();
            bytes[start + offset..start + offset + 4].copy_from_slice(&declared);
        }
        fs::write(&jar, bytes).unwrap();

        let descriptor = read_descriptor(&jar, None).unwrap().unwrap();
        assert_eq!(descriptor.name, "org.example.lib");
    }

    #[test]
    fn test_invalid_manifest_name() {
        let temp = TempDir::new().unwrap();
        let jar = temp.path().join("lib.jar");
        write_jar(&jar, &[(MANIFEST_PATH, b"Automatic-Module-Name: org.1bad\n")]);
        assert!(matches!(
            read_descriptor(&jar, None),
            Err(DescriptorError::ModuleName { .. })
        ));
    }
}
