//! Fixture builders for integration tests
//!
//! Produces real `module-info.class` bytes, jars, jmods and exploded module
//! directories inside a temporary project.

#![allow(dead_code)]

use std::fs::{self, File};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const TAG_UTF8: u8 = 1;
const TAG_CLASS: u8 = 7;
const TAG_MODULE: u8 = 19;
const TAG_PACKAGE: u8 = 20;

const ACC_MODULE: u16 = 0x8000;
pub const ACC_TRANSITIVE: u16 = 0x0020;
pub const ACC_STATIC_PHASE: u16 = 0x0040;

#[derive(Default)]
struct ConstantPool {
    bytes: Vec<u8>,
    count: u16,
}

impl ConstantPool {
    fn utf8(&mut self, value: &str) -> u16 {
        self.bytes.push(TAG_UTF8);
        self.bytes
            .extend_from_slice(&(value.len() as u16).to_be_bytes());
        self.bytes.extend_from_slice(value.as_bytes());
        self.count += 1;
        self.count
    }

    fn named(&mut self, tag: u8, value: &str) -> u16 {
        let name = self.utf8(value);
        self.bytes.push(tag);
        self.bytes.extend_from_slice(&name.to_be_bytes());
        self.count += 1;
        self.count
    }
}

/// Builder for a compiled module declaration
#[derive(Debug, Clone, Default)]
pub struct ModuleInfo {
    name: String,
    version: Option<String>,
    requires: Vec<(String, u16)>,
    exports: Vec<String>,
    main_class: Option<String>,
}

impl ModuleInfo {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    pub fn requires(mut self, module: &str) -> Self {
        self.requires.push((module.to_string(), 0));
        self
    }

    pub fn requires_static(mut self, module: &str) -> Self {
        self.requires.push((module.to_string(), ACC_STATIC_PHASE));
        self
    }

    pub fn requires_transitive(mut self, module: &str) -> Self {
        self.requires.push((module.to_string(), ACC_TRANSITIVE));
        self
    }

    /// Package in dotted form, e.g. `org.example.api`
    pub fn exports(mut self, package: &str) -> Self {
        self.exports.push(package.to_string());
        self
    }

    /// Binary class name, e.g. `org.example.Main`
    pub fn main_class(mut self, class: &str) -> Self {
        self.main_class = Some(class.to_string());
        self
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut pool = ConstantPool::default();
        let this_class = pool.named(TAG_CLASS, "module-info");
        let module = pool.named(TAG_MODULE, &self.name);
        let version = self.version.as_deref().map(|v| pool.utf8(v)).unwrap_or(0);
        let requires: Vec<(u16, u16)> = self
            .requires
            .iter()
            .map(|(name, flags)| (pool.named(TAG_MODULE, name), *flags))
            .collect();
        let exports: Vec<u16> = self
            .exports
            .iter()
            .map(|p| pool.named(TAG_PACKAGE, &p.replace('.', "/")))
            .collect();
        let main_class = self
            .main_class
            .as_deref()
            .map(|c| pool.named(TAG_CLASS, &c.replace('.', "/")));
        let module_attr_name = pool.utf8("Module");
        let main_attr_name = main_class.map(|_| pool.utf8("ModuleMainClass"));

        let mut attr = Vec::new();
        attr.extend_from_slice(&module.to_be_bytes());
        attr.extend_from_slice(&0u16.to_be_bytes());
        attr.extend_from_slice(&version.to_be_bytes());
        attr.extend_from_slice(&(requires.len() as u16).to_be_bytes());
        for (index, flags) in &requires {
            attr.extend_from_slice(&index.to_be_bytes());
            attr.extend_from_slice(&flags.to_be_bytes());
            attr.extend_from_slice(&0u16.to_be_bytes());
        }
        attr.extend_from_slice(&(exports.len() as u16).to_be_bytes());
        for index in &exports {
            attr.extend_from_slice(&index.to_be_bytes());
            attr.extend_from_slice(&[0, 0, 0, 0]);
        }
        // opens, uses, provides
        attr.extend_from_slice(&[0, 0, 0, 0, 0, 0]);

        let mut b = Vec::new();
        b.extend_from_slice(&0xCAFE_BABEu32.to_be_bytes());
        b.extend_from_slice(&[0, 0, 0, 61]);
        b.extend_from_slice(&(pool.count + 1).to_be_bytes());
        b.extend_from_slice(&pool.bytes);
        b.extend_from_slice(&ACC_MODULE.to_be_bytes());
        b.extend_from_slice(&this_class.to_be_bytes());
        // super_class, interfaces, fields, methods
        b.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 0]);

        let attribute_count: u16 = if main_attr_name.is_some() { 2 } else { 1 };
        b.extend_from_slice(&attribute_count.to_be_bytes());
        b.extend_from_slice(&module_attr_name.to_be_bytes());
        b.extend_from_slice(&(attr.len() as u32).to_be_bytes());
        b.extend_from_slice(&attr);
        if let (Some(name), Some(class)) = (main_attr_name, main_class) {
            b.extend_from_slice(&name.to_be_bytes());
            b.extend_from_slice(&2u32.to_be_bytes());
            b.extend_from_slice(&class.to_be_bytes());
        }
        b
    }
}

fn zip_bytes(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(content).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// Temporary project with a `target/classes` output directory
pub struct Project {
    pub dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("target/classes")).unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Canonical root, as file-set expansion reports it
    pub fn canonical_root(&self) -> PathBuf {
        self.dir.path().canonicalize().unwrap()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn output_directory(&self) -> PathBuf {
        self.path("target/classes")
    }

    fn prepare(&self, relative: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        path
    }

    /// Declares the output directory a module.
    pub fn compile_main_module(&self, info: &ModuleInfo) {
        fs::write(
            self.output_directory().join("module-info.class"),
            info.to_bytes(),
        )
        .unwrap();
    }

    pub fn write_file(&self, relative: &str, content: &[u8]) -> PathBuf {
        let path = self.prepare(relative);
        fs::write(&path, content).unwrap();
        path
    }

    pub fn jar(&self, relative: &str, entries: &[(&str, Vec<u8>)]) -> PathBuf {
        let path = self.prepare(relative);
        fs::write(&path, zip_bytes(entries)).unwrap();
        path
    }

    pub fn modular_jar(&self, relative: &str, info: &ModuleInfo) -> PathBuf {
        self.jar(relative, &[("module-info.class", info.to_bytes())])
    }

    /// Jar without a descriptor or manifest name; named after its file.
    pub fn plain_jar(&self, relative: &str) -> PathBuf {
        self.jar(relative, &[("org/example/Util.class", vec![0xCA, 0xFE])])
    }

    pub fn manifest_jar(&self, relative: &str, automatic_name: &str) -> PathBuf {
        let manifest = format!(
            "Manifest-Version: 1.0\r\nAutomatic-Module-Name: {}\r\n",
            automatic_name
        );
        self.jar(relative, &[("META-INF/MANIFEST.MF", manifest.into_bytes())])
    }

    /// Multi-release jar with one descriptor per `(release, module)`.
    pub fn multi_release_jar(&self, relative: &str, versions: &[(u32, &ModuleInfo)]) -> PathBuf {
        let mut entries = vec![(
            "META-INF/MANIFEST.MF".to_string(),
            b"Manifest-Version: 1.0\r\nMulti-Release: true\r\n".to_vec(),
        )];
        for (release, info) in versions {
            entries.push((
                format!("META-INF/versions/{}/module-info.class", release),
                info.to_bytes(),
            ));
        }
        let borrowed: Vec<(&str, Vec<u8>)> = entries
            .iter()
            .map(|(name, bytes)| (name.as_str(), bytes.clone()))
            .collect();
        self.jar(relative, &borrowed)
    }

    pub fn jmod(&self, relative: &str, info: &ModuleInfo) -> PathBuf {
        let path = self.prepare(relative);
        let mut file = File::create(&path).unwrap();
        file.write_all(&[b'J', b'M', 0x01, 0x00]).unwrap();
        file.write_all(&zip_bytes(&[("classes/module-info.class", info.to_bytes())]))
            .unwrap();
        path
    }

    pub fn exploded_module(&self, relative: &str, info: &ModuleInfo) -> PathBuf {
        let path = self.path(relative);
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join("module-info.class"), info.to_bytes()).unwrap();
        path
    }

    /// Toolchain home whose `release` file declares `java_version`.
    pub fn toolchain(&self, relative: &str, java_version: &str) -> PathBuf {
        let path = self.path(relative);
        fs::create_dir_all(&path).unwrap();
        fs::write(
            path.join("release"),
            format!("JAVA_VERSION=\"{}\"\n", java_version),
        )
        .unwrap();
        path
    }

    pub fn write_config(&self, content: &str) -> PathBuf {
        self.write_file("jlinkpath.toml", content.as_bytes())
    }
}
