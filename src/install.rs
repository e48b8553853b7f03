//! Where the game keeps its save data, and reading it from disk.

use crate::{Catalog, Error, ErrorKind};
use std::{
    env, fs, io,
    path::{Path, PathBuf},
};
use tracing::debug;
use walkdir::WalkDir;

const GAME_FOLDER: &str = "Turing Complete";
const CIRCUIT_FILE: &str = "circuit.data";

/// The root of a Turing Complete save directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveDirectory {
    root: PathBuf,
}

impl SaveDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        SaveDirectory { root: root.into() }
    }

    /// The default location the game saves to on this operating system, if
    /// the environment variables it derives from are set
    pub fn locate() -> Option<Self> {
        let root = if cfg!(target_os = "windows") {
            PathBuf::from(env::var_os("APPDATA")?)
                .join("godot")
                .join("app_userdata")
        } else if cfg!(target_os = "macos") {
            PathBuf::from(env::var_os("HOME")?)
                .join("Library")
                .join("Application Support")
                .join("Godot")
                .join("app_userdata")
        } else {
            PathBuf::from(env::var_os("HOME")?)
                .join(".local")
                .join("share")
                .join("godot")
                .join("app_userdata")
        };

        Some(SaveDirectory::new(root.join(GAME_FOLDER)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The saved architecture with the given folder name
    pub fn architecture(&self, arch: &str) -> PathBuf {
        let mut path = self.root.join("schematics").join("architecture");
        path.extend(arch.split('/'));
        path.join(CIRCUIT_FILE)
    }

    pub fn component_factory(&self) -> PathBuf {
        self.root.join("schematics").join("component_factory")
    }

    /// The player's level scores
    pub fn scores(&self) -> PathBuf {
        self.root.join("levels.txt")
    }

    /// Read every custom component definition in the component factory,
    /// ordered by name
    pub fn read_components(&self) -> Result<Vec<ComponentFile>, Error> {
        let factory = self.component_factory();
        let mut out = Vec::new();
        let walker = WalkDir::new(&factory).sort_by_file_name();
        for entry in walker {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() || entry.file_name() != CIRCUIT_FILE {
                continue;
            }

            let path = entry.into_path();
            let name = component_name(&factory, &path);
            let data = fs::read(&path)?;
            out.push(ComponentFile { name, path, data });
        }

        debug!(
            "found {} components under {}",
            out.len(),
            factory.display()
        );
        Ok(out)
    }
}

/// A `circuit.data` file of the component factory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentFile {
    /// Folder relative to the component factory, `/` separated
    pub name: String,
    pub path: PathBuf,
    pub data: Vec<u8>,
}

/// Build a catalog from the files read out of the component factory.
///
/// Every file must be a supported schematic. The first one that can't be
/// identified fails the whole catalog with its path attached.
pub fn catalog(files: &[ComponentFile]) -> Result<Catalog<'_>, Error> {
    let mut catalog = Catalog::new();
    for file in files {
        catalog.insert(&file.name, &file.data).map_err(|source| {
            Error::new(ErrorKind::InvalidComponent {
                path: file.path.clone(),
                source,
            })
        })?;
    }
    Ok(catalog)
}

fn component_name(factory: &Path, path: &Path) -> String {
    let folder = path
        .parent()
        .and_then(|parent| parent.strip_prefix(factory).ok())
        .unwrap_or_else(|| Path::new(""));

    let parts: Vec<_> = folder
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{encode_save, FormatVersion};

    fn component(id: u64) -> Vec<u8> {
        let mut payload = id.to_le_bytes().to_vec();
        payload.extend_from_slice(&[0; 31]);
        encode_save(FormatVersion::CURRENT, &payload)
    }

    #[test]
    fn test_paths() {
        let save = SaveDirectory::new("/saves");
        assert_eq!(
            save.architecture("tc/cpu"),
            Path::new("/saves/schematics/architecture/tc/cpu/circuit.data")
        );
        assert_eq!(save.scores(), Path::new("/saves/levels.txt"));
    }

    #[test]
    fn test_read_components() {
        let dir = tempfile::tempdir().unwrap();
        let save = SaveDirectory::new(dir.path());
        let factory = save.component_factory();

        let adder = factory.join("alu").join("adder");
        fs::create_dir_all(&adder).unwrap();
        fs::write(adder.join(CIRCUIT_FILE), component(2)).unwrap();
        fs::write(adder.join("notes.txt"), b"ignored").unwrap();

        let decoder = factory.join("decoder");
        fs::create_dir_all(&decoder).unwrap();
        fs::write(decoder.join(CIRCUIT_FILE), component(3)).unwrap();

        let files = save.read_components().unwrap();
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["alu/adder", "decoder"]);

        let catalog = catalog(&files).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(2).map(|e| e.name()), Some("alu/adder"));
        assert_eq!(catalog.get(3).map(|e| e.name()), Some("decoder"));
    }

    #[test]
    fn test_unreadable_component_fails_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let save = SaveDirectory::new(dir.path());
        let factory = save.component_factory();

        let adder = factory.join("adder");
        fs::create_dir_all(&adder).unwrap();
        fs::write(adder.join(CIRCUIT_FILE), component(2)).unwrap();

        // Version 5 predates the supported formats
        let mut legacy = component(3);
        legacy[0] = 5;
        let old = factory.join("old");
        fs::create_dir_all(&old).unwrap();
        fs::write(old.join(CIRCUIT_FILE), legacy).unwrap();

        let files = save.read_components().unwrap();
        let err = catalog(&files).unwrap_err();
        match err.kind() {
            ErrorKind::InvalidComponent { path, source } => {
                assert_eq!(path, &old.join(CIRCUIT_FILE));
                assert!(matches!(
                    source.kind(),
                    ErrorKind::UnsupportedVersion { version: 5 }
                ));
            }
            kind => panic!("unexpected error: {:?}", kind),
        }
        assert!(err.to_string().contains("unsupported schematic format version: 5"));
    }

    #[test]
    fn test_corrupt_component_fails_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let save = SaveDirectory::new(dir.path());
        let broken = save.component_factory().join("broken");
        fs::create_dir_all(&broken).unwrap();
        fs::write(broken.join(CIRCUIT_FILE), [10, 0x08, 0x00]).unwrap();

        let files = save.read_components().unwrap();
        let err = catalog(&files).unwrap_err().into_kind();
        match err {
            ErrorKind::InvalidComponent { source, .. } => assert!(matches!(
                source.kind(),
                ErrorKind::MalformedCompression(_)
            )),
            kind => panic!("unexpected error: {:?}", kind),
        }
    }

    #[test]
    fn test_missing_factory() {
        let dir = tempfile::tempdir().unwrap();
        let save = SaveDirectory::new(dir.path().join("nope"));
        assert!(save.read_components().is_err());
    }
}
