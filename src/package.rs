use crate::{deps::Catalog, Error, SchematicHeader};

/// Collects an architecture and every custom component it depends on into
/// the layout the game expects when the files are extracted into a save
/// directory.
///
/// ```rust
/// use tcsave::{encode_save, Catalog, FormatVersion, Packager};
/// let mut payload = vec![0u8; 39]; // id 0, gate 0, delay 0, no dependencies
/// payload[12] = 42; // gate
/// let arch = encode_save(FormatVersion::CURRENT, &payload);
///
/// let plan = Packager::new("cpus/overture").plan(&arch, &Catalog::new())?;
/// assert_eq!(plan.archive_name(), "overture_42_0.zip");
/// assert_eq!(
///     plan.entries()[0].path(),
///     "schematics/architecture/tc-archs/cpus/overture/circuit.data"
/// );
/// # Ok::<(), tcsave::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Packager<'a> {
    arch: String,
    scores: Option<&'a [u8]>,
}

impl<'a> Packager<'a> {
    /// Package the architecture saved under the given folder name
    pub fn new(arch: impl Into<String>) -> Self {
        Packager {
            arch: arch.into(),
            scores: None,
        }
    }

    /// Also ship the player's level scores (the contents of `levels.txt`)
    #[must_use]
    pub fn scores(mut self, data: &'a [u8]) -> Self {
        self.scores = Some(data);
        self
    }

    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// Resolve the dependencies of the architecture and lay out the archive
    pub fn plan(&self, architecture: &'a [u8], catalog: &Catalog<'a>) -> Result<PackagePlan<'a>, Error> {
        let header = SchematicHeader::from_slice(architecture)?;
        let dependencies = catalog.closure(header.id, &header.dependencies)?;

        let basename = self.arch.rsplit('/').next().unwrap_or(&self.arch);
        let archive_name = format!("{}_{}_{}.zip", basename, header.gate, header.delay);

        let mut entries = Vec::with_capacity(dependencies.len() + 2);
        entries.push(PackageEntry {
            path: format!("schematics/architecture/tc-archs/{}/circuit.data", self.arch),
            data: architecture,
        });

        for entry in dependencies {
            entries.push(PackageEntry {
                path: format!(
                    "schematics/component_factory/tc-archs/{}/{}/circuit.data",
                    self.arch,
                    entry.name()
                ),
                data: entry.data(),
            });
        }

        if let Some(data) = self.scores {
            entries.push(PackageEntry {
                path: String::from("levels.txt"),
                data,
            });
        }

        Ok(PackagePlan {
            archive_name,
            entries,
        })
    }
}

/// A file to place in the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageEntry<'a> {
    path: String,
    data: &'a [u8],
}

impl<'a> PackageEntry<'a> {
    /// Path inside the archive, `/` separated
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }
}

/// The name and contents of an archive, ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagePlan<'a> {
    archive_name: String,
    entries: Vec<PackageEntry<'a>>,
}

impl<'a> PackagePlan<'a> {
    /// Suggested file name: the architecture's folder name followed by its
    /// gate count and delay
    pub fn archive_name(&self) -> &str {
        &self.archive_name
    }

    /// The architecture first, then dependencies ordered by name, then the
    /// scores if requested
    pub fn entries(&self) -> &[PackageEntry<'a>] {
        &self.entries
    }

    /// Write the entries as a zip archive, returning the inner writer
    #[cfg(feature = "archive")]
    pub fn write_zip<W>(&self, writer: W) -> Result<W, Error>
    where
        W: std::io::Write + std::io::Seek,
    {
        use std::io::Write;
        use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut zip = ZipWriter::new(writer);
        for entry in &self.entries {
            tracing::info!("Adding {}", entry.path);
            zip.start_file(entry.path.as_str(), options)?;
            zip.write_all(entry.data)?;
        }

        Ok(zip.finish()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{encode_save, ErrorKind, FormatVersion};

    fn file(id: u64, gate: i64, delay: i64, dependencies: &[u64]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&id.to_le_bytes());
        out.extend_from_slice(&[0; 4]);
        out.extend_from_slice(&gate.to_le_bytes());
        out.extend_from_slice(&delay.to_le_bytes());
        out.push(0);
        out.extend_from_slice(&[0; 8]);
        out.extend_from_slice(&(dependencies.len() as u16).to_le_bytes());
        for dep in dependencies {
            out.extend_from_slice(&dep.to_le_bytes());
        }
        encode_save(FormatVersion::CURRENT, &out)
    }

    struct Save {
        arch: Vec<u8>,
        components: Vec<(&'static str, Vec<u8>)>,
    }

    impl Save {
        fn new() -> Self {
            Save {
                arch: file(1, 1234, 56, &[3, 2]),
                components: vec![
                    ("alu/adder", file(2, 0, 0, &[4])),
                    ("decoder", file(3, 0, 0, &[4])),
                    ("alu/full adder", file(4, 0, 0, &[])),
                    ("unused", file(5, 0, 0, &[])),
                ],
            }
        }

        fn catalog(&self) -> Catalog {
            let mut catalog = Catalog::new();
            for (name, data) in &self.components {
                catalog.insert(name, data).unwrap();
            }
            catalog
        }
    }

    #[test]
    fn test_plan_layout() {
        let save = Save::new();
        let catalog = save.catalog();
        let plan = Packager::new("tc/cpu")
            .scores(b"level scores")
            .plan(&save.arch, &catalog)
            .unwrap();

        assert_eq!(plan.archive_name(), "cpu_1234_56.zip");
        let paths: Vec<_> = plan.entries().iter().map(|e| e.path()).collect();
        assert_eq!(
            paths,
            vec![
                "schematics/architecture/tc-archs/tc/cpu/circuit.data",
                "schematics/component_factory/tc-archs/tc/cpu/alu/adder/circuit.data",
                "schematics/component_factory/tc-archs/tc/cpu/alu/full adder/circuit.data",
                "schematics/component_factory/tc-archs/tc/cpu/decoder/circuit.data",
                "levels.txt",
            ]
        );
        assert_eq!(plan.entries()[0].data(), save.arch.as_slice());
        assert_eq!(plan.entries()[1].data(), save.components[0].1.as_slice());
    }

    #[test]
    fn test_plan_without_scores() {
        let save = Save::new();
        let catalog = save.catalog();
        let plan = Packager::new("cpu").plan(&save.arch, &catalog).unwrap();
        assert_eq!(plan.entries().len(), 4);
        assert!(plan.entries().iter().all(|e| e.path() != "levels.txt"));
    }

    #[test]
    fn test_plan_missing_dependency() {
        let save = Save::new();
        let mut catalog = Catalog::new();
        catalog.insert("decoder", &save.components[1].1).unwrap();
        catalog.insert("alu/full adder", &save.components[2].1).unwrap();
        let err = Packager::new("cpu").plan(&save.arch, &catalog).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::MissingDependency { id: 2 }));
    }

    #[cfg(feature = "archive")]
    #[test]
    fn test_write_zip() {
        use std::io::{Cursor, Read};

        let save = Save::new();
        let catalog = save.catalog();
        let plan = Packager::new("cpu").plan(&save.arch, &catalog).unwrap();
        let cursor = plan.write_zip(Cursor::new(Vec::new())).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap();
        assert_eq!(archive.len(), plan.entries().len());
        for entry in plan.entries() {
            let mut file = archive.by_name(entry.path()).unwrap();
            let mut data = Vec::new();
            file.read_to_end(&mut data).unwrap();
            assert_eq!(data, entry.data());
        }
    }
}
