use crate::model::Clinic;
use anyhow::Context;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub trait Storage {
    /// Charge l'état de la clinique depuis un support.
    fn load(&self) -> anyhow::Result<Clinic>;
    /// Sauvegarde de manière atomique.
    fn save(&self, clinic: &Clinic) -> anyhow::Result<()>;
}

pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
        })
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Comme `load`, mais une clinique vide si le fichier n'existe pas encore.
    pub fn load_or_default(&self) -> anyhow::Result<Clinic> {
        if !self.exists() {
            return Ok(Clinic::default());
        }
        self.load()
    }
}

impl Storage for JsonStorage {
    fn load(&self) -> anyhow::Result<Clinic> {
        let data = fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        let clinic: Clinic = serde_json::from_slice(&data)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(clinic)
    }

    fn save(&self, clinic: &Clinic) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(clinic)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).with_context(|| "atomic rename")?;
        Ok(())
    }
}
