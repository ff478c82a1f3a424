//! Storage of the per-party bit sequences exchanged between pipeline stages.
//!
//! The pipeline only talks to the [`ArtifactStore`] trait, so every stage can
//! be exercised in memory with [`MemoryStore`] and persisted with [`DirStore`]
//! (one `.dat` file per sequence, written through a [`BitCodec`]).

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::codec::{BitCodec, LineCodec};
use crate::error::{BellError, Result, ensure_bits};
use crate::party::Party;

/// Kind of sequence a party produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Raw bits, `k * n`.
    Randomness,
    /// Raw bits after bias injection, `k * n`.
    BiasedRandomness,
    /// Settings, `n`.
    Questions,
    /// Outcomes, `n`.
    Answers,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 4] = [
        Self::Randomness,
        Self::BiasedRandomness,
        Self::Questions,
        Self::Answers,
    ];
}

/// A sequence owned by one party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Artifact {
    pub party: Party,
    pub kind: ArtifactKind,
}

impl Artifact {
    pub const fn new(party: Party, kind: ArtifactKind) -> Self {
        Self { party, kind }
    }

    /// File name, e.g. `randomnessAlice_biased.dat` or `answersBob.dat`.
    pub fn file_name(&self) -> String {
        let p = self.party.name();
        match self.kind {
            ArtifactKind::Randomness => format!("randomness{p}.dat"),
            ArtifactKind::BiasedRandomness => format!("randomness{p}_biased.dat"),
            ArtifactKind::Questions => format!("questions{p}.dat"),
            ArtifactKind::Answers => format!("answers{p}.dat"),
        }
    }

    /// Every artifact of a run, Alice first.
    pub fn all() -> impl Iterator<Item = Artifact> {
        Party::ALL.into_iter().flat_map(|party| {
            ArtifactKind::ALL
                .into_iter()
                .map(move |kind| Artifact::new(party, kind))
        })
    }
}

impl std::fmt::Display for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.file_name())
    }
}

/// Write-once / read-many storage for bit sequences.
pub trait ArtifactStore {
    fn write(&mut self, artifact: Artifact, bits: &[u8]) -> Result<()>;

    /// Read a sequence; [`BellError::MissingArtifact`] if it was never written.
    fn read(&self, artifact: Artifact) -> Result<Vec<u8>>;

    fn contains(&self, artifact: Artifact) -> bool;

    /// Remove every stored sequence, returning how many were removed.
    fn clear(&mut self) -> Result<usize>;
}

/// In-memory store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    sequences: HashMap<Artifact, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

impl ArtifactStore for MemoryStore {
    fn write(&mut self, artifact: Artifact, bits: &[u8]) -> Result<()> {
        ensure_bits(&artifact.file_name(), bits)?;
        self.sequences.insert(artifact, bits.to_vec());
        Ok(())
    }

    fn read(&self, artifact: Artifact) -> Result<Vec<u8>> {
        self.sequences
            .get(&artifact)
            .cloned()
            .ok_or_else(|| BellError::MissingArtifact(artifact.file_name()))
    }

    fn contains(&self, artifact: Artifact) -> bool {
        self.sequences.contains_key(&artifact)
    }

    fn clear(&mut self) -> Result<usize> {
        let n = self.sequences.len();
        self.sequences.clear();
        Ok(n)
    }
}

/// Directory of `.dat` files.
#[derive(Debug, Clone)]
pub struct DirStore<C: BitCodec = LineCodec> {
    dir: PathBuf,
    codec: C,
}

impl DirStore<LineCodec> {
    /// Store rooted at `dir` with the default 64-column codec. The directory
    /// is created if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        Self::with_codec(dir, LineCodec::default())
    }
}

impl<C: BitCodec> DirStore<C> {
    pub fn with_codec(dir: impl Into<PathBuf>, codec: C) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, codec })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, artifact: Artifact) -> PathBuf {
        self.dir.join(artifact.file_name())
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }
}

impl<C: BitCodec> ArtifactStore for DirStore<C> {
    fn write(&mut self, artifact: Artifact, bits: &[u8]) -> Result<()> {
        ensure_bits(&artifact.file_name(), bits)?;
        let text = self.codec.encode(bits)?;
        fs::write(self.path_of(artifact), text)?;
        Ok(())
    }

    fn read(&self, artifact: Artifact) -> Result<Vec<u8>> {
        let path = self.path_of(artifact);
        if !path.exists() {
            return Err(BellError::MissingArtifact(path.display().to_string()));
        }
        let text = fs::read_to_string(path)?;
        self.codec.decode(&text)
    }

    fn contains(&self, artifact: Artifact) -> bool {
        self.path_of(artifact).is_file()
    }

    fn clear(&mut self) -> Result<usize> {
        remove_data_files(&self.dir)
    }
}

/// Delete every `*.dat` file directly inside `dir` (not recursive).
pub fn remove_data_files(dir: &Path) -> Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "dat") {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }
    log::info!("removed {removed} data file(s) from {}", dir.display());
    Ok(removed)
}
