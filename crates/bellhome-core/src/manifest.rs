//! Full two-party experiments and their JSON manifest.
//!
//! [`run_experiment`] drives Alice then Bob through the pipeline against one
//! store, audits both, scores CHSH and returns a [`RunManifest`]. The manifest
//! carries a SHA-256 digest of every encoded sequence, so two runs with the
//! same parameters can be compared without diffing the sequences themselves.
//!
//! # Storage Format
//!
//! [`write_manifest`] stores the manifest as `run.json` next to the `.dat`
//! files of a [`DirStore`](crate::store::DirStore).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::chsh::ChshReport;
use crate::codec::{BitCodec, LineCodec};
use crate::config::RunConfig;
use crate::device::BellDevice;
use crate::error::Result;
use crate::party::Party;
use crate::store::{Artifact, ArtifactStore};
use crate::stream::{PartySeeds, SeedBook};

/// File name of the manifest inside a run directory.
pub const MANIFEST_FILE: &str = "run.json";

// ---------------------------------------------------------------------------
// Manifest types
// ---------------------------------------------------------------------------

/// What one party's pipeline did.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyReport {
    pub party: Party,
    pub seeds: PartySeeds,
    pub flips: usize,
    pub draws: usize,
    /// Twice the flipped fraction of raw bits.
    pub average_bias: f64,
}

/// Record of a complete experiment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub version: u32,
    pub id: String,
    pub started_at: String,
    pub ended_at: String,
    pub duration_ms: u64,
    pub config: RunConfig,
    pub parties: Vec<PartyReport>,
    pub chsh: ChshReport,
    /// SHA-256 (hex) of each encoded sequence, keyed by file name.
    pub artifacts: BTreeMap<String, String>,
    pub bellhome_version: String,
}

impl RunManifest {
    pub fn party(&self, party: Party) -> Option<&PartyReport> {
        self.parties.iter().find(|p| p.party == party)
    }
}

// ---------------------------------------------------------------------------
// Experiment driver
// ---------------------------------------------------------------------------

/// Run both parties, audit their bias and score CHSH.
pub fn run_experiment<S: ArtifactStore>(config: RunConfig, store: &mut S) -> Result<RunManifest> {
    config.validate()?;
    let started_at = SystemTime::now();
    let started = Instant::now();
    let seeds = SeedBook::derive();

    let mut parties = Vec::with_capacity(2);
    for party in Party::ALL {
        let mut device = BellDevice::new(config, party, store)?;
        let injection = device.run()?;
        let average_bias = device.compute_average_bias()?;
        parties.push(PartyReport {
            party,
            seeds: *seeds.get(party),
            flips: injection.flips,
            draws: injection.draws,
            average_bias,
        });
    }

    let chsh = BellDevice::new(config, Party::Bob, store)?.compute_chsh()?;
    let artifacts = artifact_digests(store)?;

    let ended_at = SystemTime::now();
    Ok(RunManifest {
        version: 1,
        id: Uuid::new_v4().to_string(),
        started_at: format_iso8601(since_epoch(started_at)),
        ended_at: format_iso8601(since_epoch(ended_at)),
        duration_ms: started.elapsed().as_millis() as u64,
        config,
        parties,
        chsh,
        artifacts,
        bellhome_version: crate::VERSION.to_string(),
    })
}

/// SHA-256 of the line-encoded form of every sequence present in `store`.
pub fn artifact_digests<S: ArtifactStore>(store: &S) -> Result<BTreeMap<String, String>> {
    let codec = LineCodec::default();
    let mut digests = BTreeMap::new();
    for artifact in Artifact::all().filter(|a| store.contains(*a)) {
        let text = codec.encode(&store.read(artifact)?)?;
        let digest: [u8; 32] = Sha256::digest(text.as_bytes()).into();
        digests.insert(artifact.file_name(), hex_encode(&digest));
    }
    Ok(digests)
}

/// Write `manifest` as pretty JSON to `dir/run.json`.
pub fn write_manifest(manifest: &RunManifest, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(MANIFEST_FILE);
    fs::write(&path, serde_json::to_string_pretty(manifest)?)?;
    Ok(path)
}

/// Load a manifest previously written by [`write_manifest`].
pub fn read_manifest(dir: &Path) -> Result<RunManifest> {
    let json = fs::read_to_string(dir.join(MANIFEST_FILE))?;
    Ok(serde_json::from_str(&json)?)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn since_epoch(t: SystemTime) -> Duration {
    t.duration_since(UNIX_EPOCH).unwrap_or_default()
}

/// Hex-encode bytes without any separator.
fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
        let _ = write!(s, "{b:02x}");
        s
    })
}

/// Format a duration-since-epoch as an ISO-8601 timestamp.
/// Example: `2026-02-15T01:30:00Z`
fn format_iso8601(since_epoch: Duration) -> String {
    let (year, month, day, hour, min, sec) = secs_to_utc(since_epoch.as_secs());
    format!("{year:04}-{month:02}-{day:02}T{hour:02}:{min:02}:{sec:02}Z")
}

/// Seconds since the Unix epoch to (year, month, day, hour, minute, second) UTC.
/// No leap seconds.
fn secs_to_utc(secs: u64) -> (u64, u64, u64, u64, u64, u64) {
    let sec = secs % 60;
    let min = (secs / 60) % 60;
    let hour = (secs / 3600) % 24;

    let mut days = secs / 86400;
    let mut year = 1970u64;
    loop {
        let days_in_year = if is_leap(year) { 366 } else { 365 };
        if days < days_in_year {
            break;
        }
        days -= days_in_year;
        year += 1;
    }

    let february = if is_leap(year) { 29 } else { 28 };
    let months_days: [u64; 12] = [31, february, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

    let mut month = 12u64;
    for (i, &md) in months_days.iter().enumerate() {
        if days < md {
            month = i as u64 + 1;
            break;
        }
        days -= md;
    }

    (year, month, days + 1, hour, min, sec)
}

fn is_leap(year: u64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
