//! Astro-cat roster: registration, mission assignment and JSON persistence.
//!
//! Cats are kept in registration order and names are unique. Persistence
//! writes the whole roster as `{"cats": [{"name", "rank", "missions"}]}`; a
//! missing file loads as an empty roster. A file that repeats a name keeps
//! the first position and the last entry's data.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("a cat named '{0}' is already registered")]
    DuplicateCat(String),
    #[error("unknown cat: '{0}'")]
    UnknownCat(String),
    #[error("mission name cannot be empty")]
    EmptyMission,
    #[error("failed to access roster file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("roster file {} is malformed: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AstroCat {
    pub name: String,
    pub rank: String,
    #[serde(default)]
    pub missions: Vec<String>,
}

impl AstroCat {
    pub fn new(name: impl Into<String>, rank: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rank: rank.into(),
            missions: Vec::new(),
        }
    }

    /// Append a mission; surrounding whitespace is trimmed.
    pub fn assign_mission(&mut self, mission: &str) -> Result<(), RosterError> {
        let mission = mission.trim();
        if mission.is_empty() {
            return Err(RosterError::EmptyMission);
        }
        self.missions.push(mission.to_string());
        Ok(())
    }

    pub fn summary(&self) -> String {
        let report = if self.missions.is_empty() {
            "No missions assigned".to_string()
        } else {
            self.missions.join(", ")
        };
        format!("{} ({}) — {}", self.name, self.rank, report)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    cats: Vec<AstroCat>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_cat(&mut self, name: &str, rank: &str) -> Result<&AstroCat, RosterError> {
        if self.cats.iter().any(|cat| cat.name == name) {
            return Err(RosterError::DuplicateCat(name.to_string()));
        }
        self.cats.push(AstroCat::new(name, rank));
        log::info!("Registered {name} with rank {rank}");
        Ok(&self.cats[self.cats.len() - 1])
    }

    pub fn assign_mission(&mut self, name: &str, mission: &str) -> Result<&AstroCat, RosterError> {
        let cat = self
            .cats
            .iter_mut()
            .find(|cat| cat.name == name)
            .ok_or_else(|| RosterError::UnknownCat(name.to_string()))?;
        cat.assign_mission(mission)?;
        Ok(cat)
    }

    pub fn get_cat(&self, name: &str) -> Result<&AstroCat, RosterError> {
        self.cats
            .iter()
            .find(|cat| cat.name == name)
            .ok_or_else(|| RosterError::UnknownCat(name.to_string()))
    }

    /// All cats in registration order.
    pub fn cats(&self) -> &[AstroCat] {
        &self.cats
    }

    pub fn summary_lines(&self) -> Vec<String> {
        if self.cats.is_empty() {
            return vec!["No cats registered.".to_string()];
        }
        self.cats.iter().map(AstroCat::summary).collect()
    }

    /// Load a roster from `path`. A missing file yields an empty roster.
    pub fn load(path: &Path) -> Result<Self, RosterError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                log::debug!("No roster at {}, starting empty", path.display());
                return Ok(Self::new());
            }
            Err(source) => {
                return Err(RosterError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let stored: Self = serde_json::from_str(&raw).map_err(|source| RosterError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_cats(stored.cats))
    }

    /// Build a roster from `cats`, collapsing repeated names.
    pub fn from_cats(cats: impl IntoIterator<Item = AstroCat>) -> Self {
        let mut roster = Self::new();
        for cat in cats {
            match roster.cats.iter_mut().find(|known| known.name == cat.name) {
                Some(known) => {
                    log::warn!("Roster lists '{}' more than once; keeping the last entry", cat.name);
                    *known = cat;
                }
                None => roster.cats.push(cat),
            }
        }
        roster
    }

    /// Write the whole roster to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), RosterError> {
        let io_err = |source: io::Error| RosterError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let raw = serde_json::to_string_pretty(self).map_err(|source| RosterError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, raw).map_err(io_err)
    }
}
