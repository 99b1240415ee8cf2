//! Saving and restoring the action-value table as a flat JSON array

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::TableError;

use super::policy::{QTable, StrategySelector};

/// What to do when the table file does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPolicy {
    /// A missing file is an error.
    Require,
    /// A missing file means "no prior table"; start from zeros.
    ColdStartIfMissing,
}

impl LoadPolicy {
    pub fn from_required(required: bool) -> Self {
        if required {
            LoadPolicy::Require
        } else {
            LoadPolicy::ColdStartIfMissing
        }
    }
}

pub fn save_table(table: &QTable, path: &Path) -> Result<(), TableError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, &table.to_flat())?;
    writer.flush()?;
    Ok(())
}

/// `Ok(None)` only for a missing file under [`LoadPolicy::ColdStartIfMissing`].
pub fn load_table(path: &Path, policy: LoadPolicy) -> Result<Option<QTable>, TableError> {
    if !path.exists() {
        return match policy {
            LoadPolicy::Require => Err(TableError::NotFound(path.to_path_buf())),
            LoadPolicy::ColdStartIfMissing => Ok(None),
        };
    }
    let reader = BufReader::new(File::open(path)?);
    let flat: Vec<f64> = serde_json::from_reader(reader)?;
    QTable::from_flat(&flat).map(Some)
}

impl StrategySelector {
    pub fn persist(&self, path: &Path) -> Result<(), TableError> {
        save_table(self.table(), path)?;
        info!("Q-table saved to {}", path.display());
        Ok(())
    }

    /// Returns whether a table was restored (`false` = cold start).
    pub fn restore(&mut self, path: &Path, policy: LoadPolicy) -> Result<bool, TableError> {
        match load_table(path, policy)? {
            Some(table) => {
                self.set_table(table);
                info!("Q-table loaded from {}", path.display());
                Ok(true)
            }
            None => {
                info!("No Q-table at {}, starting cold", path.display());
                Ok(false)
            }
        }
    }
}
