use std::path::Path;

use serde::{Deserialize, Serialize};
use sprintdeck_common::error::{SprintdeckError, SprintdeckResult};

/// One entry of the bundled `board-mappings.json` lookup table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardMapping {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub board_type: String,
    pub project_key: String,
}

/// Board lookup table, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct BoardMappings {
    boards: Vec<BoardMapping>,
}

impl BoardMappings {
    pub fn load(path: impl AsRef<Path>) -> SprintdeckResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SprintdeckError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let boards: Vec<BoardMapping> = serde_json::from_str(&raw).map_err(|e| {
            SprintdeckError::Config(format!("invalid board mappings in {}: {e}", path.display()))
        })?;
        Ok(Self { boards })
    }

    pub fn from_vec(boards: Vec<BoardMapping>) -> Self {
        Self { boards }
    }

    pub fn get(&self, id: u64) -> Option<&BoardMapping> {
        self.boards.iter().find(|b| b.id == id)
    }

    pub fn all(&self) -> &[BoardMapping] {
        &self.boards
    }
}
