/*!
 * Translation directions served by the API.
 */

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// A language pair served by one pipeline instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// Northern Betsimisaraka Malagasy to official Malagasy
    #[default]
    BmmToMg,
    /// Official Malagasy to Northern Betsimisaraka Malagasy
    MgToBmm,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::BmmToMg, Direction::MgToBmm];

    /// Identifier used in config files, routes and the CLI
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BmmToMg => "bmm-to-mg",
            Self::MgToBmm => "mg-to-bmm",
        }
    }

    /// Direction-specific HTTP route
    pub fn route(&self) -> &'static str {
        match self {
            Self::BmmToMg => "/translate-bmm-to-mg",
            Self::MgToBmm => "/translate-mg-to-bmm",
        }
    }

    /// Prompt prefix the model was fine-tuned with
    pub fn default_task_prefix(&self) -> &'static str {
        match self {
            Self::BmmToMg => "translate Betsimisaraka to official Malagasy: ",
            Self::MgToBmm => "translate official Malagasy to Betsimisaraka: ",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::BmmToMg => "Betsimisaraka -> official Malagasy",
            Self::MgToBmm => "official Malagasy -> Betsimisaraka",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Direction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "bmm-to-mg" | "bmm_to_mg" => Ok(Self::BmmToMg),
            "mg-to-bmm" | "mg_to_bmm" => Ok(Self::MgToBmm),
            _ => Err(anyhow!("Invalid translation direction: {}", s)),
        }
    }
}
