use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    Import,
    Export,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::Import => "import",
            JobType::Export => "export",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "import" => Ok(JobType::Import),
            "export" => Ok(JobType::Export),
            other => Err(anyhow::anyhow!("unknown job type: {}", other)),
        }
    }
}
