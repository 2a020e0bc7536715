use std::fmt;
use std::str::FromStr;

use crate::partitioning::domain::partitioner::Partitioner;

use super::grid_partitioner::GridPartitioner;
use super::row_strip_partitioner::RowStripPartitioner;

/// How the image is divided among workers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PartitionStrategy {
    #[default]
    RowStrips,
    Grid,
}

impl FromStr for PartitionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rows" | "strips" => Ok(PartitionStrategy::RowStrips),
            "grid" | "tiles" => Ok(PartitionStrategy::Grid),
            other => Err(format!("Partition must be 'rows' or 'grid', got '{other}'")),
        }
    }
}

impl fmt::Display for PartitionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionStrategy::RowStrips => write!(f, "rows"),
            PartitionStrategy::Grid => write!(f, "grid"),
        }
    }
}

pub fn create_partitioner(strategy: PartitionStrategy) -> Box<dyn Partitioner> {
    log::debug!("Using {strategy} partitioner");
    match strategy {
        PartitionStrategy::RowStrips => Box::new(RowStripPartitioner::new()),
        PartitionStrategy::Grid => Box::new(GridPartitioner::new()),
    }
}
