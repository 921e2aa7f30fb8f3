use model::CornerTable;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CornerTableError {
    #[error("corner threshold {index} is not above the one before it")]
    Unordered { index: usize },
    #[error("corner threshold {index} is not a finite distance")]
    NonFinite { index: usize },
}

/// Maps distance from the start line to a track-section label.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CornerLookup {
    table: CornerTable,
}

impl CornerLookup {
    pub fn new(table: CornerTable) -> Result<Self, CornerTableError> {
        for (index, c) in table.corners.iter().enumerate() {
            if !c.below_m.is_finite() {
                return Err(CornerTableError::NonFinite { index });
            }
            if index > 0 && c.below_m <= table.corners[index - 1].below_m {
                return Err(CornerTableError::Unordered { index });
            }
        }
        Ok(Self { table })
    }

    /// Index of the first threshold strictly above `distance_m`; the
    /// catch-all label has index `corners.len()`.
    pub fn index_for(&self, distance_m: f64) -> usize {
        self.table.corners.partition_point(|c| c.below_m <= distance_m)
    }

    pub fn label_for(&self, distance_m: f64) -> &str {
        self.table
            .corners
            .get(self.index_for(distance_m))
            .map(|c| c.label.as_str())
            .unwrap_or(self.table.fallback.as_str())
    }

    pub fn table(&self) -> &CornerTable {
        &self.table
    }
}
