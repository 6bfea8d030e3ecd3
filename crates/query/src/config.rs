//! Aggregation settings.

/// How the aggregate operator buckets rows into groups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum GroupKeyMode {
    /// Key on the snapshotted group-by entries themselves.
    #[default]
    Structured,
    /// Key on the comma-joined display form of the group-by entries. Values that
    /// print identically (for example the string `"1,2"` and the pair `1`, `2`)
    /// land in the same group.
    Text,
}

/// Settings for the aggregate operator and its accumulators.
#[derive(Clone, Debug)]
pub struct AggregateConfig {
    group_key_mode: GroupKeyMode,
    emit_empty_global_group: bool,
    percentile_initial_capacity: usize,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            group_key_mode: GroupKeyMode::Structured,
            emit_empty_global_group: true,
            percentile_initial_capacity: 1024,
        }
    }
}

impl AggregateConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the group key mode.
    pub fn with_group_key_mode(mut self, mode: GroupKeyMode) -> Self {
        self.group_key_mode = mode;
        self
    }

    /// Controls whether an ungrouped aggregation over no rows still emits one row.
    pub fn with_empty_global_group(mut self, emit: bool) -> Self {
        self.emit_empty_global_group = emit;
        self
    }

    /// Sets the initial buffer size of percentile accumulators.
    pub fn with_percentile_capacity(mut self, capacity: usize) -> Self {
        self.percentile_initial_capacity = capacity;
        self
    }

    #[inline]
    pub fn group_key_mode(&self) -> GroupKeyMode {
        self.group_key_mode
    }

    #[inline]
    pub fn emit_empty_global_group(&self) -> bool {
        self.emit_empty_global_group
    }

    #[inline]
    pub fn percentile_initial_capacity(&self) -> usize {
        self.percentile_initial_capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AggregateConfig::default();
        assert_eq!(config.group_key_mode(), GroupKeyMode::Structured);
        assert!(config.emit_empty_global_group());
        assert_eq!(config.percentile_initial_capacity(), 1024);
    }

    #[test]
    fn test_builder() {
        let config = AggregateConfig::new()
            .with_group_key_mode(GroupKeyMode::Text)
            .with_empty_global_group(false)
            .with_percentile_capacity(16);
        assert_eq!(config.group_key_mode(), GroupKeyMode::Text);
        assert!(!config.emit_empty_global_group());
        assert_eq!(config.percentile_initial_capacity(), 16);
    }
}
