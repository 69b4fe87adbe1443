//! Size factor (SMB) sort.

use tailwatch_primitives::FactorKind;
use tailwatch_traits::{FactorSort, SortRule};

/// Size sort.
///
/// Splits firms at the median of their mean market capitalization; small
/// caps form the long leg (Small Minus Big).
#[derive(Debug, Clone, Copy, Default)]
pub struct SizeSort;

impl SizeSort {
    /// Create a new size sort.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl FactorSort for SizeSort {
    fn name(&self) -> &str {
        "size"
    }

    fn kind(&self) -> FactorKind {
        FactorKind::Smb
    }

    fn rule(&self) -> SortRule {
        SortRule::Median
    }
}

#[cfg(test)]
mod tests {
    use tailwatch_primitives::Categorizers;

    use super::*;

    #[test]
    fn size_sort_definition() {
        let sort = SizeSort::new();
        assert_eq!(sort.name(), "size");
        assert_eq!(sort.kind(), FactorKind::Smb);
        assert_eq!(sort.rule(), SortRule::Median);

        let cats = Categorizers { size: Some(1e9), ..Categorizers::default() };
        assert_eq!(sort.categorizer(&cats), Some(1e9));
    }
}
