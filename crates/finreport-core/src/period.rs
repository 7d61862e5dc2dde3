//! Which fiscal years (and periods) a statement is rendered for.

use crate::movement::Movement;
use serde::{Deserialize, Serialize};

/// Period selection for rendering.
///
/// Years are kept sorted ascending with duplicates removed, so the rendered
/// columns and the variance pair (lowest, highest) are deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodOptions {
    years: Vec<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_period: Option<u32>,
}

impl PeriodOptions {
    /// Create options for the given years.
    #[must_use]
    pub fn new(years: impl IntoIterator<Item = i32>) -> Self {
        let mut years: Vec<i32> = years.into_iter().collect();
        years.sort_unstable();
        years.dedup();
        Self {
            years,
            max_period: None,
        }
    }

    /// Restrict aggregation to movements with `period <= max_period`.
    #[must_use]
    pub const fn with_max_period(mut self, max_period: u32) -> Self {
        self.max_period = Some(max_period);
        self
    }

    /// Years to render, ascending.
    #[must_use]
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// The period cut-off, if any.
    #[must_use]
    pub const fn max_period(&self) -> Option<u32> {
        self.max_period
    }

    /// The `(earlier, later)` pair when exactly two years are configured.
    #[must_use]
    pub fn variance_pair(&self) -> Option<(i32, i32)> {
        match self.years.as_slice() {
            [earlier, later] => Some((*earlier, *later)),
            _ => None,
        }
    }

    /// Whether a movement falls inside the period cut-off.
    ///
    /// Movements without a period are always included.
    #[must_use]
    pub fn includes(&self, movement: &Movement) -> bool {
        match (self.max_period, movement.period) {
            (Some(max), Some(period)) => period <= max,
            _ => true,
        }
    }
}
