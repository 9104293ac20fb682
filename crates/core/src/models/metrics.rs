use serde::{Deserialize, Serialize};

use super::holding::Holding;

/// Portfolio-level totals derived from a snapshot of holdings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    /// Sum of quantity × buy price
    pub total_investment: f64,

    /// Sum of quantity × current price
    pub current_value: f64,

    /// current_value − total_investment
    pub total_gain: f64,

    /// total_gain / total_investment × 100, or 0 when nothing was invested
    pub percentage_gain: f64,
}

impl PortfolioMetrics {
    /// `true` when the portfolio is flat or up.
    #[must_use]
    pub fn is_gain(&self) -> bool {
        self.total_gain >= 0.0
    }
}

/// All lots of one ticker collapsed into a single aggregate.
///
/// The display fields (`name`, `buy_price`, `current_price`) come from the
/// first lot seen for the ticker. Later lots only add to `total_quantity`, so
/// for lots bought at different prices the group's cost basis is the first
/// lot's, not a weighted average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedHolding {
    pub ticker: String,

    pub name: String,

    /// Id of the first-seen lot
    pub representative_id: String,

    pub buy_price: f64,

    pub current_price: f64,

    /// Sum of quantity over every lot of this ticker
    pub total_quantity: f64,

    /// Number of lots folded into this group
    pub lot_count: usize,
}

impl GroupedHolding {
    /// Unrealized profit of the group: (current − buy) × total quantity.
    #[must_use]
    pub fn profit(&self) -> f64 {
        (self.current_price - self.buy_price) * self.total_quantity
    }
}

/// A holding paired with its return percentage, as produced by the rankings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedHolding {
    pub holding: Holding,

    /// (current − buy) / buy × 100, or 0 when buy price is not positive
    pub return_percentage: f64,
}

impl RankedHolding {
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.return_percentage >= 0.0
    }
}

/// Per-holding gain/loss breakdown shown on a holding card.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoldingPerformance {
    pub investment_value: f64,
    pub current_value: f64,
    pub gain_loss: f64,
    pub gain_loss_percentage: f64,
    pub is_positive: bool,
}

/// One bar pair of the investment-vs-current-value chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformancePoint {
    pub ticker: String,
    pub investment_value: f64,
    pub current_value: f64,
}
