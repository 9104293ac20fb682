use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::holding::{normalize_ticker, Holding};
use crate::models::metrics::{
    GroupedHolding, HoldingPerformance, PerformancePoint, PortfolioMetrics, RankedHolding,
};

/// Derives portfolio metrics, groupings and rankings from a snapshot.
///
/// Pure business logic: no state, no I/O, deterministic. Every function is
/// total over any slice of holdings, including the empty one, and degrades to
/// zero instead of dividing by a non-positive cost basis. Results are never
/// cached; callers recompute against the current snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsService;

impl MetricsService {
    pub fn new() -> Self {
        Self
    }

    /// Totals across the whole portfolio.
    pub fn compute_portfolio_metrics(&self, holdings: &[Holding]) -> PortfolioMetrics {
        let total_investment: f64 = holdings.iter().map(|h| h.quantity * h.buy_price).sum();
        let current_value: f64 = holdings.iter().map(|h| h.quantity * h.current_price).sum();
        let total_gain = current_value - total_investment;
        let percentage_gain = if total_investment > 0.0 {
            let pct = (total_gain / total_investment) * 100.0;
            if pct.is_finite() {
                pct
            } else {
                0.0
            }
        } else {
            0.0
        };

        PortfolioMetrics {
            total_investment,
            current_value,
            total_gain,
            percentage_gain,
        }
    }

    /// Collapse lots sharing a ticker, in first-seen order.
    ///
    /// The first lot of a ticker supplies name and prices for the group; later
    /// lots only add their quantity. Input order therefore decides which lot
    /// represents the group.
    pub fn group_by_ticker(&self, holdings: &[Holding]) -> Vec<GroupedHolding> {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut groups: Vec<GroupedHolding> = Vec::new();

        for holding in holdings {
            let key = normalize_ticker(&holding.ticker);
            match index.get(&key) {
                Some(&pos) => {
                    let group = &mut groups[pos];
                    group.total_quantity += holding.quantity;
                    group.lot_count += 1;
                }
                None => {
                    index.insert(key.clone(), groups.len());
                    groups.push(GroupedHolding {
                        ticker: key,
                        name: holding.name.clone(),
                        representative_id: holding.id.clone(),
                        buy_price: holding.buy_price,
                        current_price: holding.current_price,
                        total_quantity: holding.quantity,
                        lot_count: 1,
                    });
                }
            }
        }

        groups
    }

    /// Find the group for `ticker` (case-insensitive).
    pub fn find_group<'a>(
        &self,
        groups: &'a [GroupedHolding],
        ticker: &str,
    ) -> Option<&'a GroupedHolding> {
        let key = normalize_ticker(ticker);
        groups.iter().find(|g| g.ticker == key)
    }

    /// Return percentage of one holding, 0 when the buy price is not positive.
    pub fn return_percentage(&self, holding: &Holding) -> f64 {
        if holding.buy_price > 0.0 {
            let pct = ((holding.current_price - holding.buy_price) / holding.buy_price) * 100.0;
            if pct.is_finite() {
                pct
            } else {
                0.0
            }
        } else {
            0.0
        }
    }

    /// All holdings, highest return first. Ties keep their input order.
    pub fn rank_by_return(&self, holdings: &[Holding]) -> Vec<RankedHolding> {
        let mut ranked = self.with_returns(holdings);
        ranked.sort_by(|a, b| descending(a.return_percentage, b.return_percentage));
        ranked
    }

    /// The `limit` best holdings by signed return.
    pub fn top_performers(&self, holdings: &[Holding], limit: usize) -> Vec<RankedHolding> {
        let mut ranked = self.rank_by_return(holdings);
        ranked.truncate(limit);
        ranked
    }

    /// The `limit` holdings that moved the most, up or down.
    ///
    /// Sorted by the magnitude of the return, not its sign. Ties keep their
    /// input order.
    pub fn recent_activity(&self, holdings: &[Holding], limit: usize) -> Vec<RankedHolding> {
        let mut ranked = self.with_returns(holdings);
        ranked.sort_by(|a, b| descending(a.return_percentage.abs(), b.return_percentage.abs()));
        ranked.truncate(limit);
        ranked
    }

    /// The group with the largest unrealized profit, `None` when empty.
    /// On ties the first maximizer wins.
    pub fn find_best_performer<'a>(
        &self,
        groups: &'a [GroupedHolding],
    ) -> Option<&'a GroupedHolding> {
        let mut best: Option<&GroupedHolding> = None;
        for group in groups {
            let replace = match best {
                None => true,
                Some(current) => group.profit() > current.profit(),
            };
            if replace {
                best = Some(group);
            }
        }
        best
    }

    /// Gain/loss breakdown for a single holding.
    pub fn holding_performance(&self, holding: &Holding) -> HoldingPerformance {
        let investment_value = holding.buy_price * holding.quantity;
        let current_value = holding.current_price * holding.quantity;
        let gain_loss = (holding.current_price - holding.buy_price) * holding.quantity;

        HoldingPerformance {
            investment_value,
            current_value,
            gain_loss,
            gain_loss_percentage: self.return_percentage(holding),
            is_positive: gain_loss >= 0.0,
        }
    }

    /// Investment vs. current value per holding, in input order.
    pub fn performance_series(&self, holdings: &[Holding]) -> Vec<PerformancePoint> {
        holdings
            .iter()
            .map(|h| PerformancePoint {
                ticker: h.ticker.clone(),
                investment_value: h.buy_price * h.quantity,
                current_value: h.current_price * h.quantity,
            })
            .collect()
    }

    /// Most recent backend modification across the snapshot.
    pub fn latest_update(&self, holdings: &[Holding]) -> Option<DateTime<Utc>> {
        holdings.iter().filter_map(|h| h.last_updated).max()
    }

    fn with_returns(&self, holdings: &[Holding]) -> Vec<RankedHolding> {
        holdings
            .iter()
            .map(|h| RankedHolding {
                holding: h.clone(),
                return_percentage: self.return_percentage(h),
            })
            .collect()
    }
}

// Return percentages are always finite, so partial_cmp never falls through.
fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}
