use crate::error::JoinMismatch;
use crate::tables::{CostTable, PriceTable};
use crate::types::MarginRecord;
use crate::util::inner_join;
use log::warn;

/// Margins of every product present in both the cost and the price table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarginReport {
    /// Ordered by product name.
    pub records: Vec<MarginRecord>,
    /// `left_only`: costed products with no price.
    /// `right_only`: priced products with no cost entry.
    pub unmatched: JoinMismatch,
}

impl MarginReport {
    pub fn get(&self, product: &str) -> Option<&MarginRecord> {
        self.records.iter().find(|r| r.product == product)
    }

    /// Products whose margin percentage is the N/A sentinel.
    pub fn undefined_pct(&self) -> Vec<String> {
        self.records
            .iter()
            .filter(|r| r.gross_margin_pct.is_none())
            .map(|r| r.product.clone())
            .collect()
    }
}

/// `gross_margin / unit_price`, or `None` for a zero price.
pub fn gross_margin_pct(gross_margin: f64, unit_price: f64) -> Option<f64> {
    if unit_price == 0.0 {
        None
    } else {
        Some(gross_margin / unit_price)
    }
}

pub fn compute_margins(costs: &CostTable, prices: &PriceTable) -> MarginReport {
    let (matched, unmatched) = inner_join(costs.products(), prices.products());
    if !unmatched.left_only.is_empty() {
        warn!(
            "no price for {}; excluded from margins",
            unmatched.left_only.join(", ")
        );
    }
    if !unmatched.right_only.is_empty() {
        warn!(
            "no cost entry for {}; excluded from margins",
            unmatched.right_only.join(", ")
        );
    }

    let mut records = Vec::with_capacity(matched.len());
    for product in matched {
        let (Some(total_cost), Some(unit_price)) =
            (costs.total_cost(product), prices.price(product))
        else {
            continue;
        };
        let gross_margin = unit_price - total_cost;
        let pct = gross_margin_pct(gross_margin, unit_price);
        if pct.is_none() {
            warn!("{}: unit price is 0, margin % reported as N/A", product);
        }
        records.push(MarginRecord {
            product: product.to_string(),
            unit_price,
            total_cost,
            gross_margin,
            gross_margin_pct: pct,
        });
    }
    MarginReport { records, unmatched }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables(costs: Vec<(&str, Vec<(&str, f64)>)>, prices: &[(&str, f64)]) -> (CostTable, PriceTable) {
        let mut cost_table = CostTable::default();
        for (product, components) in costs {
            cost_table.add_product(product).unwrap();
            for (name, cost) in components {
                cost_table.set_component(product, name, cost).unwrap();
            }
        }
        let mut price_table = PriceTable::default();
        for (product, price) in prices {
            price_table.set_price(product, *price).unwrap();
        }
        (cost_table, price_table)
    }

    #[test]
    fn widget_margin() {
        let (costs, prices) = tables(vec![("Widget", vec![("parts", 6.0), ("box", 4.0)])], &[("Widget", 15.0)]);
        let report = compute_margins(&costs, &prices);
        let widget = report.get("Widget").unwrap();
        assert_eq!(widget.total_cost, 10.0);
        assert_eq!(widget.gross_margin, 5.0);
        assert!((widget.gross_margin_pct.unwrap() - 1.0 / 3.0).abs() < 1e-12);
        assert!(report.unmatched.is_empty());
    }

    #[test]
    fn zero_price_yields_sentinel_not_panic() {
        let (costs, prices) = tables(vec![("Widget", vec![("parts", 5.0)])], &[("Widget", 0.0)]);
        let report = compute_margins(&costs, &prices);
        let widget = report.get("Widget").unwrap();
        assert_eq!(widget.gross_margin, -5.0);
        assert_eq!(widget.gross_margin_pct, None);
        assert_eq!(report.undefined_pct(), vec!["Widget".to_string()]);
    }

    #[test]
    fn pct_times_price_gives_margin() {
        let (costs, prices) = tables(
            vec![
                ("Serum", vec![("flacon", 1.975), ("coût produit", 8.33)]),
                ("Hair Spray", vec![("flacon", 0.714), ("coût produit", 11.6025)]),
                ("Free Sample", vec![("pot", 1.2)]),
            ],
            &[("Serum", 30.0), ("Hair Spray", 30.0), ("Free Sample", 0.0)],
        );
        for r in compute_margins(&costs, &prices).records {
            match r.gross_margin_pct {
                Some(pct) => assert!((pct * r.unit_price - r.gross_margin).abs() < 1e-9),
                None => assert_eq!(r.unit_price, 0.0),
            }
        }
    }

    #[test]
    fn unmatched_products_are_reported() {
        let (costs, prices) = tables(
            vec![("Widget", vec![("parts", 1.0)]), ("Gadget", vec![])],
            &[("Widget", 3.0), ("Doohickey", 9.0)],
        );
        let report = compute_margins(&costs, &prices);
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.unmatched.left_only, vec!["Gadget".to_string()]);
        assert_eq!(report.unmatched.right_only, vec!["Doohickey".to_string()]);
    }

    #[test]
    fn product_without_components_costs_nothing() {
        let (costs, prices) = tables(vec![("Gadget", vec![])], &[("Gadget", 12.0)]);
        let report = compute_margins(&costs, &prices);
        assert_eq!(report.get("Gadget").unwrap().gross_margin, 12.0);
        assert_eq!(report.get("Gadget").unwrap().gross_margin_pct, Some(1.0));
    }

    #[test]
    fn recomputing_unchanged_tables_is_idempotent() {
        let (costs, prices) = tables(
            vec![("Widget", vec![("parts", 6.0)]), ("Gadget", vec![("box", 2.0)])],
            &[("Widget", 15.0), ("Gadget", 4.0)],
        );
        assert_eq!(compute_margins(&costs, &prices), compute_margins(&costs, &prices));
    }
}
