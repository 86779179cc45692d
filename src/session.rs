//! Session state and recomputation triggers.
//!
//! A `Session` owns the loaded sales data, the three editable tables, the
//! selected month and the derived margin and monthly views. Derived values
//! are rebuilt from scratch, and only those downstream of what changed:
//!
//! - cost or price edit: margins, then the monthly summary
//! - fixed-cost edit or month change: the monthly summary only
//!
//! New values are computed into locals and swapped in together, so no
//! observer ever sees a table paired with a stale derived view. A rejected
//! edit changes nothing.

use crate::error::{EditError, ValidationIssue};
use crate::margins::{compute_margins, MarginReport};
use crate::months;
use crate::monthly::{summarize_month, MonthlyMarginSummary};
use crate::reshape::SalesData;
use crate::tables::{CostTable, FixedCostTable, PriceTable};
use chrono::Month;
use log::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    SetPrice { product: String, unit_price: f64 },
    RemovePrice { product: String },
    AddProduct { product: String },
    SetComponent { product: String, component: String, unit_cost: f64 },
    RenameComponent { product: String, from: String, to: String },
    RemoveComponent { product: String, component: String },
    RemoveProduct { product: String },
    SetFixedCost { cost_type: String, monthly_amount: f64 },
    RemoveFixedCost { cost_type: String },
}

/// Which derived views an operation rebuilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recomputed {
    /// Margins and the monthly summary.
    Margins,
    Monthly,
}

#[derive(Debug, Clone)]
pub struct Session {
    sales: SalesData,
    costs: CostTable,
    prices: PriceTable,
    fixed_costs: FixedCostTable,
    month: Month,
    margins: MarginReport,
    monthly: MonthlyMarginSummary,
}

impl Session {
    pub fn new(
        sales: SalesData,
        costs: CostTable,
        prices: PriceTable,
        fixed_costs: FixedCostTable,
        month: Month,
    ) -> Self {
        let margins = compute_margins(&costs, &prices);
        let monthly = summarize_month(&margins, sales.long(), month, &fixed_costs);
        Session {
            sales,
            costs,
            prices,
            fixed_costs,
            month,
            margins,
            monthly,
        }
    }

    pub fn apply(&mut self, edit: Edit) -> Result<Recomputed, EditError> {
        debug!("applying {:?}", edit);
        match edit {
            Edit::SetPrice {
                product,
                unit_price,
            } => self.edit_prices(|p| p.set_price(&product, unit_price)),
            Edit::RemovePrice { product } => {
                self.edit_prices(|p| p.remove_price(&product).map(|_| ()))
            }
            Edit::AddProduct { product } => self.edit_costs(|c| c.add_product(&product)),
            Edit::SetComponent {
                product,
                component,
                unit_cost,
            } => self.edit_costs(|c| c.set_component(&product, &component, unit_cost)),
            Edit::RenameComponent { product, from, to } => {
                self.edit_costs(|c| c.rename_component(&product, &from, &to))
            }
            Edit::RemoveComponent { product, component } => {
                self.edit_costs(|c| c.remove_component(&product, &component).map(|_| ()))
            }
            Edit::RemoveProduct { product } => {
                self.edit_costs(|c| c.remove_product(&product).map(|_| ()))
            }
            Edit::SetFixedCost {
                cost_type,
                monthly_amount,
            } => self.edit_fixed_costs(|f| f.set(&cost_type, monthly_amount)),
            Edit::RemoveFixedCost { cost_type } => {
                self.edit_fixed_costs(|f| f.remove(&cost_type).map(|_| ()))
            }
        }
    }

    pub fn select_month(&mut self, month: Month) -> Recomputed {
        let monthly = summarize_month(&self.margins, self.sales.long(), month, &self.fixed_costs);
        self.month = month;
        self.monthly = monthly;
        debug!("selected {}; rebuilt monthly summary", months::label(month));
        Recomputed::Monthly
    }

    fn edit_costs<F>(&mut self, edit: F) -> Result<Recomputed, EditError>
    where
        F: FnOnce(&mut CostTable) -> Result<(), EditError>,
    {
        let mut costs = self.costs.clone();
        edit(&mut costs)?;
        let margins = compute_margins(&costs, &self.prices);
        let monthly = summarize_month(&margins, self.sales.long(), self.month, &self.fixed_costs);
        self.costs = costs;
        self.margins = margins;
        self.monthly = monthly;
        debug!("cost table changed; rebuilt margins and monthly summary");
        Ok(Recomputed::Margins)
    }

    fn edit_prices<F>(&mut self, edit: F) -> Result<Recomputed, EditError>
    where
        F: FnOnce(&mut PriceTable) -> Result<(), EditError>,
    {
        let mut prices = self.prices.clone();
        edit(&mut prices)?;
        let margins = compute_margins(&self.costs, &prices);
        let monthly = summarize_month(&margins, self.sales.long(), self.month, &self.fixed_costs);
        self.prices = prices;
        self.margins = margins;
        self.monthly = monthly;
        debug!("price table changed; rebuilt margins and monthly summary");
        Ok(Recomputed::Margins)
    }

    fn edit_fixed_costs<F>(&mut self, edit: F) -> Result<Recomputed, EditError>
    where
        F: FnOnce(&mut FixedCostTable) -> Result<(), EditError>,
    {
        let mut fixed_costs = self.fixed_costs.clone();
        edit(&mut fixed_costs)?;
        let monthly = summarize_month(&self.margins, self.sales.long(), self.month, &fixed_costs);
        self.fixed_costs = fixed_costs;
        self.monthly = monthly;
        debug!("fixed costs changed; rebuilt monthly summary");
        Ok(Recomputed::Monthly)
    }

    pub fn sales(&self) -> &SalesData {
        &self.sales
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        self.sales.issues()
    }

    pub fn costs(&self) -> &CostTable {
        &self.costs
    }

    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }

    pub fn fixed_costs(&self) -> &FixedCostTable {
        &self.fixed_costs
    }

    pub fn month(&self) -> Month {
        self.month
    }

    pub fn margins(&self) -> &MarginReport {
        &self.margins
    }

    pub fn monthly(&self) -> &MonthlyMarginSummary {
        &self.monthly
    }
}
