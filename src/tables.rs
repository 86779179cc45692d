//! User-editable cost, price and fixed-cost tables.
//!
//! Only base values are stored. A product's total cost is summed from its
//! components every time it is read, so it can never go stale.

use crate::error::EditError;
use crate::types::{CostComponent, FixedCost};
use std::collections::BTreeMap;

fn clean_name(kind: &'static str, name: &str) -> Result<String, EditError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EditError::EmptyName(kind));
    }
    Ok(name.to_string())
}

fn check_amount(field: &'static str, value: f64) -> Result<f64, EditError> {
    if !value.is_finite() {
        return Err(EditError::NotFinite { field });
    }
    if value < 0.0 {
        return Err(EditError::NegativeAmount { field, value });
    }
    Ok(value)
}

/// Per-product cost components. Products may carry different component
/// sets, including none at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostTable {
    products: BTreeMap<String, Vec<CostComponent>>,
}

impl CostTable {
    pub fn from_seed(seed: &BTreeMap<String, BTreeMap<String, f64>>) -> Result<Self, EditError> {
        let mut table = CostTable::default();
        for (product, components) in seed {
            table.add_product(product)?;
            for (component, unit_cost) in components {
                table.set_component(product, component, *unit_cost)?;
            }
        }
        Ok(table)
    }

    pub fn add_product(&mut self, product: &str) -> Result<(), EditError> {
        let product = clean_name("Product", product)?;
        if self.products.contains_key(&product) {
            return Err(EditError::DuplicateProduct(product));
        }
        self.products.insert(product, Vec::new());
        Ok(())
    }

    /// Insert or overwrite one component; the product is created if needed.
    pub fn set_component(
        &mut self,
        product: &str,
        component: &str,
        unit_cost: f64,
    ) -> Result<(), EditError> {
        let product = clean_name("Product", product)?;
        let component = clean_name("Component", component)?;
        let unit_cost = check_amount("Unit cost", unit_cost)?;
        let components = self.products.entry(product).or_default();
        match components.iter_mut().find(|c| c.name == component) {
            Some(existing) => existing.unit_cost = unit_cost,
            None => components.push(CostComponent {
                name: component,
                unit_cost,
            }),
        }
        Ok(())
    }

    pub fn rename_component(
        &mut self,
        product: &str,
        from: &str,
        to: &str,
    ) -> Result<(), EditError> {
        let to = clean_name("Component", to)?;
        let from = from.trim();
        let components = self.components_mut(product)?;
        let Some(index) = components.iter().position(|c| c.name == from) else {
            return Err(EditError::UnknownComponent {
                product: product.trim().to_string(),
                component: from.to_string(),
            });
        };
        if from != to && components.iter().any(|c| c.name == to) {
            return Err(EditError::DuplicateComponent {
                product: product.trim().to_string(),
                component: to,
            });
        }
        components[index].name = to;
        Ok(())
    }

    pub fn remove_component(
        &mut self,
        product: &str,
        component: &str,
    ) -> Result<CostComponent, EditError> {
        let components = self.components_mut(product)?;
        let component = component.trim();
        let pos = components
            .iter()
            .position(|c| c.name == component)
            .ok_or_else(|| EditError::UnknownComponent {
                product: product.trim().to_string(),
                component: component.to_string(),
            })?;
        Ok(components.remove(pos))
    }

    pub fn remove_product(&mut self, product: &str) -> Result<Vec<CostComponent>, EditError> {
        let product = product.trim();
        self.products
            .remove(product)
            .ok_or_else(|| EditError::UnknownProduct(product.to_string()))
    }

    fn components_mut(&mut self, product: &str) -> Result<&mut Vec<CostComponent>, EditError> {
        let product = product.trim();
        self.products
            .get_mut(product)
            .ok_or_else(|| EditError::UnknownProduct(product.to_string()))
    }

    pub fn components(&self, product: &str) -> Option<&[CostComponent]> {
        self.products.get(product).map(Vec::as_slice)
    }

    /// Sum of the product's component costs; zero for a product with none.
    pub fn total_cost(&self, product: &str) -> Option<f64> {
        self.components(product)
            .map(|components| components.iter().map(|c| c.unit_cost).sum())
    }

    pub fn products(&self) -> impl Iterator<Item = &str> {
        self.products.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    prices: BTreeMap<String, f64>,
}

impl PriceTable {
    pub fn from_seed(seed: &BTreeMap<String, f64>) -> Result<Self, EditError> {
        let mut table = PriceTable::default();
        for (product, price) in seed {
            table.set_price(product, *price)?;
        }
        Ok(table)
    }

    pub fn set_price(&mut self, product: &str, unit_price: f64) -> Result<(), EditError> {
        let product = clean_name("Product", product)?;
        let unit_price = check_amount("Unit price", unit_price)?;
        self.prices.insert(product, unit_price);
        Ok(())
    }

    pub fn remove_price(&mut self, product: &str) -> Result<f64, EditError> {
        let product = product.trim();
        self.prices
            .remove(product)
            .ok_or_else(|| EditError::UnknownProduct(product.to_string()))
    }

    pub fn price(&self, product: &str) -> Option<f64> {
        self.prices.get(product).copied()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, f64)> {
        self.prices.iter().map(|(p, v)| (p.as_str(), *v))
    }

    pub fn products(&self) -> impl Iterator<Item = &str> {
        self.prices.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

/// Monthly fixed costs keyed by cost type, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixedCostTable {
    rows: Vec<FixedCost>,
}

impl FixedCostTable {
    pub fn from_seed(seed: &[FixedCost]) -> Result<Self, EditError> {
        let mut table = FixedCostTable::default();
        for row in seed {
            table.set(&row.cost_type, row.monthly_amount)?;
        }
        Ok(table)
    }

    /// Insert or overwrite the amount for `cost_type`.
    pub fn set(&mut self, cost_type: &str, monthly_amount: f64) -> Result<(), EditError> {
        let cost_type = clean_name("Cost type", cost_type)?;
        let monthly_amount = check_amount("Monthly cost", monthly_amount)?;
        match self.rows.iter_mut().find(|r| r.cost_type == cost_type) {
            Some(existing) => existing.monthly_amount = monthly_amount,
            None => self.rows.push(FixedCost {
                cost_type,
                monthly_amount,
            }),
        }
        Ok(())
    }

    pub fn remove(&mut self, cost_type: &str) -> Result<FixedCost, EditError> {
        let cost_type = cost_type.trim();
        let pos = self
            .rows
            .iter()
            .position(|r| r.cost_type == cost_type)
            .ok_or_else(|| EditError::UnknownCostType(cost_type.to_string()))?;
        Ok(self.rows.remove(pos))
    }

    pub fn total(&self) -> f64 {
        self.rows.iter().map(|r| r.monthly_amount).sum()
    }

    pub fn rows(&self) -> &[FixedCost] {
        &self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_total_matches(table: &CostTable, product: &str) {
        let expected: f64 = table
            .components(product)
            .unwrap()
            .iter()
            .map(|c| c.unit_cost)
            .sum();
        assert_eq!(table.total_cost(product), Some(expected));
    }

    #[test]
    fn total_cost_tracks_every_component_edit() {
        let mut costs = CostTable::default();
        costs.add_product("Serum").unwrap();
        assert_eq!(costs.total_cost("Serum"), Some(0.0));

        costs.set_component("Serum", "Bouteille (flacon)", 1.975).unwrap();
        costs.set_component("Serum", "coût produit", 8.33).unwrap();
        assert_total_matches(&costs, "Serum");

        costs.set_component("Serum", "coût produit", 9.0).unwrap();
        assert_eq!(costs.components("Serum").unwrap().len(), 2);
        assert_total_matches(&costs, "Serum");

        costs.rename_component("Serum", "Bouteille (flacon)", "Flacon").unwrap();
        assert_total_matches(&costs, "Serum");

        let removed = costs.remove_component("Serum", "Flacon").unwrap();
        assert_eq!(removed.unit_cost, 1.975);
        assert_eq!(costs.total_cost("Serum"), Some(9.0));

        costs.remove_component("Serum", "coût produit").unwrap();
        assert_eq!(costs.total_cost("Serum"), Some(0.0));
    }

    #[test]
    fn set_component_creates_missing_products() {
        let mut costs = CostTable::default();
        costs.set_component(" Hair Spray ", "pot", 1.5).unwrap();
        assert_eq!(costs.products().collect::<Vec<_>>(), vec!["Hair Spray"]);
        assert_eq!(costs.total_cost("Unknown"), None);
    }

    #[test]
    fn cost_edits_are_validated() {
        let mut costs = CostTable::default();
        assert_eq!(
            costs.set_component("Serum", "pot", -1.0),
            Err(EditError::NegativeAmount {
                field: "Unit cost",
                value: -1.0
            })
        );
        assert_eq!(
            costs.set_component("Serum", "pot", f64::NAN),
            Err(EditError::NotFinite { field: "Unit cost" })
        );
        assert_eq!(
            costs.set_component("  ", "pot", 1.0),
            Err(EditError::EmptyName("Product"))
        );
        assert!(costs.is_empty());

        costs.add_product("Serum").unwrap();
        assert_eq!(
            costs.add_product("Serum"),
            Err(EditError::DuplicateProduct("Serum".to_string()))
        );
        assert!(matches!(
            costs.remove_component("Serum", "pot"),
            Err(EditError::UnknownComponent { .. })
        ));
        assert!(matches!(
            costs.remove_product("Gel"),
            Err(EditError::UnknownProduct(_))
        ));
    }

    #[test]
    fn rename_refuses_to_merge_components() {
        let mut costs = CostTable::default();
        costs.set_component("Serum", "a", 1.0).unwrap();
        costs.set_component("Serum", "b", 2.0).unwrap();
        assert!(matches!(
            costs.rename_component("Serum", "a", "b"),
            Err(EditError::DuplicateComponent { .. })
        ));
        assert_eq!(costs.total_cost("Serum"), Some(3.0));
    }

    #[test]
    fn rename_to_same_name_keeps_component() {
        let mut costs = CostTable::default();
        costs.set_component("Serum", "a", 1.0).unwrap();
        assert_eq!(costs.rename_component("Serum", "a", " a "), Ok(()));
        assert_eq!(costs.components("Serum").unwrap()[0].name, "a");
        assert!(matches!(
            costs.rename_component("Serum", "z", "z"),
            Err(EditError::UnknownComponent { .. })
        ));
    }

    #[test]
    fn price_table_crud() {
        let mut prices = PriceTable::default();
        prices.set_price("Serum", 30.0).unwrap();
        prices.set_price("Serum", 32.0).unwrap();
        prices.set_price("Hair Spray", 0.0).unwrap();
        assert_eq!(prices.len(), 2);
        assert_eq!(prices.price("Serum"), Some(32.0));
        assert_eq!(prices.remove_price("Serum"), Ok(32.0));
        assert_eq!(prices.price("Serum"), None);
        assert!(prices.set_price("Serum", -5.0).is_err());
        assert!(prices.remove_price("Serum").is_err());
    }

    #[test]
    fn fixed_cost_total_follows_edits() {
        let mut fixed = FixedCostTable::default();
        fixed.set("Internet", 100.0).unwrap();
        fixed.set("loyer bureau", 500.0).unwrap();
        assert_eq!(fixed.total(), 600.0);

        fixed.set("Internet", 80.0).unwrap();
        assert_eq!(fixed.rows().len(), 2);
        assert_eq!(fixed.total(), 580.0);

        fixed.remove("loyer bureau").unwrap();
        assert_eq!(fixed.total(), 80.0);
        assert!(matches!(
            fixed.remove("loyer bureau"),
            Err(EditError::UnknownCostType(_))
        ));
        fixed.remove("Internet").unwrap();
        assert_eq!(fixed.total(), 0.0);
    }
}
