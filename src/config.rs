//! Command-line arguments and seed data for the editable tables.
use crate::error::SeedError;
use crate::months;
use crate::tables::{CostTable, FixedCostTable, PriceTable};
use crate::types::FixedCost;
use chrono::Month;
use clap::Parser;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Monthly sales heatmap, top sellers and margin vs fixed-cost coverage.
#[derive(Debug, Parser)]
#[command(name = "margin-dashboard", version, about, long_about = None)]
pub struct Args {
    /// Sales workbook (xlsx, xls, ods) or CSV export
    #[arg(short, long, default_value = "Ventes Produits 2024.xlsx")]
    pub file: PathBuf,

    /// Worksheet holding the product × month table
    #[arg(short, long, default_value = "Total Ventes KAMAANA")]
    pub sheet: String,

    /// 0-based index of the header row
    #[arg(long, default_value_t = 2)]
    pub header_row: usize,

    /// Initially selected month (e.g. "Janvier", "mars", "March", "3")
    #[arg(short, long, value_parser = parse_month_arg, default_value = "Janvier")]
    pub month: Month,

    /// JSON file overriding the built-in prices, costs and fixed costs
    #[arg(long)]
    pub seed: Option<PathBuf>,

    /// Directory for CSV and JSON exports
    #[arg(long, default_value = ".")]
    pub export_dir: PathBuf,

    /// Print every view for the selected month, export, and exit
    #[arg(long)]
    pub report: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

fn parse_month_arg(s: &str) -> Result<Month, String> {
    months::parse_label(s).ok_or_else(|| format!("'{s}' is not a month"))
}

/// Starting contents of the price, cost and fixed-cost tables.
///
/// Sections missing from a seed file fall back to the built-in values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedData {
    pub prices: BTreeMap<String, f64>,
    pub costs: BTreeMap<String, BTreeMap<String, f64>>,
    pub fixed_costs: Vec<FixedCost>,
}

impl Default for SeedData {
    fn default() -> Self {
        DEFAULT_SEED.clone()
    }
}

impl SeedData {
    pub fn build_tables(&self) -> Result<(CostTable, PriceTable, FixedCostTable), SeedError> {
        Ok((
            CostTable::from_seed(&self.costs)?,
            PriceTable::from_seed(&self.prices)?,
            FixedCostTable::from_seed(&self.fixed_costs)?,
        ))
    }
}

pub fn load_seed(path: &Path) -> Result<SeedData, SeedError> {
    let content = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let seed: SeedData = serde_json::from_str(&content)?;
    // Catch bad values now rather than at the first edit.
    seed.build_tables()?;
    Ok(seed)
}

fn components(items: &[(&str, f64)]) -> BTreeMap<String, f64> {
    items.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

pub static DEFAULT_SEED: Lazy<SeedData> = Lazy::new(|| {
    let prices = [
        ("Curl Booster 150mL", 38.0),
        ("Gelée Mauve 200mL", 35.0),
        ("Gelée Mauve 100mL", 20.0),
        ("Gelée Jaune 200mL", 35.0),
        ("Gelée Jaune 100mL", 25.0),
        ("Selfcare Butter (Grenade)", 40.0),
        ("Hair Spray", 30.0),
        ("Mini Curly Care Box", 60.0),
        ("Serum", 30.0),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), *v))
    .collect();

    let gel_100 = components(&[
        ("Bouteille (flacon)", 0.417),
        ("Pompe dispenser (egouteuse)", 0.522),
        ("Etiquette collante", 0.5),
        ("Emballage", 2.0),
        ("sac expédition", 0.4),
        ("carte", 0.75),
        ("coût produit", 7.259),
    ]);
    let gel_200 = components(&[
        ("Bouteille (flacon)", 0.69),
        ("Pompe dispenser (egouteuse)", 0.522),
        ("Etiquette collante", 0.816),
        ("Emballage", 2.1),
        ("sac expédition", 0.4),
        ("carte", 0.75),
        ("coût produit", 14.518),
    ]);
    let mut costs = BTreeMap::new();
    costs.insert("Gelée Mauve 100mL".to_string(), gel_100.clone());
    costs.insert("Gelée Mauve 200mL".to_string(), gel_200.clone());
    costs.insert("Gelée Jaune 100mL".to_string(), gel_100);
    costs.insert("Gelée Jaune 200mL".to_string(), gel_200);
    costs.insert(
        "Serum".to_string(),
        components(&[
            ("Bouteille (flacon)", 1.975),
            ("Pompe dispenser (egouteuse)", 0.69),
            ("Etiquette collante", 1.904),
            ("Emballage", 0.41),
            ("sac expédition", 2.1),
            ("coût produit", 8.33),
        ]),
    );
    costs.insert(
        "Selfcare Butter (Grenade)".to_string(),
        components(&[
            ("pot", 1.964),
            ("Etiquette collante", 0.37),
            ("coût produit", 16.303),
        ]),
    );
    costs.insert(
        "Hair Spray".to_string(),
        components(&[
            ("Bouteille (flacon)", 0.714),
            ("Pompe dispenser (egouteuse)", 1.012),
            ("Etiquette collante", 0.816),
            ("Emballage", 2.1),
            ("sac expédition", 0.4),
            ("carte", 0.75),
            ("coût produit", 11.6025),
        ]),
    );
    costs.insert(
        "Curl Booster 150mL".to_string(),
        components(&[
            ("Bouteille (flacon)", 0.69),
            ("Pompe dispenser (egouteuse)", 0.522),
            ("Etiquette collante", 0.816),
            ("coût produit", 16.2435),
        ]),
    );
    costs.insert(
        "Mini Curly Care Box".to_string(),
        components(&[
            ("prix unité gel", 8.698),
            ("prx unité creme", 12.541),
            ("prix petit pot chantilly", 1.83115),
            ("emballage", 2.1),
            ("carte", 0.75),
        ]),
    );

    let fixed_costs = [
        ("Internet", 100.0),
        ("telephone", 50.0),
        ("Electricité et eau", 100.0),
        ("loyer bureau", 500.0),
        ("honoraires comptable", 150.0),
        ("impots mensuels", 100.0),
        ("frais bilan", 150.0),
        ("frais de deplacements", 150.0),
    ]
    .iter()
    .map(|(cost_type, amount)| FixedCost {
        cost_type: cost_type.to_string(),
        monthly_amount: *amount,
    })
    .collect();

    SeedData {
        prices,
        costs,
        fixed_costs,
    }
});
