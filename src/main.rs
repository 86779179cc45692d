// Entry point and interactive menu.
//
// The sales sheet is loaded once at startup; a failed load is fatal. After
// that the operator moves between views, switches the selected month and
// edits the price, cost and fixed-cost tables. Every edit goes through the
// session, which rebuilds the affected margin figures before the next view
// is printed.
mod config;
mod error;
mod loader;
mod margins;
mod monthly;
mod months;
mod output;
mod reports;
mod reshape;
mod session;
mod tables;
mod types;
mod util;

use anyhow::Context;
use clap::Parser;
use config::{Args, SeedData};
use log::{info, warn};
use reshape::SalesData;
use session::{Edit, Recomputed, Session};
use std::io::{self, Write};
use std::path::Path;

/// Print `prompt` and read one trimmed line. `None` means stdin is closed.
fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn read_choice() -> Option<String> {
    read_line("Enter choice: ")
}

fn read_amount(prompt: &str) -> Option<f64> {
    loop {
        let input = read_line(prompt)?;
        match util::parse_f64_safe(Some(&input)) {
            Some(v) => return Some(v),
            None => println!("Invalid number: '{}'", input),
        }
    }
}

fn print_unmatched(label: &str, products: &[String]) {
    if !products.is_empty() {
        println!("Warning: {}: {}", label, products.join(", "));
    }
}

fn show_heatmap(session: &Session) {
    println!("Monthly Sales Heatmap\n");
    output::preview_grid(reports::heatmap_grid(session.sales().matrix()));
}

fn show_top_sales(session: &Session) {
    println!("Top Sales ({})\n", months::label(session.month()));
    let rows = reports::top_seller_rows(session.sales().long(), session.month());
    output::preview_table_rows(&rows, rows.len());
}

fn show_margins(session: &Session) {
    println!("Product Margins\n");
    let margins = session.margins();
    output::preview_table_rows(&reports::margin_rows(margins), margins.records.len());
    print_unmatched("no price, excluded", &margins.unmatched.left_only);
    print_unmatched("no cost entry, excluded", &margins.unmatched.right_only);
    print_unmatched("price is 0, margin % is N/A", &margins.undefined_pct());
    println!();
}

fn show_monthly(session: &Session) {
    let monthly = session.monthly();
    println!("Monthly margins ({})\n", months::label(monthly.month));
    output::preview_table_rows(&reports::monthly_rows(monthly), monthly.lines.len());
    println!(
        "Total : {}",
        util::format_number(monthly.total_monthly_margin.round(), 0)
    );
    println!(
        "Total Fixed Cost: {}",
        util::format_number(monthly.total_fixed_cost, 0)
    );
    println!(
        "Coverage ratio: {}",
        util::format_optional(monthly.coverage.ratio, 3)
    );
    println!("{}", output::render_gauge(&monthly.coverage));
    print_unmatched("margin but no sales row", &monthly.unmatched.left_only);
    print_unmatched("sold but no margin", &monthly.unmatched.right_only);
    println!();
}

fn show_issues(session: &Session) {
    let issues = session.issues();
    println!("Data quality ({} issue(s))\n", util::format_int(issues.len()));
    output::preview_table_rows(&reports::issue_rows(issues), issues.len());
}

fn show_all(session: &Session) {
    show_heatmap(session);
    show_top_sales(session);
    show_margins(session);
    show_monthly(session);
    if !session.issues().is_empty() {
        show_issues(session);
    }
}

fn handle_select_month(session: &mut Session) -> Option<()> {
    let input = read_line("Month (e.g. Janvier, mars, 12): ")?;
    match months::parse_label(&input) {
        Some(month) => {
            session.select_month(month);
            println!("Selected {}.\n", months::label(month));
            show_monthly(session);
        }
        None => println!("Unknown month: '{}'\n", input),
    }
    Some(())
}

fn apply_edit(session: &mut Session, edit: Edit) {
    match session.apply(edit) {
        Ok(Recomputed::Margins) => println!("Updated. Margins and monthly summary recomputed.\n"),
        Ok(Recomputed::Monthly) => println!("Updated. Monthly summary recomputed.\n"),
        Err(e) => println!("Edit rejected: {}\n", e),
    }
}

fn handle_edit_prices(session: &mut Session) -> Option<()> {
    loop {
        println!("Product prices\n");
        output::preview_table_rows(
            &reports::price_rows(session.prices()),
            session.prices().len(),
        );
        println!("[1] Set a price");
        println!("[2] Remove a product's price");
        println!("[0] Back\n");
        let edit = match read_choice()?.as_str() {
            "1" => Edit::SetPrice {
                product: read_line("Product: ")?,
                unit_price: read_amount("Price: ")?,
            },
            "2" => Edit::RemovePrice {
                product: read_line("Product: ")?,
            },
            "0" => return Some(()),
            _ => {
                println!("Invalid choice.\n");
                continue;
            }
        };
        apply_edit(session, edit);
    }
}

fn handle_edit_costs(session: &mut Session) -> Option<()> {
    loop {
        println!("Product costs\n");
        let rows = reports::cost_component_rows(session.costs());
        output::preview_table_rows(&rows, rows.len());
        println!("[1] Set a component cost");
        println!("[2] Rename a component");
        println!("[3] Remove a component");
        println!("[4] Add a product");
        println!("[5] Remove a product");
        println!("[0] Back\n");
        let edit = match read_choice()?.as_str() {
            "1" => Edit::SetComponent {
                product: read_line("Product: ")?,
                component: read_line("Component: ")?,
                unit_cost: read_amount("Unit cost: ")?,
            },
            "2" => Edit::RenameComponent {
                product: read_line("Product: ")?,
                from: read_line("Component: ")?,
                to: read_line("New name: ")?,
            },
            "3" => Edit::RemoveComponent {
                product: read_line("Product: ")?,
                component: read_line("Component: ")?,
            },
            "4" => Edit::AddProduct {
                product: read_line("Product: ")?,
            },
            "5" => Edit::RemoveProduct {
                product: read_line("Product: ")?,
            },
            "0" => return Some(()),
            _ => {
                println!("Invalid choice.\n");
                continue;
            }
        };
        apply_edit(session, edit);
    }
}

fn handle_edit_fixed_costs(session: &mut Session) -> Option<()> {
    loop {
        println!("Fixed costs\n");
        let rows = reports::fixed_cost_rows(session.fixed_costs());
        output::preview_table_rows(&rows, rows.len());
        println!(
            "Total Fixed Cost: {}\n",
            util::format_number(session.fixed_costs().total(), 0)
        );
        println!("[1] Set a fixed cost");
        println!("[2] Remove a fixed cost");
        println!("[0] Back\n");
        let edit = match read_choice()?.as_str() {
            "1" => Edit::SetFixedCost {
                cost_type: read_line("Cost type: ")?,
                monthly_amount: read_amount("Monthly cost: ")?,
            },
            "2" => Edit::RemoveFixedCost {
                cost_type: read_line("Cost type: ")?,
            },
            "0" => return Some(()),
            _ => {
                println!("Invalid choice.\n");
                continue;
            }
        };
        apply_edit(session, edit);
    }
}

const EXPORT_FILES: usize = 4;

/// Write every report for the selected month to `dir`, returning the
/// error message of each file that could not be written.
fn export_reports(session: &Session, dir: &Path) -> Vec<String> {
    let month = months::label(session.month());
    if let Err(e) = std::fs::create_dir_all(dir) {
        return vec![e.to_string()];
    }
    let margins_file = dir.join("margins.csv");
    let monthly_file = dir.join(format!("monthly_margins_{}.csv", month));
    let top_file = dir.join(format!("top_sellers_{}.csv", month));
    let summary_file = dir.join(format!("summary_{}.json", month));

    let results: [Result<(), Box<dyn std::error::Error>>; EXPORT_FILES] = [
        output::write_csv(&margins_file, &reports::margin_rows(session.margins())),
        output::write_csv(&monthly_file, &reports::monthly_rows(session.monthly())),
        output::write_csv(
            &top_file,
            &reports::top_seller_rows(session.sales().long(), session.month()),
        ),
        output::write_json(&summary_file, &reports::generate_summary(session)),
    ];
    results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .map(|e| e.to_string())
        .collect()
}

fn handle_export(session: &Session, dir: &Path) {
    let errors = export_reports(session, dir);
    for e in &errors {
        eprintln!("Write error: {}", e);
    }
    if errors.is_empty() {
        println!("Outputs saved to {}\n", dir.display());
    } else {
        println!(
            "Export incomplete: {} of {} files could not be written to {}\n",
            errors.len(),
            EXPORT_FILES,
            dir.display()
        );
    }
}

fn run_menu(session: &mut Session, export_dir: &Path) {
    loop {
        println!("Select a view (month: {}):", months::label(session.month()));
        println!("[1] Select month");
        println!("[2] Monthly sales heatmap");
        println!("[3] Top sales");
        println!("[4] Product margins");
        println!("[5] Monthly margins and fixed-cost coverage");
        println!("[6] Edit product prices");
        println!("[7] Edit product costs");
        println!("[8] Edit fixed costs");
        println!("[9] Data quality");
        println!("[10] Export reports");
        println!("[0] Exit\n");
        let Some(choice) = read_choice() else {
            break;
        };
        println!();
        let done = match choice.as_str() {
            "1" => handle_select_month(session).is_none(),
            "2" => {
                show_heatmap(session);
                false
            }
            "3" => {
                show_top_sales(session);
                false
            }
            "4" => {
                show_margins(session);
                false
            }
            "5" => {
                show_monthly(session);
                false
            }
            "6" => handle_edit_prices(session).is_none(),
            "7" => handle_edit_costs(session).is_none(),
            "8" => handle_edit_fixed_costs(session).is_none(),
            "9" => {
                show_issues(session);
                false
            }
            "10" => {
                handle_export(session, export_dir);
                false
            }
            "0" => true,
            _ => {
                println!("Invalid choice. Please enter 0 to 10.\n");
                false
            }
        };
        if done {
            break;
        }
    }
    println!("Exiting the program.");
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_filter()))
        .init();

    let seed = match &args.seed {
        Some(path) => config::load_seed(path)
            .with_context(|| format!("failed to load seed file {}", path.display()))?,
        None => SeedData::default(),
    };
    let (costs, prices, fixed_costs) = seed.build_tables()?;
    if costs.is_empty() || prices.is_empty() {
        warn!("cost or price table is empty, no margins until one is added");
    }
    info!(
        "seeded {} costed products, {} prices, {} fixed costs",
        costs.len(),
        prices.len(),
        fixed_costs.rows().len()
    );

    let (table, load_report) = loader::load_sales(&args.file, args.header_row, &args.sheet)
        .with_context(|| format!("failed to load sales from {}", args.file.display()))?;
    println!(
        "Processing dataset... ({} products loaded, {} rows skipped)",
        util::format_int(load_report.loaded_rows),
        util::format_int(load_report.skipped_rows)
    );
    let sales = SalesData::prepare(&table, load_report.issues);
    if !sales.issues().is_empty() {
        println!(
            "Note: {} data issue(s) recovered; see Data quality.",
            util::format_int(sales.issues().len())
        );
    }
    println!();
    info!(
        "loaded {} of {} product rows from {}",
        load_report.loaded_rows,
        load_report.total_rows,
        args.file.display()
    );

    let mut session = Session::new(sales, costs, prices, fixed_costs, args.month);
    if args.report {
        show_all(&session);
        handle_export(&session, &args.export_dir);
        return Ok(());
    }
    run_menu(&mut session, &args.export_dir);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{CostTable, FixedCostTable, PriceTable};
    use crate::types::{WideSalesRow, WideSalesTable};
    use chrono::Month;
    use std::fs;
    use tempfile::TempDir;

    fn session() -> Session {
        let mut months = [0.0; 12];
        months[2] = 20.0;
        let table = WideSalesTable {
            rows: vec![WideSalesRow {
                product: "Widget".to_string(),
                months,
                total: Some(20.0),
                source_row: 3,
            }],
        };
        let mut costs = CostTable::default();
        costs.set_component("Widget", "parts", 10.0).unwrap();
        let mut prices = PriceTable::default();
        prices.set_price("Widget", 15.0).unwrap();
        let mut fixed = FixedCostTable::default();
        fixed.set("loyer", 200.0).unwrap();
        Session::new(
            SalesData::prepare(&table, Vec::new()),
            costs,
            prices,
            fixed,
            Month::March,
        )
    }

    #[test]
    fn export_writes_every_report() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("exports");
        assert!(export_reports(&session(), &out).is_empty());
        for name in [
            "margins.csv",
            "monthly_margins_mars.csv",
            "top_sellers_mars.csv",
            "summary_mars.json",
        ] {
            assert!(out.join(name).is_file(), "{name} missing");
        }
    }

    #[test]
    fn export_reports_each_failed_file() {
        let dir = TempDir::new().unwrap();
        // A directory where the margins CSV should go cannot be written over.
        fs::create_dir(dir.path().join("margins.csv")).unwrap();
        let errors = export_reports(&session(), dir.path());
        assert_eq!(errors.len(), 1);
        assert!(dir.path().join("summary_mars.json").is_file());
    }
}
