use std::collections::HashMap;

use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::models::{Confidence, ScanResult, ScanStatus};
use crate::scan::ScanSummary;

/// Render a colored terminal report for one scanned file.
pub fn render(results: &[ScanResult], summary: &ScanSummary, verbose: bool, quiet: bool) {
    if quiet {
        println!(
            "{}  Total: {}  EOL: {}  Active: {}  Unknown: {}  Not found: {}",
            summary.source_file,
            summary.total_packages,
            summary.eol.to_string().red(),
            summary.active.to_string().green(),
            summary.unknown.to_string().yellow(),
            summary.not_found.to_string().dimmed(),
        );
        return;
    }

    println!("\n {} v{}", "eol-scanner".bold(), env!("CARGO_PKG_VERSION"));
    println!(" Scanned: {}\n", summary.source_file);

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    println!(
        " │  {:<48} │",
        format!("Total packages     : {}", summary.total_packages)
    );
    println!(
        " │  {:<48} │",
        format!("Matched products   : {}", summary.matched_products)
    );
    println!(
        " │  {:<48} │",
        format!(
            "{}  EOL             : {:>4}  {}",
            "✗".red(),
            summary.eol,
            top_products(results, ScanStatus::Eol)
        )
    );
    println!(
        " │  {:<48} │",
        format!("{}  Active          : {:>4}", "✓".green(), summary.active)
    );
    println!(
        " │  {:<48} │",
        format!("{}  Unknown         : {:>4}", "?".yellow(), summary.unknown)
    );
    println!(
        " │  {:<48} │",
        format!("{}  Not found       : {:>4}", "·".dimmed(), summary.not_found)
    );
    if summary.skipped_rows > 0 {
        println!(
            " │  {:<48} │",
            format!("   Skipped rows    : {:>4}", summary.skipped_rows)
        );
    }
    println!(" └────────────────────────────────────────────────────┘\n");

    if summary.eol > 0 {
        println!(" {} End-of-life packages:\n", "[EOL]".red().bold());
        render_table(results, ScanStatus::Eol);
        println!();
    }

    if summary.unknown > 0 {
        println!(" {} Packages with unknown status:\n", "[UNKNOWN]".yellow().bold());
        render_table(results, ScanStatus::Unknown);
        println!();
    }

    if summary.not_found > 0 {
        println!(" {} Packages not in the catalog:\n", "[NOT FOUND]".dimmed().bold());
        render_table(results, ScanStatus::NotFound);
        println!();
    }

    if verbose && summary.active > 0 {
        println!(" {} Supported packages:\n", "[ACTIVE]".green().bold());
        render_table(results, ScanStatus::Active);
        println!();
    }
}

fn render_table(results: &[ScanResult], status_filter: ScanStatus) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Row").add_attribute(Attribute::Bold),
            Cell::new("Package").add_attribute(Attribute::Bold),
            Cell::new("Version").add_attribute(Attribute::Bold),
            Cell::new("Product").add_attribute(Attribute::Bold),
            Cell::new("Cycle").add_attribute(Attribute::Bold),
            Cell::new("Match").add_attribute(Attribute::Bold),
            Cell::new("EOL date").add_attribute(Attribute::Bold),
            Cell::new("Details").add_attribute(Attribute::Bold),
        ]);

    for r in results.iter().filter(|r| r.status == status_filter) {
        let confidence_color = match r.confidence {
            Confidence::Exact => Color::Green,
            Confidence::Normalized => Color::Cyan,
            Confidence::Fuzzy => Color::Yellow,
            Confidence::None => Color::DarkGrey,
        };

        let status_color = match r.status {
            ScanStatus::Eol => Color::Red,
            ScanStatus::Active => Color::Green,
            ScanStatus::Unknown => Color::Yellow,
            ScanStatus::NotFound => Color::DarkGrey,
        };

        table.add_row(vec![
            Cell::new(r.record.row_index).set_alignment(CellAlignment::Right),
            Cell::new(&r.record.raw_name),
            Cell::new(&r.record.raw_version),
            Cell::new(r.product.as_deref().unwrap_or("-")),
            Cell::new(r.cycle.as_deref().unwrap_or("-")),
            Cell::new(r.confidence.to_string()).fg(confidence_color),
            Cell::new(r.eol_date.map(|d| d.to_string()).unwrap_or_default()).fg(status_color),
            Cell::new(&r.detail),
        ]);
    }

    println!("{}", table);
}

/// The three most frequent products with the given status, e.g. `[python (4), nodejs (2)]`.
fn top_products(results: &[ScanResult], status: ScanStatus) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for r in results.iter().filter(|r| r.status == status) {
        if let Some(product) = r.product.as_deref() {
            *counts.entry(product).or_insert(0) += 1;
        }
    }

    let mut pairs: Vec<(&str, usize)> = counts.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let summary: Vec<String> = pairs
        .iter()
        .take(3)
        .map(|(product, cnt)| format!("{} ({})", product, cnt))
        .collect();

    if summary.is_empty() {
        String::new()
    } else {
        format!("[{}]", summary.join(", "))
    }
}
