use crate::models::ScanResult;
use crate::scan::ScanSummary;

const STYLE: &str = r#"
    body { font-family: Arial, sans-serif; margin: 20px; }
    .summary { background-color: #f5f5f5; padding: 15px; border-radius: 5px; margin-bottom: 20px; }
    .eol { background-color: #ffebee; border-left: 4px solid #f44336; }
    .active { background-color: #e8f5e8; border-left: 4px solid #4caf50; }
    .unknown { background-color: #fff3e0; border-left: 4px solid #ff9800; }
    .not-found { background-color: #f3e5f5; border-left: 4px solid #9c27b0; }
    table { border-collapse: collapse; width: 100%; }
    th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
    th { background-color: #f2f2f2; }
"#;

/// Render a standalone HTML report. Every value taken from input or catalog is escaped.
pub fn render(results: &[ScanResult], summary: &ScanSummary) -> String {
    let mut html = String::new();
    let stamp = summary.scan_timestamp.format("%Y-%m-%d %H:%M:%S").to_string();

    html.push_str(&format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>EOL Scan Report - {}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n",
        escape_html(&stamp)
    ));
    html.push_str("<h1>End of Life Scan Report</h1>\n<div class=\"summary\">\n<h2>Summary</h2>\n");
    for (label, value) in [
        ("Source File", escape_html(&summary.source_file)),
        ("Scan Date", escape_html(&stamp)),
        ("Total Packages", summary.total_packages.to_string()),
        ("Matched Products", summary.matched_products.to_string()),
        ("EOL Packages", summary.eol.to_string()),
        ("Active Packages", summary.active.to_string()),
        ("Unknown Status", summary.unknown.to_string()),
        ("Not Found", summary.not_found.to_string()),
        ("Skipped Rows", summary.skipped_rows.to_string()),
    ] {
        html.push_str(&format!("<p><strong>{label}:</strong> {value}</p>\n"));
    }
    html.push_str("</div>\n\n<h2>Package Details</h2>\n<table>\n");
    html.push_str(
        "<tr><th>Row</th><th>Package</th><th>Version</th><th>Product</th><th>Cycle</th>\
         <th>Confidence</th><th>Status</th><th>EOL Date</th><th>Details</th></tr>\n",
    );

    for r in results {
        let eol_date = r
            .eol_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            r.status.css_class(),
            r.record.row_index,
            escape_html(&r.record.raw_name),
            escape_html(&r.record.raw_version),
            escape_html(r.product.as_deref().unwrap_or("N/A")),
            escape_html(r.cycle.as_deref().unwrap_or("N/A")),
            r.confidence,
            r.status,
            eol_date,
            escape_html(&r.detail),
        ));
    }

    html.push_str("</table>\n</body>\n</html>\n");
    html
}

/// Escape text for HTML element content and quoted attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
