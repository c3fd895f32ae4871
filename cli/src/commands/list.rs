//! List command - print one snapshot through the dashboard's view rules.

use anyhow::Result;
use portscope_core::{
    adapters::current_username, derive_rows, AppType, ProcessRecord, SystemCollector,
    ViewParameters,
};

use crate::format::{format_bytes, truncate};

pub async fn run(view: ViewParameters, json: bool) -> Result<()> {
    let user = current_username()?;
    let snapshot = SystemCollector::system().collect(&user).await?;
    let rows = derive_rows(&snapshot, &view);

    if json {
        let records: Vec<&ProcessRecord> =
            rows.iter().filter_map(|row| snapshot.find(row.pid)).collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No processes found.");
        return Ok(());
    }

    // Table header
    println!(
        "{:<8} {:<20} {:<32} {:>6} {:>10} {:<8}",
        "PID", "NAME", "PORTS", "CPU%", "MEM", "TYPE"
    );
    println!("{}", "-".repeat(89));

    for row in &rows {
        let type_str = match row.app_type {
            AppType::GuiApp => "GUI",
            AppType::DevTool => "Dev",
            AppType::Binary => "Bin",
            AppType::Unknown => "-",
        };

        println!(
            "{:<8} {:<20} {:<32} {:>6.1} {:>10} {:<8}",
            row.pid,
            truncate(&row.name, 20),
            truncate(&row.ports, 32),
            row.cpu_percent,
            format_bytes(row.memory_bytes),
            type_str
        );
    }

    println!(
        "\n{}: {} of {} processes",
        view.active_group.display_name(),
        rows.len(),
        snapshot.len()
    );
    Ok(())
}
