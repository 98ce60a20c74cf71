use serde_json::json;

use crate::cli::config::build_context;
use crate::cli::utils::{output_empty_collection, output_json};
use crate::cli::OutputFormat;
use crate::stats::{collect_all, CountEntry, RampStatistics};

pub async fn handle(take: u32, output_format: OutputFormat) -> anyhow::Result<()> {
    let context = build_context()?;
    let records = collect_all(&context.ramps, take).await?;
    if records.is_empty() {
        return output_empty_collection(&output_format, "ramps", "No ramps registered");
    }

    let stats = RampStatistics::from_records(&records);
    match output_format {
        OutputFormat::Json => output_json(&json!({ "statistics": stats })),
        OutputFormat::Text => {
            println!("Total ramps: {}", stats.total);
            println!("With coordinates: {}", stats.with_coordinates);
            println!("With images: {}", stats.with_images);
            print_section("By district", &stats.by_district);
            print_section("By facility type", &stats.by_facility_type);
            print_section("By width", &stats.by_width);
            print_section("By month", &stats.by_month);
            Ok(())
        }
    }
}

fn print_section(title: &str, entries: &[CountEntry]) {
    println!();
    println!("{}", title);
    for e in entries {
        println!("  {:<20} {:>6} ({:.1}%)", e.name, e.count, e.percent);
    }
}
