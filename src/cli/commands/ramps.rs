use clap::Subcommand;
use serde_json::json;
use std::path::PathBuf;

use crate::cli::config::build_context;
use crate::cli::utils::{output_empty_collection, output_json, output_success};
use crate::cli::OutputFormat;
use crate::forms::RampForm;
use crate::query::SortOrder;
use crate::table::{DataTable, PageWindow, PaginationMode, TableRow, TableView};
use crate::upload::UploadFile;

#[derive(Subcommand)]
pub enum RampsCommands {
    #[command(about = "List ramps one page at a time")]
    List {
        #[arg(long, default_value_t = 1, help = "Page number")]
        page: u32,
        #[arg(long, help = "Rows per page")]
        take: Option<u32>,
        #[arg(long, help = "District filter, e.g. 강남구")]
        district: Option<String>,
        #[arg(long = "type", help = "Facility type filter")]
        facility_type: Option<String>,
        #[arg(long, help = "Free-text search")]
        search: Option<String>,
        #[arg(long, default_value = "desc", help = "Creation date order (asc|desc)")]
        order: SortOrder,
        #[arg(long, help = "Pagination strategy (auto|server|client)")]
        pagination: Option<PaginationMode>,
    },

    #[command(about = "Register a ramp, uploading its images first")]
    Create {
        #[arg(long)]
        district: String,
        #[arg(long)]
        address: String,
        #[arg(long = "name", help = "Trade name of the facility")]
        trade_name: String,
        #[arg(long = "type", help = "Facility type")]
        facility_type: String,
        #[arg(long, help = "Ramp width in metres")]
        width: String,
        #[arg(long)]
        latitude: Option<String>,
        #[arg(long)]
        longitude: Option<String>,
        #[arg(long = "image", help = "Image file to attach (repeatable)")]
        images: Vec<PathBuf>,
    },

    #[command(about = "Delete ramps by id in one request")]
    Delete {
        #[arg(required = true, help = "Ramp ids")]
        ids: Vec<i64>,
    },

    #[command(about = "Bulk import ramps from a spreadsheet")]
    Import {
        #[arg(help = "Spreadsheet file (.xlsx, .xls or .csv)")]
        file: PathBuf,
    },
}

pub async fn handle(cmd: RampsCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let context = build_context()?;

    match cmd {
        RampsCommands::List {
            page,
            take,
            district,
            facility_type,
            search,
            order,
            pagination,
        } => {
            let mut table = context.table();
            if let Some(mode) = pagination {
                table = table.with_mode(mode);
            }
            if let Some(take) = take {
                table.set_page_size(take);
            }
            table.set_order(order);
            if let Some(district) = district {
                table.select_district(&district);
            }
            if let Some(facility_type) = facility_type {
                table.select_facility_type(&facility_type);
            }
            if let Some(search) = search {
                table.search_input(search, tokio::time::Instant::now());
                table.search_commit();
            }

            table.refresh(&context.ramps).await?;
            if table.go_to_page(page) {
                table.refresh(&context.ramps).await?;
            }

            print_table(&table, &output_format)
        }
        RampsCommands::Create {
            district,
            address,
            trade_name,
            facility_type,
            width,
            latitude,
            longitude,
            images,
        } => {
            let form = RampForm {
                district,
                address,
                trade_name,
                facility_type,
                width,
                latitude,
                longitude,
            };

            let mut files = Vec::with_capacity(images.len());
            for path in &images {
                files.push(UploadFile::from_path(path).await?);
            }

            let created = context.ramps.create_with_images(&form, &files).await?;
            output_success(
                &output_format,
                &format!("Ramp '{}' registered with {} image(s)", form.trade_name.trim(), files.len()),
                Some(json!({ "ramp": created })),
            )
        }
        RampsCommands::Delete { ids } => {
            context.ramps.delete(&ids).await?;
            output_success(
                &output_format,
                &format!("Deleted {} ramp(s)", ids.len()),
                Some(json!({ "ids": ids })),
            )
        }
        RampsCommands::Import { file } => {
            let upload = UploadFile::from_path(&file).await?;
            let result = context.ramps.import_excel(&upload).await?;
            output_success(
                &output_format,
                &format!("Imported {}", upload.name),
                Some(json!({ "result": result })),
            )
        }
    }
}

fn print_table(table: &DataTable, output_format: &OutputFormat) -> anyhow::Result<()> {
    let rows = match table.view() {
        TableView::Rows(rows) => rows,
        TableView::Empty => return output_empty_collection(output_format, "ramps", "No ramps found"),
        TableView::Error(e) => return Err(e.into()),
        TableView::Loading => return Err(anyhow::anyhow!("Ramp list did not finish loading")),
    };
    let window = table.window();

    match output_format {
        OutputFormat::Json => output_json(&json!({
            "ramps": rows,
            "page": window.current,
            "take": table.page_size(),
            "total": table.total_items(),
            "totalPages": window.total_pages,
            "pages": window.pages().collect::<Vec<_>>(),
            "prevBlock": window.prev_block(),
            "nextBlock": window.next_block(),
        })),
        OutputFormat::Text => {
            println!(
                "{:>6}  {:<8} {:<10} {:<20} {:<28} {:>6}  {}",
                "ID", "DISTRICT", "TYPE", "NAME", "ADDRESS", "WIDTH", "UPDATED"
            );
            for row in &rows {
                print_row(row);
            }
            println!();
            println!("{}", page_bar(&window));
            println!(
                "{} ramps, page {} of {} ({} / {})",
                table.total_items(),
                window.current,
                window.total_pages,
                table.selected_district_label(),
                table.selected_facility_type_label()
            );
            Ok(())
        }
    }
}

fn print_row(row: &TableRow) {
    println!(
        "{:>6}  {:<8} {:<10} {:<20} {:<28} {:>6}  {}",
        row.id, row.district, row.facility_type, row.store_name, row.address, row.ramp_width, row.update_date
    );
}

/// `« 1 2 [3] 4 … 10 »` where « and » mark an available block jump
fn page_bar(window: &PageWindow) -> String {
    let mut parts = Vec::new();
    if window.prev_block().is_some() {
        parts.push("«".to_string());
    }
    for page in window.pages() {
        if page == window.current {
            parts.push(format!("[{}]", page));
        } else {
            parts.push(page.to_string());
        }
    }
    if window.next_block().is_some() {
        parts.push("»".to_string());
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_bar_marks_current_page_and_block_jumps() {
        assert_eq!(page_bar(&PageWindow::new(3, 4)), "1 2 [3] 4");
        assert_eq!(page_bar(&PageWindow::new(12, 25)), "« 11 [12] 13 14 15 16 17 18 19 20 »");
    }
}
