// Load an ORM reference sheet (.csv / .xlsx) into the reference_tier table.
//
// Usage:
//   cargo run --bin import_reference_data -- <sheet_path> [db_path]
//
// The whole table is replaced in one transaction; any invalid row aborts the import.

use supplement_costing::app::get_default_db_path;
use supplement_costing::db::{ensure_schema, open_sqlite_connection};
use supplement_costing::importer::ReferenceImporter;
use supplement_costing::logging;
use supplement_costing::repository::ReferenceTierRepository;
use std::sync::{Arc, Mutex};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let sheet_path = args
        .next()
        .ok_or("usage: import_reference_data <sheet_path> [db_path]")?;
    let db_path = args.next().unwrap_or_else(get_default_db_path);

    let conn = open_sqlite_connection(&db_path)?;
    ensure_schema(&conn)?;

    let repo = ReferenceTierRepository::from_connection(Arc::new(Mutex::new(conn)));
    let summary = ReferenceImporter::new(repo).import_file(&sheet_path)?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
