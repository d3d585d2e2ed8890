//! services/api/src/bin/openapi.rs
//!
//! Writes the workout tracker's OpenAPI document to disk.
//!
//! Usage: `openapi [OUTPUT]` (defaults to `openapi.json`). Pass `-` to print
//! the document to stdout instead.

use api_lib::web::rest::ApiDoc;
use std::path::PathBuf;
use utoipa::OpenApi;

const DEFAULT_OUTPUT: &str = "openapi.json";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let document = ApiDoc::openapi();
    let json = document.to_pretty_json()?;

    match std::env::args().nth(1).as_deref() {
        Some("-") => println!("{}", json),
        target => {
            let output = PathBuf::from(target.unwrap_or(DEFAULT_OUTPUT));
            std::fs::write(&output, json)?;
            eprintln!(
                "Wrote {} paths to {}",
                document.paths.paths.len(),
                output.display()
            );
        }
    }
    Ok(())
}
