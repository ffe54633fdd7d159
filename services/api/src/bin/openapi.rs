//! services/api/src/bin/openapi.rs
//!
//! Dumps the OpenAPI document of the travel planner API.
//!
//! Usage: `openapi [PATH]`. `PATH` defaults to `openapi.json`; `-` prints to
//! stdout instead.

use std::io::Write;

use api_lib::web::ApiDoc;
use utoipa::OpenApi;

const DEFAULT_PATH: &str = "openapi.json";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let target = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_PATH.to_string());
    let document = ApiDoc::openapi().to_pretty_json()?;

    if target == "-" {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(document.as_bytes())?;
        stdout.write_all(b"\n")?;
    } else {
        std::fs::write(&target, document)?;
        eprintln!("Wrote OpenAPI document to {}", target);
    }
    Ok(())
}
