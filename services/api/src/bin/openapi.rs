//! services/api/src/bin/openapi.rs
//!
//! Dumps the ClassTAP OpenAPI document for client generation.
//!
//! Usage: `openapi [PATH]`. `PATH` defaults to `openapi.json`; `-` prints to stdout.

use api_lib::web::ApiDoc;
use std::io::Write;
use utoipa::OpenApi;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = ApiDoc::openapi();
    doc.info.version = env!("CARGO_PKG_VERSION").to_string();
    let json = doc.to_pretty_json()?;

    match std::env::args().nth(1).as_deref() {
        Some("-") => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
        path => {
            let path = path.unwrap_or("openapi.json");
            std::fs::write(path, json)?;
            eprintln!("Wrote {} paths to {}", doc.paths.paths.len(), path);
        }
    }
    Ok(())
}
