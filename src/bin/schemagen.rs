// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Install-config JSON Schema Generator
//!
//! Generates the JSON schema of the install-config from the Rust types defined
//! in src/install_config.rs, so editors and CI can check install-configs
//! without running the installer.
//!
//! Usage:
//!   cargo run --bin schemagen
//!
//! The schema is written to schema/install-config.schema.json.

use ibmcloud_installer::install_config::InstallConfig;
use serde_json::Value;
use std::fs;
use std::path::Path;

const SCHEMA_COMMENT: &str =
    "AUTO-GENERATED from src/install_config.rs - run `cargo run --bin schemagen` to regenerate";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = Path::new("schema");
    fs::create_dir_all(output_dir)?;

    println!("Generating install-config schema from src/install_config.rs...");

    let schema = schemars::schema_for!(InstallConfig);
    let mut schema_json: Value = serde_json::to_value(&schema)?;
    if let Some(object) = schema_json.as_object_mut() {
        object.insert("$comment".to_string(), Value::String(SCHEMA_COMMENT.to_string()));
    }

    let output_path = output_dir.join("install-config.schema.json");
    fs::write(&output_path, serde_json::to_string_pretty(&schema_json)? + "\n")?;

    println!("  ✓ Generated {}", output_path.display());

    Ok(())
}
