use crate::output::{read_logs, render_logs, RenderOptions};
use crate::utils::config::SCHEMA_VERSION;
use anyhow::Result;
use std::path::PathBuf;

/// Validate a logs JSON file
pub fn validate_logs_file(file_path: PathBuf, print_tree: bool) -> Result<()> {
    println!("Validating logs: {}", file_path.display());

    let doc = read_logs(&file_path)?;

    if doc.version != SCHEMA_VERSION {
        anyhow::bail!(
            "Unsupported schema version {} (expected {})",
            doc.version,
            SCHEMA_VERSION
        );
    }

    let shallow = doc
        .roots
        .iter()
        .filter(|root| root.depth() < usize::from(doc.min_call_stack_size))
        .count();
    if shallow > 0 {
        anyhow::bail!(
            "{} root(s) are shallower than min_call_stack_size {}",
            shallow,
            doc.min_call_stack_size
        );
    }

    println!("✓ Valid logs JSON");
    println!("  Version: {}", doc.version);
    println!("  Generated: {}", doc.generated_at);
    println!("  Min Call Stack Size: {}", doc.min_call_stack_size);
    println!("  Roots: {}", doc.roots.len());
    println!("  Nodes: {}", doc.node_count());

    if print_tree {
        println!();
        print!("{}", render_logs(&doc.roots, &RenderOptions::default()));
    }

    Ok(())
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("Chain Trace Logs Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string              - Schema version (e.g., '1.0.0')");
        println!("  generated_at: string         - ISO 8601 timestamp");
        println!("  min_call_stack_size: number  - Retention threshold in force");
        println!("  roots: array                 - Retained call trees, completion order");
        println!("    name: string               - Fully-qualified callable name");
        println!("    attributes: object         - string or unsigned integer values");
        println!("      childCount: number       - Identical repeats merged into this call");
        println!("    children: array            - Nested calls, call order");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("Chain Trace v{}", env!("CARGO_PKG_VERSION"));
    println!("Logs Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("A live call-chain recorder with repeat aggregation.");
}
