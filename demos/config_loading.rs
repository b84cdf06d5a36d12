//! Loading a hierarchy from TOML instead of the macro.
//!
//! This example shows how to:
//! - Parse a hierarchy declaration from TOML text
//! - Build the class graph from the parsed config
//! - Resolve discriminator maps without any compile-time declarations

use discr_map::*;

const HIERARCHY: &str = r#"
[[class]]
name = "Document"

[[class]]
name = "Invoice"
parent = "Document"
discr = "invoice"

[[class]]
name = "Receipt"
parent = "Document"
discr = "receipt"

[[class]]
name = "CreditNote"
parent = "Invoice"
discr = "credit_note"
"#;

fn main() {
    println!("=== Config Loading Example ===\n");

    // 1. Parse the declaration
    let config = HierarchyConfig::from_str(HIERARCHY).unwrap();
    println!("Parsed {} class declarations:", config.len());
    for class in config.classes() {
        println!(
            "  {:<12} parent={:<10} discr={:?}",
            class.name,
            class.parent.as_deref().unwrap_or("-"),
            class.discr
        );
    }
    println!();

    // 2. Build the runtime graph
    let graph = ClassGraph::from_config(&config).unwrap();
    let document = graph.id_of("Document").unwrap();
    let credit_note = graph.id_of("CreditNote").unwrap();

    println!("Graph lookups:");
    println!("  Document descendants: {:?}", graph.descendants_of(document));
    println!("  CreditNote parent:    {:?}", graph.parent_of(credit_note));
    println!();

    // 3. Resolve the family from any member
    let resolution = resolve(&graph, credit_note).unwrap();
    println!("Resolved from CreditNote:");
    println!("  root: {}", graph.name_of(resolution.root).unwrap());
    for (tag, class) in resolution.map.iter() {
        println!(
            "  {:<12} -> {}",
            tag,
            graph.name_of(class).unwrap()
        );
    }
}
