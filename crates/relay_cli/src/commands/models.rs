//! Models command - list the model catalog.

use anyhow::Result;

use relay_chat::ModelCatalog;

pub async fn execute() -> Result<()> {
    let catalog = ModelCatalog::standard();

    for entry in catalog.entries() {
        let marker = if entry.id == catalog.default_id() {
            " (default)"
        } else {
            ""
        };
        println!("{:<28} {:<24} {}{}", entry.label, entry.id, entry.alias, marker);
    }
    Ok(())
}
