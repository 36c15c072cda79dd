use anyhow::{Context, Result};
use std::path::Path;

use coverage_checker::view::PageBindings;

pub fn validate_page(path: &Path) -> Result<()> {
    let html = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read page: {}", path.display()))?;

    let bindings = PageBindings::from_html(&html)
        .with_context(|| format!("Page {} is missing a bound element", path.display()))?;

    println!("{} binds every element:", path.display());
    for (role, id) in bindings.roles() {
        println!("  {role:<20} #{id}");
    }
    Ok(())
}
