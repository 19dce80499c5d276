//! The `markgrade identify` command.

use std::path::PathBuf;

use anyhow::Result;

use markgrade_core::identity::IdentityResolver;

pub fn execute(paths: Vec<PathBuf>, ocr_text: Option<String>) -> Result<()> {
    let resolver = IdentityResolver::default();
    for path in &paths {
        let name = resolver.resolve(path, ocr_text.as_deref());
        println!("{}\t{name}", path.display());
    }
    Ok(())
}
