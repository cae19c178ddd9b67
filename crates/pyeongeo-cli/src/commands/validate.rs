//! The `pyeongeo validate` command.

use anyhow::Result;

use pyeongeo_core::model::GradeBand;

use crate::context::AppContext;

pub fn execute(ctx: &AppContext) -> Result<()> {
    let library = ctx.library();
    println!("Data directory: {}", ctx.config.data_dir.display());

    for band in GradeBand::ALL {
        match library.band(band) {
            Ok(index) => {
                let domains: usize = index.subjects().iter().map(|s| s.domains.len()).sum();
                let standards: usize = index
                    .subjects()
                    .iter()
                    .flat_map(|s| &s.domains)
                    .map(|d| d.standards.len())
                    .sum();
                println!(
                    "{band}: {} subjects, {domains} domains, {standards} standards",
                    index.subjects().len()
                );
            }
            Err(e) => println!("{band}: ERROR: {e}"),
        }
    }

    match library.guidelines() {
        Ok(guidelines) => println!(
            "Guidelines: {} example group(s){}",
            guidelines.examples.len(),
            if guidelines.summary.is_some() {
                ""
            } else {
                ", no summary (using default)"
            }
        ),
        Err(e) => println!("Guidelines: ERROR: {e}"),
    }

    let warnings = library.validate();
    for w in &warnings {
        let prefix = w
            .subject
            .as_ref()
            .map(|subject| format!("  [{} {subject}]", w.band))
            .unwrap_or_else(|| format!("  [{}]", w.band));
        println!("{prefix} WARNING: {}", w.message);
    }

    let errors = library.load_errors().len();
    if errors > 0 {
        anyhow::bail!("{errors} document(s) failed to load");
    }

    if warnings.is_empty() {
        println!("All documents valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
