//! The `pyeongeo subjects`, `domains` and `standards` commands.

use anyhow::Result;

use pyeongeo_core::model::Grade;

use crate::context::AppContext;
use crate::output::standards_table;

pub fn subjects(ctx: &AppContext, grade: Grade) -> Result<()> {
    let library = ctx.library();
    let index = library.band(grade.band())?;

    if index.subjects().is_empty() {
        eprintln!("Warning: no subjects found for {grade}");
    }
    for subject in index.subjects() {
        println!("{}", subject.name);
    }
    Ok(())
}

pub fn domains(ctx: &AppContext, grade: Grade, subject: &str) -> Result<()> {
    let library = ctx.library();
    let index = library.band(grade.band())?;

    let domains = index.domains(subject);
    if domains.is_empty() {
        eprintln!("Warning: no domains found for {grade} {subject}");
    }
    for domain in domains {
        println!("{domain}");
    }
    Ok(())
}

pub fn standards(
    ctx: &AppContext,
    grade: Grade,
    subject: &str,
    domain: &str,
    levels: bool,
) -> Result<()> {
    let library = ctx.library();
    let index = library.band(grade.band())?;

    let standards = index.standards(subject, domain);
    if standards.is_empty() {
        eprintln!("Warning: no achievement standards found for {grade} {subject} / {domain}");
        return Ok(());
    }

    println!("{}", standards_table(standards, levels));
    Ok(())
}
