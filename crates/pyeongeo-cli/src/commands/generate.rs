//! The `pyeongeo generate` command.

use anyhow::{Context, Result};
use serde::Serialize;

use pyeongeo_core::cache::CacheStore;
use pyeongeo_core::generator::SentenceGenerator;
use pyeongeo_core::model::{AchievementStandard, Grade, SentenceCounts, StandardKey};
use pyeongeo_core::results::GeneratedSentences;

use crate::context::AppContext;
use crate::output::{describe_source, render_sentences};
use crate::OutputFormat;

#[derive(Serialize)]
struct GenerateOutput<'a> {
    grade: u8,
    subject: &'a str,
    domain: &'a str,
    standard: &'a AchievementStandard,
    counts: SentenceCounts,
    #[serde(flatten)]
    result: &'a GeneratedSentences,
}

pub async fn execute(
    ctx: &AppContext,
    grade: Grade,
    subject: &str,
    code: &str,
    counts: SentenceCounts,
    format: OutputFormat,
    dry_run: bool,
) -> Result<()> {
    // Credentials are checked before any document work.
    let provider = if dry_run { None } else { Some(ctx.provider()?) };

    let library = ctx.library();
    let index = library.band(grade.band())?;
    let (domain, standard) = index
        .find_standard(subject, code)
        .with_context(|| format!("achievement standard [{code}] not found in {grade} {subject}"))?;
    let guidelines = library.guidelines()?.clone();
    let key = StandardKey::new(grade, subject, standard);

    let request = Request {
        grade,
        subject,
        domain,
        standard,
        key: &key,
        counts,
        format,
    };
    match provider {
        Some(provider) => request.run(&ctx.generator(provider, guidelines)).await,
        None => request.run(&ctx.dry_run_generator(guidelines)).await,
    }
}

struct Request<'a> {
    grade: Grade,
    subject: &'a str,
    domain: &'a str,
    standard: &'a AchievementStandard,
    key: &'a StandardKey,
    counts: SentenceCounts,
    format: OutputFormat,
}

impl Request<'_> {
    async fn run<C: CacheStore>(self, generator: &SentenceGenerator<C>) -> Result<()> {
        let Request {
            grade,
            subject,
            domain,
            standard,
            key,
            counts,
            format,
        } = self;
        let generated = generator.request_sentences(key, standard, counts).await?;

        match format {
            OutputFormat::Text => {
                println!("{}", standard.standard);
                println!("{}", describe_source(&generated));
                print!("{}", render_sentences(&generated.sentences));
            }
            OutputFormat::Json => {
                let output = GenerateOutput {
                    grade: grade.number(),
                    subject,
                    domain,
                    standard,
                    counts,
                    result: &generated,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
        }

        Ok(())
    }
}
