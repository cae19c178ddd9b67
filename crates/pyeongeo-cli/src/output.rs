//! Terminal rendering shared by several commands.

use comfy_table::{Cell, Table};

use pyeongeo_core::model::{AchievementStandard, SentenceSet, Tier};
use pyeongeo_core::results::{GeneratedSentences, SentenceSource};

/// Sentences grouped under `[상]`, `[중]` and `[하]` headings, numbered from 1.
pub fn render_sentences(sentences: &SentenceSet) -> String {
    let mut out = String::new();
    for tier in Tier::ALL {
        out.push_str(&format!("[{tier}]\n"));
        let tier_sentences = sentences.get(tier);
        if tier_sentences.is_empty() {
            out.push_str("  (none)\n");
        }
        for (i, sentence) in tier_sentences.iter().enumerate() {
            out.push_str(&format!("  {}. {sentence}\n", i + 1));
        }
    }
    out
}

/// One-line description of where a result came from.
pub fn describe_source(generated: &GeneratedSentences) -> String {
    match (&generated.source, &generated.token_usage) {
        (SentenceSource::Cached, _) => format!("{} (cached)", generated.cache_key),
        (SentenceSource::Generated, Some(usage)) => format!(
            "{} (generated, {} tokens)",
            generated.cache_key, usage.total_tokens
        ),
        (SentenceSource::Generated, None) => format!("{} (generated)", generated.cache_key),
    }
}

pub fn standards_table(standards: &[AchievementStandard], levels: bool) -> Table {
    let mut table = Table::new();

    let mut header = vec!["Code", "Standard"];
    if levels {
        header.extend(Tier::ALL.iter().map(|t| t.label()));
    }
    table.set_header(header);

    for standard in standards {
        let mut row = vec![Cell::new(standard.code()), Cell::new(&standard.standard)];
        if levels {
            row.extend(Tier::ALL.iter().map(|&t| Cell::new(standard.levels.get(t))));
        }
        table.add_row(row);
    }
    table
}
