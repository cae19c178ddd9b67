//! The `pyeongeo session` command: interactive remark assembly.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, MultiSelect, Select};

use pyeongeo_core::curriculum::CurriculumLibrary;
use pyeongeo_core::model::{
    CacheKey, Grade, SentenceCounts, SentenceSet, Tier, MAX_SENTENCES_PER_TIER,
    MIN_SENTENCES_PER_TIER,
};
use pyeongeo_core::session::{Phase, Selection, Session};

use crate::context::AppContext;
use crate::output::{describe_source, render_sentences};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    Select,
    Generate,
    Pick,
    Edit,
    Clear,
    Save,
    Quit,
}

impl MenuAction {
    fn label(self) -> &'static str {
        match self {
            MenuAction::Select => "Choose grade, subject and standard",
            MenuAction::Generate => "Generate sentences",
            MenuAction::Pick => "Add sentences to the remark",
            MenuAction::Edit => "Edit the remark",
            MenuAction::Clear => "Clear all",
            MenuAction::Save => "Save the remark to a file",
            MenuAction::Quit => "Quit",
        }
    }
}

/// Actions that make sense in the current session state.
fn menu(session: &Session) -> Vec<MenuAction> {
    let mut actions = vec![MenuAction::Select];

    let has_standard = session
        .selection()
        .is_some_and(|selection| selection.standard.is_some());
    if has_standard && matches!(session.phase(), Phase::Selecting | Phase::Displaying) {
        actions.push(MenuAction::Generate);
    }
    if session.phase() == Phase::Displaying {
        actions.push(MenuAction::Pick);
    }
    // The remark can always be written by hand.
    actions.push(MenuAction::Edit);
    if !session.buffer().is_empty() {
        actions.extend([MenuAction::Clear, MenuAction::Save]);
    }

    actions.push(MenuAction::Quit);
    actions
}

pub async fn execute(ctx: &AppContext) -> Result<()> {
    // Credentials and documents are checked before the first prompt.
    let provider = ctx.provider()?;
    let library = ctx.library();
    let guidelines = library.guidelines()?.clone();
    let generator = ctx.generator(provider, guidelines);

    let theme = ColorfulTheme::default();
    let mut session = Session::new();

    loop {
        print_status(&session);

        let actions = menu(&session);
        let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();
        let choice = Select::with_theme(&theme)
            .with_prompt("What next?")
            .items(&labels)
            .default(0)
            .interact()?;

        match actions[choice] {
            MenuAction::Select => {
                if let Some(selection) = choose_selection(&theme, &library, session.selection())? {
                    session.select(selection);
                }
            }
            MenuAction::Generate => {
                let (key, standard, counts) = session.begin_generation()?;
                println!("Generating {} ...", CacheKey::new(key.clone(), counts));
                let result = generator.request_sentences(&key, &standard, counts).await;
                session.finish_generation(result)?;
                if let Some(warning) = session.warning() {
                    eprintln!("Warning: {warning}");
                }
            }
            MenuAction::Pick => pick_sentences(&theme, &mut session)?,
            MenuAction::Edit => {
                let edited: String = Input::with_theme(&theme)
                    .with_prompt("Remark")
                    .with_initial_text(session.summary())
                    .allow_empty(true)
                    .interact_text()?;
                session.replace_summary(&edited);
            }
            MenuAction::Clear => {
                if Confirm::with_theme(&theme)
                    .with_prompt("Clear the remark and start over?")
                    .default(false)
                    .interact()?
                {
                    session.clear_all();
                }
            }
            MenuAction::Save => {
                if let Err(e) = save_summary(&theme, &session) {
                    eprintln!("Error: {e:#}");
                }
            }
            MenuAction::Quit => break,
        }
    }

    let summary = session.summary();
    if !summary.is_empty() {
        println!("\n{summary}");
    }
    Ok(())
}

fn print_status(session: &Session) {
    println!();
    if let Some(selection) = session.selection() {
        let code = selection
            .standard
            .as_ref()
            .map(|s| s.code())
            .unwrap_or("-");
        println!(
            "[{}] {} {} / {} / {} (상 {}, 중 {}, 하 {})",
            session.phase(),
            selection.grade,
            selection.subject,
            selection.domain.as_deref().unwrap_or("-"),
            code,
            selection.counts.high,
            selection.counts.mid,
            selection.counts.low,
        );
    }
    if let Some(displayed) = session.displayed() {
        println!("{}", describe_source(displayed));
        print!("{}", render_sentences(&displayed.sentences));
    }
    let summary = session.summary();
    if !summary.is_empty() {
        println!("Remark: {summary}");
    }
}

fn select_item(
    theme: &ColorfulTheme,
    prompt: &str,
    items: &[&str],
    previous: Option<&str>,
) -> Result<usize> {
    let default = previous
        .and_then(|p| items.iter().position(|item| *item == p))
        .unwrap_or(0);
    Ok(Select::with_theme(theme)
        .with_prompt(prompt)
        .items(items)
        .default(default)
        .interact()?)
}

/// Walk grade → subject → domain → standard → counts.
///
/// Returns `None` when the chosen band, subject or domain has nothing to
/// offer; the reason is printed as a warning.
fn choose_selection(
    theme: &ColorfulTheme,
    library: &CurriculumLibrary,
    previous: Option<&Selection>,
) -> Result<Option<Selection>> {
    let grade_labels: Vec<String> = Grade::ALL.iter().map(|g| g.to_string()).collect();
    let grade_labels: Vec<&str> = grade_labels.iter().map(String::as_str).collect();
    let previous_grade = previous.map(|p| p.grade.to_string());
    let grade = Grade::ALL[select_item(theme, "Grade", &grade_labels, previous_grade.as_deref())?];

    let index = match library.band(grade.band()) {
        Ok(index) => index,
        Err(e) => {
            eprintln!("Warning: {e}");
            return Ok(None);
        }
    };

    let subjects: Vec<&str> = index.subjects().iter().map(|s| s.name.as_str()).collect();
    if subjects.is_empty() {
        eprintln!("Warning: no subjects found for {grade}");
        return Ok(None);
    }
    let subject = subjects[select_item(
        theme,
        "Subject",
        &subjects,
        previous.map(|p| p.subject.as_str()),
    )?];

    let domains = index.domains(subject);
    if domains.is_empty() {
        eprintln!("Warning: no domains found for {grade} {subject}");
        return Ok(None);
    }
    let domain = domains[select_item(
        theme,
        "Domain",
        &domains,
        previous.and_then(|p| p.domain.as_deref()),
    )?];

    let standards = index.standards(subject, domain);
    if standards.is_empty() {
        eprintln!("Warning: no achievement standards found for {grade} {subject} / {domain}");
        return Ok(None);
    }
    let standard_labels: Vec<&str> = standards.iter().map(|s| s.standard.as_str()).collect();
    let previous_standard = previous
        .and_then(|p| p.standard.as_ref())
        .map(|s| s.standard.as_str());
    let standard = standards[select_item(
        theme,
        "Achievement standard",
        &standard_labels,
        previous_standard,
    )?]
    .clone();

    let previous_counts = previous.map(|p| p.counts).unwrap_or_default();
    let counts = SentenceCounts::new(
        ask_count(theme, Tier::High, previous_counts.high)?,
        ask_count(theme, Tier::Mid, previous_counts.mid)?,
        ask_count(theme, Tier::Low, previous_counts.low)?,
    )?;

    Ok(Some(Selection {
        grade,
        subject: subject.to_string(),
        domain: Some(domain.to_string()),
        standard: Some(standard),
        counts,
    }))
}

fn ask_count(theme: &ColorfulTheme, tier: Tier, default: u32) -> Result<u32> {
    Ok(Input::<u32>::with_theme(theme)
        .with_prompt(format!("Sentences for {tier}"))
        .default(default)
        .validate_with(|value: &u32| -> Result<(), String> {
            if (MIN_SENTENCES_PER_TIER..=MAX_SENTENCES_PER_TIER).contains(value) {
                Ok(())
            } else {
                Err(format!(
                    "enter a number between {MIN_SENTENCES_PER_TIER} and {MAX_SENTENCES_PER_TIER}"
                ))
            }
        })
        .interact_text()?)
}

/// Every displayed sentence with its tier and position, labelled for a picker.
fn sentence_choices(sentences: &SentenceSet) -> Vec<(Tier, usize, String)> {
    Tier::ALL
        .iter()
        .flat_map(|&tier| {
            sentences
                .get(tier)
                .iter()
                .enumerate()
                .map(move |(i, s)| (tier, i, format!("[{tier}] {s}")))
        })
        .collect()
}

fn pick_sentences(theme: &ColorfulTheme, session: &mut Session) -> Result<()> {
    let Some(displayed) = session.displayed() else {
        return Ok(());
    };
    let choices = sentence_choices(&displayed.sentences);
    if choices.is_empty() {
        return Ok(());
    }

    let labels: Vec<&str> = choices.iter().map(|(_, _, label)| label.as_str()).collect();
    let picked = MultiSelect::with_theme(theme)
        .with_prompt("Sentences to add (space toggles, enter confirms)")
        .items(&labels)
        .interact()?;

    for i in picked {
        let (tier, index, _) = &choices[i];
        session.pick(*tier, *index)?;
    }
    Ok(())
}

fn default_summary_file(now: NaiveDateTime) -> String {
    format!("remark-{}.txt", now.format("%Y%m%d-%H%M%S"))
}

fn save_summary(theme: &ColorfulTheme, session: &Session) -> Result<()> {
    let path: String = Input::with_theme(theme)
        .with_prompt("Save to")
        .default(default_summary_file(Local::now().naive_local()))
        .interact_text()?;
    std::fs::write(&path, format!("{}\n", session.summary()))
        .with_context(|| format!("failed to write {path}"))?;
    println!("Saved remark to {path}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pyeongeo_core::model::{AchievementStandard, TierDescriptions};
    use pyeongeo_core::results::{GeneratedSentences, SentenceSource};

    fn selection() -> Selection {
        Selection {
            domain: Some("수와 연산".into()),
            standard: Some(AchievementStandard {
                standard: "[4수01-01] 큰 수를 읽고 쓴다.".into(),
                levels: TierDescriptions {
                    high: "a".into(),
                    mid: "b".into(),
                    low: "c".into(),
                },
            }),
            ..Selection::new(Grade::new(3).unwrap(), "수학")
        }
    }

    fn sentences() -> SentenceSet {
        SentenceSet {
            high: vec!["자릿값을 설명함.".into()],
            mid: vec!["큰 수를 읽음.".into(), "수를 씀.".into()],
            low: vec![],
        }
    }

    #[test]
    fn menu_follows_phase() {
        let mut session = Session::new();
        assert_eq!(
            menu(&session),
            [MenuAction::Select, MenuAction::Edit, MenuAction::Quit]
        );

        session.select(selection());
        assert_eq!(
            menu(&session),
            [
                MenuAction::Select,
                MenuAction::Generate,
                MenuAction::Edit,
                MenuAction::Quit
            ]
        );

        session.begin_generation().unwrap();
        session
            .finish_generation(Ok(GeneratedSentences {
                cache_key: "3학년_수학_4수01-01_2_2_2".into(),
                sentences: sentences(),
                source: SentenceSource::Cached,
                token_usage: None,
            }))
            .unwrap();
        session.pick(Tier::Mid, 1).unwrap();

        assert_eq!(
            menu(&session),
            [
                MenuAction::Select,
                MenuAction::Generate,
                MenuAction::Pick,
                MenuAction::Edit,
                MenuAction::Clear,
                MenuAction::Save,
                MenuAction::Quit,
            ]
        );

        session.clear_all();
        assert_eq!(
            menu(&session),
            [MenuAction::Select, MenuAction::Edit, MenuAction::Quit]
        );
    }

    #[test]
    fn remark_can_be_written_from_scratch() {
        let mut session = Session::new();
        assert!(menu(&session).contains(&MenuAction::Edit));

        session.replace_summary("수와 연산 단원에서 꾸준히 노력함.");
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(
            menu(&session),
            [
                MenuAction::Select,
                MenuAction::Edit,
                MenuAction::Clear,
                MenuAction::Save,
                MenuAction::Quit
            ]
        );
    }

    #[test]
    fn selection_without_standard_cannot_generate() {
        let mut session = Session::new();
        session.select(Selection::new(Grade::new(1).unwrap(), "국어"));
        assert!(!menu(&session).contains(&MenuAction::Generate));
    }

    #[test]
    fn choices_cover_every_sentence_in_tier_order() {
        let choices = sentence_choices(&sentences());
        let positions: Vec<(Tier, usize)> = choices.iter().map(|(t, i, _)| (*t, *i)).collect();
        assert_eq!(positions, [(Tier::High, 0), (Tier::Mid, 0), (Tier::Mid, 1)]);
        assert_eq!(choices[2].2, "[중] 수를 씀.");
    }

    #[test]
    fn summary_file_name_uses_timestamp() {
        let now = NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap();
        assert_eq!(default_summary_file(now), "remark-20260302-090500.txt");
    }
}
