//! The `pyeongeo list-models` command.

use anyhow::Result;

use pyeongeo_providers::create_provider;

use crate::context::AppContext;

pub fn execute(ctx: &AppContext, provider_filter: Option<String>) -> Result<()> {
    let mut names: Vec<&String> = ctx.config.providers.keys().collect();
    names.sort();

    let mut found_any = false;

    for name in names {
        if provider_filter.as_ref().is_some_and(|filter| filter != name) {
            continue;
        }

        let provider = create_provider(name, &ctx.config.providers[name])?;
        let models = provider.available_models();

        if !models.is_empty() {
            found_any = true;
            let marker = if *name == ctx.config.default_provider {
                " (default)"
            } else {
                ""
            };
            println!("Provider: {name}{marker}");
            for model in &models {
                println!(
                    "  {} — {} ({}K context)",
                    model.id,
                    model.name,
                    model.max_context / 1000,
                );
            }
            println!();
        }
    }

    if !found_any {
        println!("No providers configured. Run `pyeongeo init` or set GEMINI_API_KEY.");
    }

    Ok(())
}
