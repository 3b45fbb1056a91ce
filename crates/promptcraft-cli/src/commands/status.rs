//! Status command - report on the local service without changing it.

use promptcraft_ai::PromptCraftConfig;

pub(crate) async fn run(config: PromptCraftConfig) -> miette::Result<()> {
    let controller = super::controller(config)?;
    let status = controller.status().await;
    let config = controller.config();

    println!("Ollama process:  {}", running_label(status.process_active));
    println!(
        "Endpoint:        {} ({})",
        config.base_url,
        if status.reachable { "reachable" } else { "unreachable" }
    );

    let model = match status.model_present {
        Some(true) => "installed",
        Some(false) => "not installed",
        None => "unknown",
    };
    println!("Model:           {} ({})", config.model, model);

    Ok(())
}

fn running_label(value: bool) -> &'static str {
    if value {
        "running"
    } else {
        "not running"
    }
}
