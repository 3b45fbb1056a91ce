//! Model management commands.

use indicatif::{ProgressBar, ProgressStyle};
use promptcraft_ai::{ModelStatus, PromptCraftConfig, PullProgress};

/// List models installed on the server.
pub(crate) async fn list(config: PromptCraftConfig) -> miette::Result<()> {
    let controller = super::controller(config)?;
    super::start_service(&controller).await?;

    let models = controller
        .client()
        .list_models()
        .await
        .map_err(|e| miette::miette!("Failed to list models: {}", e))?;

    if models.is_empty() {
        println!("No models installed.");
        println!();
        println!("To install the default model, run:");
        println!("  promptcraft model pull");
        controller.shutdown();
        return Ok(());
    }

    println!("Installed models:");
    for model in models {
        match model.size {
            Some(size) => println!("  - {} ({:.1} MB)", model.name, size as f64 / 1_000_000.0),
            None => println!("  - {}", model.name),
        }
    }

    controller.shutdown();
    Ok(())
}

/// Pull a model, showing download progress.
pub(crate) async fn pull(config: PromptCraftConfig, name: Option<&str>) -> miette::Result<()> {
    let controller = super::controller(config)?;
    super::start_service(&controller).await?;

    let model = name.unwrap_or(&controller.config().model).to_string();
    println!("Checking model: {}", model);

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .map_err(|e| miette::miette!("Invalid progress template: {}", e))?,
    );

    let status = controller
        .ensure_model_loaded_with_progress(&model, |progress| update_progress(&pb, progress))
        .await;
    pb.finish_and_clear();
    controller.shutdown();

    match status {
        ModelStatus::AlreadyPresent => {
            println!("Model '{}' is already installed.", model);
            Ok(())
        }
        ModelStatus::FreshlyFetched => {
            println!("Model '{}' pulled successfully!", model);
            Ok(())
        }
        other => Err(miette::miette!("Model '{}' unavailable: {}", model, other)),
    }
}

fn update_progress(pb: &ProgressBar, progress: &PullProgress) {
    let status = progress.status.as_deref().unwrap_or("pulling");

    match (progress.completed, progress.total) {
        (Some(done), Some(total)) if total > 0 => {
            let pct = done as f64 / total as f64 * 100.0;
            let total_mb = total as f64 / 1_000_000.0;
            pb.set_message(format!("{} {:>5.1}% of {:.1} MB", status, pct, total_mb));
        }
        _ => pb.set_message(status.to_string()),
    }
    pb.tick();
}
