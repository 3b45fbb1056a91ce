//! Info command - show the active configuration.

use promptcraft_ai::{ollama_paths, PromptCraftConfig};

pub(crate) fn run(config: &PromptCraftConfig) -> miette::Result<()> {
    println!("PromptCraft");
    println!("===========");
    println!();
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!();

    println!("Service:");
    println!("  Endpoint:      {}", config.base_url);
    println!("  Model:         {}", config.model);
    println!("  Process match: {}", config.process_name);
    println!(
        "  Startup:       {} checks, {:?} apart",
        config.readiness_attempts, config.readiness_interval
    );
    println!();

    match ollama_paths::locate_ollama(config.ollama_bin.as_deref()) {
        Some(path) => println!("Ollama binary: {}", path.display()),
        None => println!("Ollama binary: not found (set PROMPTCRAFT_OLLAMA_BIN)"),
    }
    println!();

    let sampling = &config.sampling;
    println!("Sampling:");
    println!("  num_predict: {}", sampling.num_predict);
    println!("  temperature: {}", sampling.temperature);
    println!("  top_k:       {}", sampling.top_k);
    println!("  top_p:       {}", sampling.top_p);

    Ok(())
}
