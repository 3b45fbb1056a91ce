//! Generate command - one prompt from one description.

use promptcraft_ai::{prompt, PromptCraftConfig};

pub(crate) async fn run(
    config: PromptCraftConfig,
    description: &str,
    offline: bool,
) -> miette::Result<()> {
    if prompt::is_blank(description) {
        return Err(miette::miette!("Please enter a description."));
    }

    if offline {
        println!("{}", prompt::offline_prompt(description));
        return Ok(());
    }

    let controller = super::controller(config)?;
    super::start_service(&controller).await?;

    let model = controller.config().model.clone();
    let result = controller.generate(description, &model).await;
    controller.shutdown();

    match result {
        Ok(text) => {
            println!("{}", text.trim());
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}
