//! Chat command - interactive prompt generation.
//!
//! The main thread owns the terminal. A reader thread forwards input lines
//! and the generation worker forwards results, both over one channel, so the
//! main thread never blocks on the network. Ctrl-C closes the session like
//! `:quit` does, so a service started here is stopped.

use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread;

use promptcraft_ai::{display_text, GenerationCompleted, GenerationWorker, PromptCraftConfig};
use tokio::runtime::Runtime;

/// Events delivered to the interactive thread.
enum ChatEvent {
    Input(String),
    Generated(GenerationCompleted),
    Closed,
}

impl From<GenerationCompleted> for ChatEvent {
    fn from(completed: GenerationCompleted) -> Self {
        Self::Generated(completed)
    }
}

pub(crate) fn run(config: PromptCraftConfig, runtime: &Runtime) -> miette::Result<()> {
    let controller = Arc::new(super::controller(config)?);

    let model = controller.config().model.clone();
    let status = runtime.block_on(super::until_interrupted(async {
        super::start_service(&controller).await?;
        Ok::<_, miette::Report>(controller.ensure_model_loaded(&model).await)
    }))?;
    if !status.permits_generation() {
        println!("Warning: model '{}' is not available ({}).", model, status);
    }

    let (tx, rx) = mpsc::channel::<ChatEvent>();
    let worker = GenerationWorker::new(
        Arc::clone(&controller),
        runtime.handle().clone(),
        tx.clone(),
    );
    spawn_reader(tx.clone());
    runtime.spawn(async move {
        super::interrupted().await;
        let _ = tx.send(ChatEvent::Closed);
    });

    println!("PromptCraft ({})", model);
    println!("Describe a story idea and press Enter. Type :quit to exit.");
    show_ready();

    while let Ok(event) = rx.recv() {
        match event {
            ChatEvent::Input(line) => match worker.submit(&line) {
                Ok(_) => println!("Generating prompt..."),
                Err(e) => {
                    println!("{}", e);
                    show_ready();
                }
            },
            ChatEvent::Generated(done) => {
                println!();
                println!("{}", display_text(&done.result).trim());
                println!();
                show_ready();
            }
            ChatEvent::Closed => break,
        }
    }

    controller.shutdown();
    Ok(())
}

fn spawn_reader(tx: Sender<ChatEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let trimmed = line.trim();
            if trimmed == ":quit" || trimmed == ":q" {
                break;
            }
            if tx.send(ChatEvent::Input(line)).is_err() {
                return;
            }
        }
        let _ = tx.send(ChatEvent::Closed);
    });
}

fn show_ready() {
    print!("> ");
    let _ = io::stdout().flush();
}
