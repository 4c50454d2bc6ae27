mod classify;
mod cli;
mod edit;
mod pipeline;
mod platform;
mod profile;

use std::fmt::Display;

use clap::Parser;
use cli::{Cli, Command};
use tracing_subscriber::EnvFilter;

use pipeline::{Pipeline, PipelineConfig, PipelineError};
use platform::command::SystemRunner;
use platform::x11::{X11WindowControl, XclipClipboard};
use profile::Settings;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Edit(args) => {
            let settings = Settings::resolve(args);
            let window = X11WindowControl::connect(SystemRunner)
                .unwrap_or_else(|e| fail("edit", PipelineError::Identify(e)));

            let pipeline = Pipeline::new(
                window,
                XclipClipboard::new(SystemRunner),
                settings.editor,
                settings.pipeline,
            );

            match pipeline.run().await {
                Ok(summary) => tracing::info!(
                    window = %summary.target.window,
                    extension = %summary.extension,
                    bytes = summary.bytes,
                    pasted = summary.sent_trailing_keys,
                    "done"
                ),
                Err(e) => fail("edit", e),
            }
        }
        Command::Classify {
            executable,
            title,
            rules,
        } => {
            let rules = profile::rule_table(rules);
            println!("{}", classify::classify(&executable, &title, &rules));
        }
        Command::Inspect { rules } => {
            let window = X11WindowControl::connect(SystemRunner)
                .unwrap_or_else(|e| fail("inspect", e));
            let target = pipeline::identify(&window)
                .await
                .unwrap_or_else(|e| fail("inspect", e));
            let config = PipelineConfig {
                rules: profile::rule_table(rules),
                ..PipelineConfig::default()
            };

            println!("window:     {}", target.window);
            println!("pid:        {}", target.pid);
            println!("executable: {}", target.executable);
            println!("title:      {:?}", target.title);
            println!("extension:  {}", config.extension_for(&target));
        }
    }
}

/// Report a fatal error and exit non-zero.
fn fail(command: &str, e: impl Display) -> ! {
    tracing::debug!(error = %e, "{command} failed");
    eprintln!("{}", diagnostic(command, &e));
    std::process::exit(1);
}

/// The single stderr line for a fatal error.
fn diagnostic(command: &str, e: &dyn Display) -> String {
    let message = e.to_string();
    let message: Vec<&str> = message.split_whitespace().collect();
    format!("diva {command}: {}", message.join(" "))
}
