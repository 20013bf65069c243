use crate::application::{JournalApp, TextRenderer};
use crate::entities::Mood;
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::{self, Write};

#[derive(Parser)]
#[command(name = "thought-tracker")]
#[command(about = "Record mood-tagged thoughts and read monthly reports")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record a thought dated today
    Add {
        /// How you feel: happy, sad or angry
        #[arg(short, long)]
        mood: Mood,
        /// What's on your mind
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Show past thoughts, newest first (default)
    History {
        /// Only show this many entries
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show monthly statistics and summaries
    Report,
}

impl Cli {
    pub fn run() -> anyhow::Result<()> {
        let cli = Self::parse();
        let app = JournalApp::new()?;
        let renderer = TextRenderer::new();
        let mut out = io::stdout().lock();

        match cli.command {
            Some(Commands::Add { mood, text }) => {
                let text = text.join(" ");
                match app.record_thought(mood, &text) {
                    Ok(entry) => {
                        writeln!(
                            out,
                            "Thought for {} submitted successfully! 🎉",
                            entry.date.format("%d/%m/%Y")
                        )?;
                    }
                    Err(e) if e.is_validation() => {
                        writeln!(io::stderr(), "Please enter your thoughts before submitting.")?;
                    }
                    Err(e) => return Err(e).context("Failed to record thought"),
                }
            }
            Some(Commands::History { limit }) => {
                let entries = app.history(limit)?;
                renderer.render_history(&mut out, &entries)?;
            }
            Some(Commands::Report) => {
                let reports = app.monthly_reports()?;
                renderer.render_reports(&mut out, &reports)?;
            }
            None => {
                let entries = app.history(None)?;
                renderer.render_history(&mut out, &entries)?;
            }
        }

        out.flush()?;
        Ok(())
    }
}
