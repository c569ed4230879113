use anyhow::{Context, Result};
use clap::Parser;
use pairsim_core::{Catalog, StimulusItem, Trial};
use pairsim_experiment::{
    ExperimentConfig, JsonLinesSink, ResponseSink, SessionEvent, SessionId, SessionStateMachine,
    TransitionError, generate_sequence,
};
use pairsim_timing::{HighPrecisionTimer, Timer};
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "pairsim", about = "Rate the similarity of product pairs on a 0-100 scale")]
pub struct Cli {
    /// Stimulus catalog JSON file.
    #[arg(long)]
    pub catalog: PathBuf,
    /// Regular comparisons per session (one catch trial is added).
    #[arg(long, default_value_t = ExperimentConfig::default().n_pairs)]
    pub pairs: usize,
    /// Seed for a reproducible trial order.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Where responses are written as JSON lines. Defaults to `pairsim_<session>.jsonl`.
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Session identifier written with every response. Random when omitted.
    #[arg(long)]
    pub session_id: Option<String>,
}

impl Cli {
    pub fn config(&self) -> ExperimentConfig {
        ExperimentConfig {
            n_pairs: self.pairs,
            seed: self.seed,
            session_id: self.session_id.clone(),
            ..ExperimentConfig::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Abandoned,
}

pub struct App<T: Timer, S: ResponseSink> {
    session: SessionStateMachine<T, S>,
}

impl App<HighPrecisionTimer, Box<dyn ResponseSink>> {
    /// Loads the catalog and generates the session. Any failure here is a
    /// configuration problem and no session is created.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config = cli.config();
        config.validate()?;

        // the catalog error already names the file
        let catalog = Catalog::from_path(&cli.catalog).context("loading stimulus catalog")?;

        let mut rng = config.rng();
        let sequence = generate_sequence(catalog.items(), config.n_pairs, &mut rng)
            .context("generating trial sequence")?;

        let session_id = match &config.session_id {
            Some(id) => SessionId::new(id.clone()),
            None => SessionId::random(&mut rng),
        };

        let output = cli
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("pairsim_{session_id}.jsonl")));
        let file = File::create(&output)
            .with_context(|| format!("creating response file {}", output.display()))?;
        let sink: Box<dyn ResponseSink> = Box::new(JsonLinesSink::new(BufWriter::new(file)));
        info!(path = %output.display(), session = %session_id, "writing responses");

        let session = SessionStateMachine::new(
            session_id,
            sequence,
            config,
            HighPrecisionTimer::new(),
            sink,
        );
        Ok(Self::new(session))
    }
}

impl<T: Timer, S: ResponseSink> App<T, S> {
    pub fn new(session: SessionStateMachine<T, S>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &SessionStateMachine<T, S> {
        &self.session
    }

    /// Runs the session against a line-based terminal. End of input abandons
    /// the session; nothing is written for unanswered trials.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut out: W) -> Result<Outcome> {
        writeln!(out, "=== PRODUCT SIMILARITY STUDY ===")?;
        let (min, max) = self.rating_bounds();
        writeln!(
            out,
            "You will see {} pairs of products. Rate how similar each pair is from {min} (not at all) to {max} (identical).",
            self.session.sequence().len()
        )?;
        writeln!(out, "Press ENTER to start.")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(self.abandon());
        }
        self.session.handle_event(SessionEvent::Start)?;

        while let Some((number, total)) = self.session.trial_progress() {
            if let Some(trial) = self.session.current_trial() {
                render_trial(&mut out, trial, number, total)?;
            }
            write!(out, "Rating ({min}-{max}): ")?;
            out.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                return Ok(self.abandon());
            }
            let event = match parse_input(line.trim()) {
                Some(event) => event,
                None => {
                    writeln!(out, "Please enter a whole number between {min} and {max}.")?;
                    continue;
                }
            };

            match self.session.handle_event(event) {
                Ok(_) => {}
                Err(TransitionError::BackwardNavigation) => {
                    writeln!(out, "Previous answers cannot be changed.")?;
                }
                Err(TransitionError::RatingOutOfRange { min, max, .. }) => {
                    writeln!(out, "Please enter a whole number between {min} and {max}.")?;
                }
                Err(err) => return Err(err.into()),
            }
        }

        writeln!(out, "\nThank you! The session is complete.")?;
        Ok(Outcome::Completed)
    }

    fn rating_bounds(&self) -> (u8, u8) {
        let config = self.session.config();
        (config.rating_min, config.rating_max)
    }

    fn abandon(&self) -> Outcome {
        info!(
            session = %self.session.session_id(),
            progress = ?self.session.trial_progress(),
            "input closed, session abandoned"
        );
        Outcome::Abandoned
    }
}

fn parse_input(text: &str) -> Option<SessionEvent> {
    match text {
        "b" | "back" => Some(SessionEvent::Back),
        _ => text
            .parse::<u8>()
            .ok()
            .map(|rating| SessionEvent::Respond { rating }),
    }
}

fn render_trial<W: Write>(out: &mut W, trial: &Trial, number: usize, total: usize) -> Result<()> {
    writeln!(out, "\n--- Trial {number} of {total} ---")?;
    render_item(out, "LEFT", trial.left())?;
    render_item(out, "RIGHT", trial.right())?;
    Ok(())
}

fn render_item<W: Write>(out: &mut W, side: &str, item: &StimulusItem) -> Result<()> {
    writeln!(out, "[{side}] {} ({})", item.name, item.price)?;
    writeln!(out, "    {}", item.description)?;
    writeln!(out, "    image: {}", item.image)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairsim_core::StimulusId;
    use pairsim_experiment::MemorySink;
    use pairsim_timing::ManualTimer;

    fn app(n_pairs: usize) -> App<ManualTimer, MemorySink> {
        app_with(ExperimentConfig {
            n_pairs,
            seed: Some(4),
            ..ExperimentConfig::default()
        })
    }

    fn app_with(config: ExperimentConfig) -> App<ManualTimer, MemorySink> {
        let items: Vec<StimulusItem> = ["A", "B", "C"]
            .iter()
            .map(|id| {
                StimulusItem::new(
                    StimulusId::new(*id).unwrap(),
                    format!("Mug {id}"),
                    "Ceramic.",
                    "$9.99",
                    format!("{id}.png"),
                )
            })
            .collect();
        let sequence = generate_sequence(&items, config.n_pairs, &mut config.rng()).unwrap();
        App::new(SessionStateMachine::new(
            SessionId::new("cli-test"),
            sequence,
            config,
            ManualTimer::new(),
            MemorySink::new(),
        ))
    }

    #[test]
    fn completes_with_retries_for_bad_input() {
        let mut app = app(3);
        let input = "\n50\nabc\n101\nb\n70\n0\n100\n";
        let mut out = Vec::new();
        let outcome = app.run(input.as_bytes(), &mut out).unwrap();
        assert_eq!(outcome, Outcome::Completed);

        let sink = app.session().sink();
        let ratings: Vec<u8> = sink.records.iter().map(|r| r.rating).collect();
        assert_eq!(ratings, vec![50, 70, 0, 100]);
        assert_eq!(sink.completed.len(), 1);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Trial 4 of 4"));
        assert!(text.contains("Previous answers cannot be changed."));
        assert!(text.contains("between 0 and 100"));
    }

    #[test]
    fn prompts_use_configured_rating_range() {
        let mut app = app_with(ExperimentConfig {
            n_pairs: 1,
            rating_min: 10,
            rating_max: 90,
            seed: Some(4),
            ..ExperimentConfig::default()
        });
        let mut out = Vec::new();
        let outcome = app.run("\nabc\n95\n40\n50\n".as_bytes(), &mut out).unwrap();
        assert_eq!(outcome, Outcome::Completed);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Rating (10-90): "));
        assert_eq!(text.matches("between 10 and 90").count(), 2);
        assert!(!text.contains("between 0 and 100"));
    }

    #[test]
    fn end_of_input_abandons() {
        let mut app = app(3);
        let outcome = app.run("\n20\n".as_bytes(), Vec::new()).unwrap();
        assert_eq!(outcome, Outcome::Abandoned);
        let sink = app.session().sink();
        assert_eq!(sink.records.len(), 1);
        assert!(sink.completed.is_empty());
    }

    #[test]
    fn cli_maps_onto_config() {
        let cli = Cli::parse_from(["pairsim", "--catalog", "c.json", "--pairs", "12", "--seed", "3"]);
        let config = cli.config();
        assert_eq!(config.n_pairs, 12);
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.rating_max, 100);
    }

    #[test]
    fn missing_catalog_is_a_startup_error() {
        let cli = Cli::parse_from(["pairsim", "--catalog", "/nonexistent/catalog.json"]);
        let err = App::from_cli(&cli).err().unwrap();
        let message = format!("{err:#}");
        assert!(message.contains("loading stimulus catalog"));
        assert_eq!(message.matches("/nonexistent/catalog.json").count(), 1);
    }
}
