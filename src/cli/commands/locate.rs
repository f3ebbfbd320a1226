//! `cardsync locate`: resolve a card through the read-through cache.

use crate::cache::CacheResolver;
use crate::cli::args::LocateArgs;
use crate::error::{CardsyncError, Result};
use crate::record::{Card, Record};
use crate::remote::{HttpSource, RemoteSource};
use crate::store::{JsonStore, RecordStore};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandContext, CommandResult};

/// Exit code when neither the store nor the remote knows the card.
pub const EXIT_NOT_FOUND: i32 = 2;

/// The locate command implementation.
pub struct LocateCommand {
    context: CommandContext,
    args: LocateArgs,
}

impl LocateCommand {
    pub fn new(context: CommandContext, args: LocateArgs) -> Self {
        Self { context, args }
    }

    /// Run against an explicit store and remote.
    pub fn run_with<S, F>(&self, store: S, remote: F, ui: &mut dyn UserInterface) -> Result<CommandResult>
    where
        S: RecordStore<Card>,
        F: RemoteSource<Card>,
    {
        let resolver = CacheResolver::new(store, remote, self.context.components.resolver.clone());

        let card = match resolver.locate(&self.args.filters(), self.args.image.as_deref()) {
            Ok(card) => card,
            Err(CardsyncError::NotFound { query }) => {
                ui.error(&format!("No card matches {}", query));
                return Ok(CommandResult::failure(EXIT_NOT_FOUND));
            }
            Err(e) => return Err(e),
        };

        if ui.output_mode().is_verbose() {
            let stats = resolver.stats();
            ui.message(&format!(
                "cache: {} hit, {} miss, {} fetch",
                stats.hits, stats.misses, stats.fetches
            ));
        }

        if self.args.json {
            ui.data(&serde_json::to_string_pretty(&card).map_err(anyhow::Error::from)?);
        } else {
            for line in describe(&card, self.args.image.as_deref()) {
                ui.data(&line);
            }
        }

        Ok(CommandResult::success())
    }
}

impl Command for LocateCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let store = JsonStore::<Card>::new(self.context.store_dir());
        let remote: HttpSource = self.context.http_source()?;
        self.run_with(store, remote, ui)
    }
}

/// Human-readable summary lines for a card.
fn describe(card: &Card, image: Option<&str>) -> Vec<String> {
    let mut lines = vec![
        match &card.mana_cost {
            Some(cost) if !cost.is_empty() => format!("{} {}", card.name, cost),
            _ => card.name.clone(),
        },
        format!(
            "{} #{} ({}) [{}]",
            card.set.to_uppercase(),
            card.collector_number,
            card.lang,
            card.key()
        ),
    ];
    if let Some(type_line) = &card.type_line {
        lines.push(type_line.clone());
    }
    if let Some(text) = &card.oracle_text {
        lines.push(text.clone());
    }
    if let Some(attachment) = image.and_then(|kind| card.attachment(kind)) {
        lines.push(attachment.uri.clone());
    }
    lines
}
