//! Cache command implementation.
//!
//! Provides `cardsync cache list`, `cardsync cache stats`, and
//! `cardsync cache clear`.

use chrono::Utc;
use clap::{Args, Subcommand, ValueEnum};
use serde_json::json;

use crate::cache::validation::attachment_counts;
use crate::cache::{format_duration, validate_attachment, ValidationResult};
use crate::error::Result;
use crate::record::{Card, Record, Symbol};
use crate::store::{JsonStore, RecordStore};
use crate::ui::{Table, UserInterface};

use super::dispatcher::{Command, CommandContext, CommandResult};

/// Arguments for the cache command.
#[derive(Debug, Clone, Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheSubcommand,
}

/// A store table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TableName {
    Cards,
    Symbols,
}

/// Cache subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum CacheSubcommand {
    /// List stored records.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show store statistics.
    Stats,
    /// Remove stored records.
    Clear {
        /// Only clear this table.
        #[arg(long, value_enum)]
        table: Option<TableName>,
        /// Don't prompt for confirmation.
        #[arg(short, long)]
        force: bool,
    },
}

/// The cache command implementation.
pub struct CacheCommand {
    cards: JsonStore<Card>,
    symbols: JsonStore<Symbol>,
    args: CacheArgs,
}

impl CacheCommand {
    pub fn new(context: CommandContext, args: CacheArgs) -> Self {
        Self {
            cards: JsonStore::new(context.store_dir()),
            symbols: JsonStore::new(context.store_dir()),
            args,
        }
    }
}

impl Command for CacheCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &self.args.command {
            CacheSubcommand::List { json } => self.list(*json, ui)?,
            CacheSubcommand::Stats => self.stats(ui)?,
            CacheSubcommand::Clear { table, force } => self.clear(*table, *force, ui)?,
        }
        Ok(CommandResult::success())
    }
}

impl CacheCommand {
    fn list(&self, json: bool, ui: &mut dyn UserInterface) -> Result<()> {
        let cards = self.cards.list()?;
        let symbols = self.symbols.list()?;

        if json {
            let doc = json!({ "cards": cards, "symbols": symbols });
            ui.data(&serde_json::to_string_pretty(&doc).map_err(anyhow::Error::from)?);
            return Ok(());
        }

        if cards.is_empty() && symbols.is_empty() {
            ui.message("Store is empty");
            return Ok(());
        }

        let mut table = Table::new(&["Table", "Key", "Name", "Attachments"]);
        for card in &cards {
            table.push_row([
                Card::TABLE,
                card.key(),
                card.name.as_str(),
                attachment_status(card).as_str(),
            ]);
        }
        for symbol in &symbols {
            table.push_row([
                Symbol::TABLE,
                symbol.key(),
                symbol.english.as_str(),
                attachment_status(symbol).as_str(),
            ]);
        }
        ui.data(&table.render());
        Ok(())
    }

    fn stats(&self, ui: &mut dyn UserInterface) -> Result<()> {
        let now = Utc::now();
        let cards = self.cards.list()?;
        let symbols = self.symbols.list()?;

        ui.show_header("Store Statistics");
        let (fresh, expired) = attachment_counts(&cards, now);
        ui.message(&format!(
            "  Cards: {} ({} fresh, {} expired attachments, {} bytes)",
            cards.len(),
            fresh,
            expired,
            self.cards.size_bytes()?
        ));
        let (fresh, expired) = attachment_counts(&symbols, now);
        ui.message(&format!(
            "  Symbols: {} ({} fresh, {} expired attachments, {} bytes)",
            symbols.len(),
            fresh,
            expired,
            self.symbols.size_bytes()?
        ));
        ui.message(&format!("  Location: {}", self.cards.root().display()));
        Ok(())
    }

    fn clear(&self, table: Option<TableName>, force: bool, ui: &mut dyn UserInterface) -> Result<()> {
        let clear_cards = table.is_none_or(|t| t == TableName::Cards);
        let clear_symbols = table.is_none_or(|t| t == TableName::Symbols);

        let count = if clear_cards { self.cards.list()?.len() } else { 0 }
            + if clear_symbols { self.symbols.list()?.len() } else { 0 };
        if count == 0 {
            ui.message("Store is already empty");
            return Ok(());
        }

        if !force && ui.is_interactive() && !ui.confirm(&format!("Clear {} stored records?", count), false)? {
            ui.message("Cancelled");
            return Ok(());
        }

        let mut cleared = 0;
        if clear_cards {
            cleared += self.cards.clear()?;
        }
        if clear_symbols {
            cleared += self.symbols.clear()?;
        }
        tracing::info!(cleared, "store cleared");
        ui.success(&format!("Cleared {} records", cleared));
        Ok(())
    }
}

/// `normal: 6d, large: expired` style summary of a record's attachments.
fn attachment_status<R: Record>(record: &R) -> String {
    let now = Utc::now();
    let parts: Vec<String> = record
        .attachments()
        .iter()
        .map(|(kind, attachment)| {
            let state = match validate_attachment(record, kind, now) {
                ValidationResult::Fresh => {
                    format_duration(chrono::Duration::seconds(attachment.remaining_ttl(now)))
                }
                ValidationResult::Expired => "expired".to_string(),
                ValidationResult::NeverCached | ValidationResult::Missing => "uncached".to_string(),
            };
            format!("{}: {}", kind, state)
        })
        .collect();

    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Attachment;
    use crate::config::CardsyncConfig;
    use crate::ui::MockUI;
    use chrono::Duration;
    use tempfile::TempDir;

    fn setup(subcommand: CacheSubcommand) -> (TempDir, CacheCommand) {
        let temp = TempDir::new().unwrap();
        let mut components = CardsyncConfig::default().validate().unwrap();
        components.store_dir = temp.path().to_path_buf();
        let cmd = CacheCommand::new(
            CommandContext::from_components(components),
            CacheArgs {
                command: subcommand,
            },
        );
        (temp, cmd)
    }

    fn seed(cmd: &CacheCommand) {
        let mut opt = Card::new("c-opt", "Opt", "xln", "65");
        opt.attachments.insert(
            "normal".into(),
            Attachment::new("n.jpg").stamped(Utc::now(), 86_400 * 7),
        );
        opt.attachments.insert(
            "large".into(),
            Attachment::new("l.jpg").stamped(Utc::now() - Duration::days(9), 86_400 * 7),
        );
        cmd.cards.upsert(&opt).unwrap();
        cmd.symbols.upsert(&Symbol::new("{T}", "tap this permanent")).unwrap();
    }

    #[test]
    fn list_empty_store() {
        let (_temp, cmd) = setup(CacheSubcommand::List { json: false });
        let mut ui = MockUI::new();

        cmd.execute(&mut ui).unwrap();
        assert_eq!(ui.messages(), ["Store is empty"]);
    }

    #[test]
    fn list_renders_both_tables() {
        let (_temp, cmd) = setup(CacheSubcommand::List { json: false });
        seed(&cmd);
        let mut ui = MockUI::new();

        cmd.execute(&mut ui).unwrap();

        let rendered = &ui.data_lines()[0];
        assert!(rendered.contains("c-opt"));
        assert!(rendered.contains("large: expired"));
        assert!(rendered.contains("normal: 6d"));
        assert!(rendered.contains("tap this permanent"));
    }

    #[test]
    fn list_json_groups_by_table() {
        let (_temp, cmd) = setup(CacheSubcommand::List { json: true });
        seed(&cmd);
        let mut ui = MockUI::new();

        cmd.execute(&mut ui).unwrap();

        let doc: serde_json::Value = serde_json::from_str(&ui.data_lines()[0]).unwrap();
        assert_eq!(doc["cards"][0]["id"], "c-opt");
        assert_eq!(doc["symbols"][0]["symbol"], "{T}");
    }

    #[test]
    fn stats_counts_fresh_and_expired() {
        let (_temp, cmd) = setup(CacheSubcommand::Stats);
        seed(&cmd);
        let mut ui = MockUI::new();

        cmd.execute(&mut ui).unwrap();

        assert_eq!(ui.headers(), ["Store Statistics"]);
        assert!(ui
            .messages()
            .iter()
            .any(|m| m.starts_with("  Cards: 1 (1 fresh, 1 expired attachments")));
        assert!(ui.messages().iter().any(|m| m.starts_with("  Symbols: 1 (0 fresh")));
    }

    #[test]
    fn clear_one_table_with_force() {
        let (_temp, cmd) = setup(CacheSubcommand::Clear {
            table: Some(TableName::Symbols),
            force: true,
        });
        seed(&cmd);
        let mut ui = MockUI::new();

        cmd.execute(&mut ui).unwrap();

        assert_eq!(ui.successes(), ["Cleared 1 records"]);
        assert!(cmd.symbols.list().unwrap().is_empty());
        assert_eq!(cmd.cards.list().unwrap().len(), 1);
    }

    #[test]
    fn interactive_clear_can_be_cancelled() {
        let (_temp, cmd) = setup(CacheSubcommand::Clear {
            table: None,
            force: false,
        });
        seed(&cmd);
        let mut ui = MockUI::new();
        ui.set_interactive(true);
        ui.queue_confirms([false]);

        cmd.execute(&mut ui).unwrap();

        assert_eq!(ui.confirms_asked(), ["Clear 2 stored records?"]);
        assert_eq!(ui.messages(), ["Cancelled"]);
        assert_eq!(cmd.cards.list().unwrap().len(), 1);
    }

    #[test]
    fn clear_empty_store_is_a_no_op() {
        let (_temp, cmd) = setup(CacheSubcommand::Clear {
            table: None,
            force: true,
        });
        let mut ui = MockUI::new();

        cmd.execute(&mut ui).unwrap();
        assert_eq!(ui.messages(), ["Store is already empty"]);
    }
}
