//! `cardsync symbols`: reconcile the local symbol catalog.

use clap::{Args, Subcommand};

use crate::error::Result;
use crate::reconcile::{PatchPlan, Reconciler};
use crate::record::Symbol;
use crate::remote::RemoteSource;
use crate::store::{JsonStore, RecordStore};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandContext, CommandResult};

/// Arguments for the symbols command.
#[derive(Debug, Clone, Args)]
pub struct SymbolsArgs {
    #[command(subcommand)]
    pub command: SymbolsSubcommand,
}

/// Symbols subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum SymbolsSubcommand {
    /// Report whether the remote catalog differs from the local one.
    Check {
        /// Output the patch as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Bring the local catalog in line with the remote one.
    Sync {
        /// Show what would change without writing.
        #[arg(long)]
        dry_run: bool,
    },
}

/// The symbols command implementation.
pub struct SymbolsCommand {
    context: CommandContext,
    args: SymbolsArgs,
}

impl SymbolsCommand {
    pub fn new(context: CommandContext, args: SymbolsArgs) -> Self {
        Self { context, args }
    }

    /// Run against an explicit store and remote.
    pub fn run_with<S, F>(&self, store: S, remote: F, ui: &mut dyn UserInterface) -> Result<CommandResult>
    where
        S: RecordStore<Symbol>,
        F: RemoteSource<Symbol>,
    {
        let reconciler = Reconciler::new(store, remote, self.context.components.reconcile);

        let mut spinner = ui.start_spinner("Fetching symbol catalog...");
        let plan = match reconciler.compute_update_patch() {
            Ok(plan) => {
                spinner.finish_success(&format!("Fetched {} symbols", plan.remote.len()));
                plan
            }
            Err(e) => {
                spinner.finish_error("Could not compare symbol catalogs");
                return Err(e);
            }
        };

        match &self.args.command {
            SymbolsSubcommand::Check { json } => check(&plan, *json, ui),
            SymbolsSubcommand::Sync { dry_run } => {
                if plan.patch.is_empty() {
                    ui.success("Symbols are up to date");
                    return Ok(CommandResult::success());
                }
                list_changes(&plan, ui);
                if *dry_run {
                    ui.message(&format!("Dry run: {}", plan.patch.summary()));
                    return Ok(CommandResult::success());
                }
                let applied = reconciler.apply_patch(&plan)?;
                ui.success(&format!("Symbols synced: {}", applied));
                Ok(CommandResult::success())
            }
        }
    }
}

impl Command for SymbolsCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let store = JsonStore::<Symbol>::new(self.context.store_dir());
        let remote = self.context.http_source()?;
        self.run_with(store, remote, ui)
    }
}

fn check(plan: &PatchPlan<Symbol>, json: bool, ui: &mut dyn UserInterface) -> Result<CommandResult> {
    if json {
        ui.data(&serde_json::to_string_pretty(&plan.patch).map_err(anyhow::Error::from)?);
        return Ok(CommandResult::success());
    }

    if plan.patch.is_empty() {
        ui.success("Symbols are up to date");
    } else {
        ui.warning(&format!("Symbol updates available: {}", plan.patch.summary()));
        list_changes(plan, ui);
    }
    Ok(CommandResult::success())
}

fn list_changes(plan: &PatchPlan<Symbol>, ui: &mut dyn UserInterface) {
    if !ui.output_mode().is_verbose() {
        return;
    }
    let groups = [
        ("+", &plan.patch.add),
        ("~", &plan.patch.update),
        ("-", &plan.patch.delete),
    ];
    for (marker, keys) in groups {
        for key in keys {
            ui.message(&format!("  {} {}", marker, key));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CardsyncConfig;
    use crate::reconcile::Patch;
    use crate::search::SearchQuery;
    use crate::store::MemoryStore;
    use crate::ui::{MockUI, OutputMode};
    use anyhow::anyhow;
    use std::sync::Arc;

    struct Catalog(Option<Vec<Symbol>>);

    impl RemoteSource<Symbol> for Catalog {
        fn fetch_record(&self, _query: &SearchQuery) -> anyhow::Result<Option<Symbol>> {
            Ok(None)
        }

        fn list_all(&self) -> anyhow::Result<Vec<Symbol>> {
            self.0.clone().ok_or_else(|| anyhow!("HTTP 503 fetching /symbology"))
        }
    }

    fn command(subcommand: SymbolsSubcommand) -> SymbolsCommand {
        SymbolsCommand::new(
            CommandContext::from_components(CardsyncConfig::default().validate().unwrap()),
            SymbolsArgs {
                command: subcommand,
            },
        )
    }

    fn remote() -> Catalog {
        Catalog(Some(vec![Symbol::new("{T}", "tap"), Symbol::new("{Q}", "untap")]))
    }

    #[test]
    fn check_reports_available_updates_without_writing() {
        let store = Arc::new(MemoryStore::with_records([Symbol::new("{E}", "energy")]));
        let mut ui = MockUI::new();

        command(SymbolsSubcommand::Check { json: false })
            .run_with(Arc::clone(&store), remote(), &mut ui)
            .unwrap();

        assert_eq!(
            ui.warnings(),
            ["Symbol updates available: 2 to add, 0 to update, 1 to delete"]
        );
        assert!(store.get("{E}").unwrap().is_some());
    }

    #[test]
    fn check_json_emits_patch() {
        let mut ui = MockUI::new();

        command(SymbolsSubcommand::Check { json: true })
            .run_with(MemoryStore::new(), remote(), &mut ui)
            .unwrap();

        let patch: serde_json::Value = serde_json::from_str(&ui.data_lines()[0]).unwrap();
        assert_eq!(patch["add"], serde_json::json!(["{Q}", "{T}"]));
        assert_eq!(patch["delete"], serde_json::json!([]));
    }

    #[test]
    fn sync_applies_patch() {
        let store = Arc::new(MemoryStore::with_records([Symbol::new("{E}", "energy")]));
        let mut ui = MockUI::new();

        command(SymbolsSubcommand::Sync { dry_run: false })
            .run_with(Arc::clone(&store), remote(), &mut ui)
            .unwrap();

        assert_eq!(ui.successes(), ["Symbols synced: 2 added, 0 updated, 1 deleted"]);
        let keys: Vec<String> = store.list().unwrap().into_iter().map(|s| s.symbol).collect();
        assert_eq!(keys, vec!["{Q}", "{T}"]);
    }

    #[test]
    fn dry_run_leaves_store_alone() {
        let store = Arc::new(MemoryStore::<Symbol>::new());
        let mut ui = MockUI::with_mode(OutputMode::Verbose);

        command(SymbolsSubcommand::Sync { dry_run: true })
            .run_with(Arc::clone(&store), remote(), &mut ui)
            .unwrap();

        assert!(store.list().unwrap().is_empty());
        assert!(ui.messages().iter().any(|m| m == "  + {T}"));
        assert!(ui.has_output("Dry run: 2 to add, 0 to update, 0 to delete"));
    }

    #[test]
    fn up_to_date_catalog_is_reported() {
        let store = Arc::new(MemoryStore::new());
        let mut ui = MockUI::new();
        let cmd = command(SymbolsSubcommand::Sync { dry_run: false });

        cmd.run_with(Arc::clone(&store), remote(), &mut ui).unwrap();
        cmd.run_with(Arc::clone(&store), remote(), &mut ui).unwrap();

        assert_eq!(ui.successes().last().map(String::as_str), Some("Symbols are up to date"));
    }

    #[test]
    fn remote_failure_finishes_spinner_with_error() {
        let mut ui = MockUI::new();

        let err = command(SymbolsSubcommand::Check { json: false })
            .run_with(MemoryStore::new(), Catalog(None), &mut ui)
            .unwrap_err();

        assert!(err.to_string().contains("503"));
        assert!(ui
            .spinner_events()
            .contains(&"error: Could not compare symbol catalogs".to_string()));
    }

    #[test]
    fn patch_summary_matches_json_shape() {
        let json = serde_json::to_value(Patch::default()).unwrap();
        assert_eq!(json, serde_json::json!({"add": [], "update": [], "delete": []}));
    }
}
