//! # Script Runner
//!
//! Executes parsed commands against one [`BillState`].
//!
//! ## Line Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  line ──► ScriptCommand::parse ──► execute ──► Outcome ──► observer     │
//! │                 │                     │                                 │
//! │                 └──── Err ────────────┴──► at_line(n)                   │
//! │                                               │                         │
//! │                              keep_going? ─no──┴──► stop, return error   │
//! │                                  │ yes                                  │
//! │                                  ▼                                      │
//! │                    observer sees the error, next line                   │
//! │                    (ScriptFailed at the end)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use billsplit_core::{Bill, CoreError, CoreResult, ItemDraft, ItemId, QUANTITY_EPSILON};
use billsplit_io::{apply_receipt, read_itemized_csv_path, read_receipt_text, write_totals_csv_path, ImportedReceipt};
use tracing::{debug, info, warn};

use crate::error::{CliError, CliResult};
use crate::script::command::{ItemFields, ScriptCommand};
use crate::script::outcome::{BillListing, Outcome};
use crate::state::{AppConfig, BillState};

/// Counts from a finished script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptSummary {
    pub executed: usize,
    pub failed: usize,
}

pub struct ScriptRunner<'a> {
    state: BillState,
    config: &'a AppConfig,
}

impl<'a> ScriptRunner<'a> {
    pub fn new(state: BillState, config: &'a AppConfig) -> Self {
        ScriptRunner { state, config }
    }

    pub fn state(&self) -> &BillState {
        &self.state
    }

    /// Runs every line of `text`.
    ///
    /// `observe` sees each command's result in order. Without `keep_going`
    /// the first failure stops the run and is returned.
    pub fn run<F>(&self, text: &str, keep_going: bool, mut observe: F) -> CliResult<ScriptSummary>
    where
        F: FnMut(usize, &CliResult<Outcome>),
    {
        let mut summary = ScriptSummary::default();
        let mut first_code = None;

        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            match self.run_line(line_no, line) {
                Ok(None) => {}
                Ok(Some(outcome)) => {
                    summary.executed += 1;
                    observe(line_no, &Ok(outcome));
                }
                Err(err) if keep_going => {
                    warn!(line = line_no, error = %err, "Script line failed");
                    summary.failed += 1;
                    first_code.get_or_insert(err.code());
                    observe(line_no, &Err(err));
                }
                Err(err) => return Err(err),
            }
        }

        info!(executed = summary.executed, failed = summary.failed, "Script finished");
        match first_code {
            Some(first_code) => Err(CliError::ScriptFailed {
                failed: summary.failed,
                first_code,
            }),
            None => Ok(summary),
        }
    }

    /// Parses and executes one line; `Ok(None)` for blank and comment lines.
    pub fn run_line(&self, line_no: usize, line: &str) -> CliResult<Option<Outcome>> {
        let Some(command) = ScriptCommand::parse(line_no, line)? else {
            return Ok(None);
        };
        debug!(line = line_no, ?command, "Executing");
        self.execute(command).map(Some).map_err(|e| e.at_line(line_no))
    }

    pub fn execute(&self, command: ScriptCommand) -> CliResult<Outcome> {
        match command {
            ScriptCommand::AddParticipant(name) => {
                self.state.with_bill_mut(|bill| bill.add_participant(&name))?;
                Ok(Outcome::message(format!("Added participant '{}'", name.trim())))
            }
            ScriptCommand::RenameParticipant { from, to } => {
                self.state.with_bill_mut(|bill| bill.rename_participant(&from, &to))?;
                Ok(Outcome::message(format!("Renamed '{}' to '{}'", from.trim(), to.trim())))
            }
            ScriptCommand::RemoveParticipant(name) => {
                let report = self.state.with_bill_mut(|bill| bill.remove_participant(&name))?;
                let mut text = format!("Removed participant '{}'", report.participant.name);
                if !report.removed_items.is_empty() {
                    let names: Vec<&str> = report.removed_items.iter().map(|i| i.name.as_str()).collect();
                    text.push_str(&format!("; deleted unassigned items: {}", names.join(", ")));
                }
                Ok(Outcome::message(text))
            }
            ScriptCommand::AddCategory { name, tax_rate_percent } => {
                let category = self
                    .state
                    .with_bill_mut(|bill| bill.add_category(&name, tax_rate_percent))?;
                Ok(Outcome::message(format!(
                    "Added category '{}' ({}%)",
                    category.name,
                    category.tax_rate.percentage()
                )))
            }
            ScriptCommand::AddItem { name, unit_price, fields } => {
                let name = self.state.with_bill_mut(|bill| {
                    let quantity = fields.quantity.unwrap_or(1);
                    let mut draft = ItemDraft::new(name, unit_price, quantity);
                    draft.category = fields.category.clone();
                    draft.participants = fields
                        .participants
                        .clone()
                        .unwrap_or_else(|| all_names(bill));
                    draft.explicit_quantities = fields.split.iter().cloned().collect();
                    let id = bill.add_item(draft)?;
                    Ok::<_, CoreError>(item_name(bill, id))
                })?;
                Ok(Outcome::message(format!("Added item '{}'", name)))
            }
            ScriptCommand::EditItem { position, fields } => {
                let name = self.state.with_bill_mut(|bill| {
                    let id = item_at(bill, position)?;
                    let draft = edit_draft(bill, id, &fields)?;
                    bill.edit_item(id, draft)?;
                    Ok::<_, CoreError>(item_name(bill, id))
                })?;
                Ok(Outcome::message(format!("Updated item #{} '{}'", position, name)))
            }
            ScriptCommand::RemoveItem(position) => {
                let item = self.state.with_bill_mut(|bill| {
                    let id = item_at(bill, position)?;
                    bill.remove_item(id)
                })?;
                Ok(Outcome::message(format!("Removed item '{}'", item.name)))
            }
            ScriptCommand::ExcludeItem(position) => self.set_excluded(position, true),
            ScriptCommand::IncludeItem(position) => self.set_excluded(position, false),
            ScriptCommand::SetMode(mode) => {
                self.state.with_bill_mut(|bill| bill.set_discount_mode(mode));
                Ok(Outcome::message(format!("Discount mode: {}", mode)))
            }
            ScriptCommand::Undo => {
                let count = self.state.with_bill_mut(|bill| {
                    bill.undo()?;
                    Ok::<_, CoreError>(bill.items().len())
                })?;
                Ok(Outcome::message(format!("Undone ({} items)", count)))
            }
            ScriptCommand::Redo => {
                let count = self.state.with_bill_mut(|bill| {
                    bill.redo()?;
                    Ok::<_, CoreError>(bill.items().len())
                })?;
                Ok(Outcome::message(format!("Redone ({} items)", count)))
            }
            ScriptCommand::Calc { discount_percent } => {
                let totals = self.state.with_session_mut(|session| {
                    if let Some(pct) = discount_percent {
                        session.set_discount(pct / 100.0)?;
                    }
                    session.totals()
                })?;
                Ok(Outcome::Totals(totals))
            }
            ScriptCommand::Export(path) => {
                let totals = self.state.totals()?;
                write_totals_csv_path(&path, &totals, &self.config.export_options())?;
                Ok(Outcome::message(format!(
                    "Exported totals for {} participants to {}",
                    totals.participants.len(),
                    path.display()
                )))
            }
            ScriptCommand::Import { path, participants } => {
                let receipt = load_receipt(&path, self.config)?;
                let added = self.state.with_bill_mut(|bill| {
                    let names = participants.unwrap_or_else(|| all_names(bill));
                    apply_receipt(bill, &receipt, &names, &self.config.tax_class_map)
                })?;

                let mut text = format!("Imported {} items from {}", added.len(), path.display());
                if let Some(note) = subtotal_note(&receipt, &self.config.currency_symbol) {
                    text.push_str(&format!(" ({})", note));
                }
                Ok(Outcome::message(text))
            }
            ScriptCommand::Reset => {
                self.state.with_bill_mut(|bill| {
                    bill.reset();
                    self.config.register_categories(bill)
                })?;
                Ok(Outcome::message("Bill reset"))
            }
            ScriptCommand::List => {
                let listing = self
                    .state
                    .with_session(|session| BillListing::from_bill(session.bill(), session.discount()));
                Ok(Outcome::Listing(listing))
            }
        }
    }

    fn set_excluded(&self, position: usize, excluded: bool) -> CliResult<Outcome> {
        let name = self.state.with_bill_mut(|bill| {
            let id = item_at(bill, position)?;
            bill.set_item_excluded(id, excluded)?;
            Ok::<_, CoreError>(item_name(bill, id))
        })?;
        let verb = if excluded { "Excluded" } else { "Included" };
        Ok(Outcome::message(format!("{} item '{}'", verb, name)))
    }
}

/// Reads a receipt file: `.txt` as receipt text, anything else as CSV.
pub fn load_receipt(path: &Path, config: &AppConfig) -> CliResult<ImportedReceipt> {
    let is_text = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("txt"));

    let receipt = if is_text {
        read_receipt_text(path)?
    } else {
        read_itemized_csv_path(path, &config.import_options())?
    };
    debug!(path = %path.display(), items = receipt.items.len(), is_text, "Receipt loaded");
    Ok(receipt)
}

/// Points out a printed subtotal the lines do not add up to.
pub fn subtotal_note(receipt: &ImportedReceipt, symbol: &str) -> Option<String> {
    let subtotal = receipt.subtotal?;
    let items_total = receipt.items_total();
    (subtotal != items_total).then(|| {
        format!(
            "receipt subtotal {} but lines add up to {}",
            subtotal.format_with(symbol),
            items_total.format_with(symbol)
        )
    })
}

fn all_names(bill: &Bill) -> Vec<String> {
    bill.participants().iter().map(|p| p.name.clone()).collect()
}

fn item_at(bill: &Bill, position: usize) -> CoreResult<ItemId> {
    position
        .checked_sub(1)
        .and_then(|index| bill.items().get(index))
        .map(|item| item.id)
        .ok_or_else(|| CoreError::not_found("Item", format!("#{}", position)))
}

fn item_name(bill: &Bill, id: ItemId) -> String {
    bill.item(id).map(|item| item.name.clone()).unwrap_or_default()
}

/// Draft for an edit: given fields over the item's current values.
///
/// Current shares carry over as explicit quantities unless the edit touches
/// quantity, participants or split.
fn edit_draft(bill: &Bill, id: ItemId, fields: &ItemFields) -> CoreResult<ItemDraft> {
    let item = bill
        .item(id)
        .ok_or_else(|| CoreError::not_found("Item", id.to_string()))?;
    let registry = bill.participants();

    let current: Vec<(String, f64)> = item
        .split_quantities
        .iter()
        .filter_map(|(pid, &qty)| registry.name_of(*pid).map(|name| (name.to_string(), qty)))
        .collect();

    let mut draft = ItemDraft::new(
        fields.name.clone().unwrap_or_else(|| item.name.clone()),
        fields.unit_price.unwrap_or(item.unit_price),
        fields.quantity.unwrap_or(item.quantity),
    );
    draft.category = Some(fields.category.clone().unwrap_or_else(|| item.category.clone()));
    draft.participants = fields
        .participants
        .clone()
        .unwrap_or_else(|| current.iter().map(|(name, _)| name.clone()).collect());
    // A removal can leave the split short of the quantity; such an item is
    // re-split among the people still on it.
    let shortfall = item.quantity as f64 - item.allocated_quantity();
    let fully_allocated = shortfall.abs() < QUANTITY_EPSILON;
    draft.explicit_quantities = if fields.touches_split() {
        fields.split.iter().cloned().collect()
    } else if fully_allocated {
        current.into_iter().collect()
    } else {
        BTreeMap::new()
    };
    Ok(draft)
}
