//! # Bill Scripts
//!
//! A line-oriented command language for driving one bill from a file:
//!
//! ```text
//! participant add Alice
//! participant add Bob
//! category add Alcohol 8
//! item add Wine 10.00 category=Alcohol for=Bob
//! item add Milk 1.50 2
//! calc 10
//! export totals.csv
//! ```
//!
//! ```text
//! script/
//! ├── lexer.rs    ◄─── quote-aware word splitting
//! ├── command.rs  ◄─── words → ScriptCommand
//! ├── outcome.rs  ◄─── printable results
//! └── runner.rs   ◄─── executes against a BillState
//! ```

mod command;
mod lexer;
mod outcome;
mod runner;

pub use command::{ItemFields, ScriptCommand};
pub use lexer::tokenize;
pub use outcome::{BillListing, CategoryRow, ItemRow, Outcome, ShareRow};
pub use runner::{load_receipt, subtotal_note, ScriptRunner, ScriptSummary};
