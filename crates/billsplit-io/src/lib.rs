//! # billsplit-io: File Adapters
//!
//! Reads receipts into bill data and writes results back out. All the
//! actual math lives in `billsplit-core`; this crate only converts formats.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  OCR text ──► receipt::parse_receipt_text ──┐                          │
//! │                                             ├──► ImportedReceipt       │
//! │  CSV file ──► import::read_itemized_csv ────┘         │                │
//! │                                                       ▼                │
//! │                              ingest::apply_receipt (TaxClassMap)       │
//! │                                                       │                │
//! │                                                       ▼                │
//! │                                              billsplit_core::Bill       │
//! │                                                       │                │
//! │                                                       ▼                │
//! │                              export::write_totals_csv ──► CSV file     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod export;
pub mod import;
pub mod ingest;
pub mod receipt;

pub use error::{IoError, IoResult};
pub use export::{write_itemized_csv, write_itemized_csv_path, write_totals_csv, write_totals_csv_path, ExportOptions};
pub use import::{read_itemized_csv, read_itemized_csv_path, ImportOptions, DEFAULT_STORE_MARKER};
pub use ingest::{apply_receipt, TaxClassMap};
pub use receipt::{parse_receipt_text, read_receipt_text, ImportedReceipt, ReceiptLine};
