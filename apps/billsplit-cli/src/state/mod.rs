//! # State Module
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────┐        ┌──────────────────────────────┐          │
//! │  │    AppConfig     │        │          BillState           │          │
//! │  │                  │ builds │                              │          │
//! │  │  currency symbol │───────►│  Arc<Mutex<Session>>         │          │
//! │  │  discount mode   │        │    bill + working discount   │          │
//! │  │  tax class map   │        │    totals cache (revision)   │          │
//! │  └──────────────────┘        └──────────────────────────────┘          │
//! │                                                                         │
//! │  AppConfig: read-only after loading                                    │
//! │  BillState: every access through with_session / with_session_mut       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod session;

pub use config::{default_config_path, AppConfig, CategoryPreset, ConfigOverrides, CONFIG_FILE_NAME};
pub use session::{BillState, Session};
