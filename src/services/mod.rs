//! Services module
//!
//! Este módulo contiene la lógica de negocio del flujo de reacondicionamiento.
//! El motor de etapas, el historial y las métricas son funciones puras; los
//! servicios de importación y sincronización hablan con el store y la red.

pub mod analytics_service;
pub mod change_feed;
pub mod csv_service;
pub mod import_mapper;
pub mod import_service;
pub mod ledger;
pub mod sheet_sync_service;
pub mod stage_engine;

pub use change_feed::{spawn_change_feed, DashboardReceiver, ReconDashboard};
pub use import_service::{ImportService, ImportSummary};
pub use ledger::{LedgerError, LedgerUpdate};
pub use sheet_sync_service::SheetSyncService;
