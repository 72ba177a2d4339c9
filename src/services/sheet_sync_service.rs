//! Sincronización con la hoja de inventario publicada
//!
//! Descarga el export CSV publicado, calcula su huella md5 y, si cambió (o se
//! fuerza), lo pasa por el pipeline de importación.

use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::services::csv_service;
use crate::services::import_service::{ImportService, ImportSummary};
use crate::utils::errors::{AppError, AppResult};

pub const SHEET_SOURCE: &str = "Google Sheet";

/// Resultado de una sincronización
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetSyncOutcome {
    pub fingerprint: String,
    pub unchanged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ImportSummary>,
}

pub struct SheetSyncService {
    client: Client,
    sheet_url: String,
    timeout: Duration,
    last_fingerprint: Mutex<Option<String>>,
}

/// Huella del contenido descargado
pub fn fingerprint(body: &str) -> String {
    format!("{:x}", md5::compute(body.as_bytes()))
}

impl SheetSyncService {
    pub fn new(client: Client, sheet_url: String, timeout: Duration) -> Self {
        Self {
            client,
            sheet_url,
            timeout,
            last_fingerprint: Mutex::new(None),
        }
    }

    async fn fetch_sheet(&self) -> AppResult<String> {
        log::info!("🌐 Descargando hoja publicada: {}", self.sheet_url);

        let response = self
            .client
            .get(&self.sheet_url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Sheet request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            log::error!("❌ Hoja respondió {}: {}", status, error_text);
            return Err(AppError::ExternalApi(format!(
                "Sheet export returned HTTP {}",
                status
            )));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Sheet body could not be read: {}", e)))
    }

    /// Descarga e importa; una hoja sin cambios se omite salvo con `force`
    pub async fn sync(&self, importer: &ImportService, force: bool) -> AppResult<SheetSyncOutcome> {
        let body = self.fetch_sheet().await?;
        let fingerprint = fingerprint(&body);
        log::info!("🔑 Huella de la hoja: {}", fingerprint);

        let mut last = self.last_fingerprint.lock().await;
        if !force && last.as_deref() == Some(fingerprint.as_str()) {
            log::info!("⏭️ Hoja sin cambios, importación omitida");
            return Ok(SheetSyncOutcome {
                fingerprint,
                unchanged: true,
                summary: None,
            });
        }

        let rows = csv_service::parse_rows(&body)?;
        let summary = importer.process_rows(&rows, SHEET_SOURCE, Utc::now()).await?;
        *last = Some(fingerprint.clone());

        Ok(SheetSyncOutcome {
            fingerprint,
            unchanged: false,
            summary: Some(summary),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_stable_md5() {
        assert_eq!(fingerprint(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(fingerprint("VIN\nV1\n"), fingerprint("VIN\nV1\n"));
        assert_ne!(fingerprint("VIN\nV1\n"), fingerprint("VIN\nV2\n"));
    }
}
