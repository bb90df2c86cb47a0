//! Symmetrisk make/maka-länk
//!
//! Om A pekar på B ska B peka på A, och ingen tredje person får peka på
//! någon av dem. Alla steg körs i anroparens transaktion så att en
//! halvfärdig länk aldrig syns utåt.

use rusqlite::Connection;
use tracing::{debug, info};

use crate::db::{PersonStore, SqlPersonStore};
use crate::utils::{AppError, AppResult};

pub struct SpouseLinkManager<'c> {
    store: SqlPersonStore<'c>,
}

impl<'c> SpouseLinkManager<'c> {
    /// `conn` måste vara en öppen transaktion
    pub fn new(conn: &'c Connection) -> Self {
        Self {
            store: SqlPersonStore::new(conn),
        }
    }

    /// Stäm av make/maka efter att `subject_id` fått `new_spouse_id`
    pub fn reconcile(
        &self,
        subject_id: &str,
        new_spouse_id: Option<&str>,
        previous_spouse_id: Option<&str>,
    ) -> AppResult<()> {
        if let Some(new_id) = new_spouse_id {
            if new_id == subject_id {
                return Err(AppError::validation("En person kan inte vara gift med sig själv"));
            }
            // Finns inte partnern är det ett referensfel, inte ett länkfel
            self.store.get(new_id)?;

            let detached = self
                .store
                .detach_spouse_refs(subject_id, new_id)
                .map_err(|e| link_failed("koppla loss tidigare partner", e))?;
            if detached > 0 {
                info!("Kopplade loss {} tidigare make/maka-länk(ar)", detached);
            }

            self.store
                .set_spouse(new_id, Some(subject_id))
                .map_err(|e| link_failed("sätta ny make/maka", e))?;
        }

        if let Some(previous_id) = previous_spouse_id {
            if Some(previous_id) != new_spouse_id {
                self.store
                    .set_spouse(previous_id, None)
                    .map_err(|e| link_failed("nollställa tidigare make/maka", e))?;
                debug!("Nollställde make/maka för {}", previous_id);
            }
        }

        if new_spouse_id.is_none() {
            // Ingen får längre peka på personen
            self.store
                .detach_spouse_refs(subject_id, subject_id)
                .map_err(|e| link_failed("koppla loss make/maka", e))?;
        }

        let rows = self
            .store
            .set_spouse(subject_id, new_spouse_id)
            .map_err(|e| link_failed("spara make/maka", e))?;
        if rows != 1 {
            return Err(AppError::link_consistency(format!(
                "person {} saknas vid avstämning",
                subject_id
            )));
        }

        Ok(())
    }
}

fn link_failed(step: &str, err: AppError) -> AppError {
    match err {
        AppError::Storage(e) => AppError::link_consistency(format!("kunde inte {}: {}", step, e)),
        other => other,
    }
}
