// src/db.rs - Persistent match store: schema, batched upsert, maintenance ops
//
// Every public operation opens its own store handle, uses it, and releases
// it on all exit paths. Writes are serialized through sequential per-batch
// transactions; a failed batch rolls back alone while committed batches
// stay committed.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use tokio_postgres::types::ToSql;
use tokio_postgres::Transaction;

use crate::models::core::{MatchStatus, PersistedMatch};
use crate::models::matching::MatchCandidate;
use crate::models::stats::UpsertStats;
use crate::utils::db_connect::{connect_store, StoreConfig};

/// Rows per transaction during an upsert pass.
pub const UPSERT_BATCH_SIZE: usize = 500;

const MATCH_COLUMNS: &str = "id, court_station, cause_no, name_norm, name_of_deceased, \
     status_at_gp, volume_no, date_published, score, duplicate, excel_name, match_type, \
     created_at, updated_at";

/// One row handed to the upsert pass.
#[derive(Debug, Clone)]
pub struct NewMatchRow {
    pub court_station: String,
    pub cause_no: String,
    pub name_norm: String,
    pub name_of_deceased: String,
    pub status_at_gp: MatchStatus,
    pub volume_no: String,
    pub date_published: String,
    pub score: f64,
    pub excel_name: Option<String>,
    pub match_type: Option<String>,
}

impl NewMatchRow {
    /// Builds a storable row from an accept-tier candidate. Acceptance is
    /// what escalates the status to Approved; the registry-side resolved
    /// name and the matching mode ride along as optional provenance.
    pub fn from_accepted(candidate: &MatchCandidate) -> Self {
        Self {
            court_station: candidate.gazette.court_station.clone(),
            cause_no: candidate.gazette.cause_no.clone(),
            name_norm: crate::matching::name::normalize_name(&candidate.gazette.name_of_deceased),
            name_of_deceased: candidate.gazette.name_of_deceased.clone(),
            status_at_gp: MatchStatus::Approved,
            volume_no: candidate.gazette.volume_no.clone(),
            date_published: candidate.gazette.date_published.clone(),
            score: candidate.score,
            excel_name: Some(candidate.registry.name_raw.clone()),
            match_type: Some(candidate.mode.as_str().to_string()),
        }
    }
}

/// Creates the match table and its composite identity index if absent.
pub async fn init_schema(config: &StoreConfig) -> Result<()> {
    let client = connect_store(config).await?;
    client
        .batch_execute(
            "CREATE TABLE IF NOT EXISTS gazette_match (
                id BIGSERIAL PRIMARY KEY,
                court_station TEXT NOT NULL,
                cause_no TEXT NOT NULL,
                name_norm TEXT NOT NULL,
                name_of_deceased TEXT NOT NULL,
                status_at_gp TEXT NOT NULL,
                volume_no TEXT NOT NULL,
                date_published TEXT NOT NULL,
                score DOUBLE PRECISION NOT NULL,
                duplicate BOOLEAN NOT NULL DEFAULT FALSE,
                excel_name TEXT,
                match_type TEXT,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE UNIQUE INDEX IF NOT EXISTS gazette_match_identity_idx
                ON gazette_match (court_station, cause_no, name_norm, date_published, volume_no);",
        )
        .await
        .context("Failed to initialize gazette_match schema")?;
    debug!("gazette_match schema ready");
    Ok(())
}

/// Upserts rows in batches, one transaction per batch. On conflict with the
/// composite identity the row escalates: status becomes Approved only when
/// the incoming row says Approved, the score keeps its maximum, and the
/// optional provenance fields fill in only if previously null. A failing
/// batch is rolled back and logged; the pass continues with the next batch
/// (at-most-once per batch, the operator re-submits).
pub async fn upsert_matches(config: &StoreConfig, rows: &[NewMatchRow]) -> Result<UpsertStats> {
    let mut stats = UpsertStats::default();
    if rows.is_empty() {
        return Ok(stats);
    }

    let mut client = connect_store(config).await?;

    let total_batches = (rows.len() + UPSERT_BATCH_SIZE - 1) / UPSERT_BATCH_SIZE;
    for (batch_idx, batch) in rows.chunks(UPSERT_BATCH_SIZE).enumerate() {
        let transaction = client
            .transaction()
            .await
            .context("Failed to start upsert transaction")?;
        match upsert_batch(&transaction, batch).await {
            Ok((inserted, updated)) => {
                transaction
                    .commit()
                    .await
                    .context("Failed to commit upsert batch")?;
                stats.inserted += inserted;
                stats.updated += updated;
            }
            Err(e) => {
                // Dropping the transaction rolls this batch back; committed
                // batches before it are unaffected.
                warn!(
                    "Upsert batch {}/{} ({} rows) failed and was rolled back: {:#}",
                    batch_idx + 1,
                    total_batches,
                    batch.len(),
                    e
                );
                stats.failed_batches += 1;
            }
        }
    }

    info!(
        "Upsert pass complete: {} inserted, {} updated, {} failed batches (of {})",
        stats.inserted, stats.updated, stats.failed_batches, total_batches
    );
    Ok(stats)
}

async fn upsert_batch(
    transaction: &Transaction<'_>,
    batch: &[NewMatchRow],
) -> Result<(u64, u64)> {
    let mut values_clause_parts = Vec::new();
    let mut params: Vec<Box<dyn ToSql + Sync + Send>> = Vec::new();
    let mut param_idx = 1;

    for row in batch {
        values_clause_parts.push(format!(
            "(${}, ${}, ${}, ${}, ${}, ${}, ${}, ${}, FALSE, ${}, ${}, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)",
            param_idx,
            param_idx + 1,
            param_idx + 2,
            param_idx + 3,
            param_idx + 4,
            param_idx + 5,
            param_idx + 6,
            param_idx + 7,
            param_idx + 8,
            param_idx + 9
        ));
        params.push(Box::new(row.court_station.clone()));
        params.push(Box::new(row.cause_no.clone()));
        params.push(Box::new(row.name_norm.clone()));
        params.push(Box::new(row.name_of_deceased.clone()));
        params.push(Box::new(row.status_at_gp.as_str().to_string()));
        params.push(Box::new(row.volume_no.clone()));
        params.push(Box::new(row.date_published.clone()));
        params.push(Box::new(row.score));
        params.push(Box::new(row.excel_name.clone()));
        params.push(Box::new(row.match_type.clone()));
        param_idx += 10;
    }

    let upsert_sql = format!(
        "INSERT INTO gazette_match (
            court_station, cause_no, name_norm, name_of_deceased, status_at_gp,
            volume_no, date_published, score, duplicate, excel_name, match_type,
            created_at, updated_at
         ) VALUES {}
         ON CONFLICT (court_station, cause_no, name_norm, date_published, volume_no) DO UPDATE SET
            status_at_gp = CASE
                WHEN EXCLUDED.status_at_gp = 'Approved' THEN 'Approved'
                ELSE gazette_match.status_at_gp
            END,
            score = GREATEST(gazette_match.score, EXCLUDED.score),
            excel_name = COALESCE(gazette_match.excel_name, EXCLUDED.excel_name),
            match_type = COALESCE(gazette_match.match_type, EXCLUDED.match_type),
            updated_at = CURRENT_TIMESTAMP
         RETURNING (xmax = 0) AS was_inserted",
        values_clause_parts.join(", ")
    );

    let params_slice: Vec<&(dyn ToSql + Sync)> = params
        .iter()
        .map(|p| p.as_ref() as &(dyn ToSql + Sync))
        .collect();

    let result_rows = transaction
        .query(upsert_sql.as_str(), params_slice.as_slice())
        .await
        .context("Failed to execute batch upsert for gazette_match")?;

    let mut inserted = 0;
    let mut updated = 0;
    for row in result_rows {
        if row.get::<_, bool>("was_inserted") {
            inserted += 1;
        } else {
            updated += 1;
        }
    }
    debug!("Upserted batch: {} inserts, {} updates", inserted, updated);
    Ok((inserted, updated))
}

/// Marks every row whose excel_name appears on more than one persisted row
/// as a duplicate, and clears the flag everywhere else. Returns how many
/// rows ended up flagged.
pub async fn flag_duplicates(config: &StoreConfig) -> Result<u64> {
    let mut client = connect_store(config).await?;
    let transaction = client
        .transaction()
        .await
        .context("Failed to start duplicate-flagging transaction")?;

    transaction
        .execute("UPDATE gazette_match SET duplicate = FALSE WHERE duplicate", &[])
        .await
        .context("Failed to reset duplicate flags")?;

    let flagged = transaction
        .execute(
            "UPDATE gazette_match SET duplicate = TRUE
             WHERE excel_name IS NOT NULL AND excel_name <> ''
               AND excel_name IN (
                 SELECT excel_name FROM gazette_match
                 WHERE excel_name IS NOT NULL AND excel_name <> ''
                 GROUP BY excel_name
                 HAVING COUNT(*) > 1
               )",
            &[],
        )
        .await
        .context("Failed to flag duplicate rows")?;

    transaction
        .commit()
        .await
        .context("Failed to commit duplicate flags")?;

    info!("Flagged {} rows as duplicates", flagged);
    Ok(flagged)
}

/// Returns one row per distinct (name_norm, date_published, volume_no)
/// group (lowest id wins), newest publication date first with undated rows
/// last, then name ascending.
pub async fn list_matches(config: &StoreConfig) -> Result<Vec<PersistedMatch>> {
    let client = connect_store(config).await?;
    let query = format!(
        "SELECT {} FROM (
            SELECT DISTINCT ON (name_norm, date_published, volume_no) *
            FROM gazette_match
            ORDER BY name_norm, date_published, volume_no, id
         ) deduped
         ORDER BY (date_published = '') ASC, date_published DESC, name_norm ASC",
        MATCH_COLUMNS
    );
    let rows = client
        .query(query.as_str(), &[])
        .await
        .context("Failed to list persisted matches")?;

    let matches = rows
        .iter()
        .map(|row| PersistedMatch {
            id: row.get("id"),
            court_station: row.get("court_station"),
            cause_no: row.get("cause_no"),
            name_norm: row.get("name_norm"),
            name_of_deceased: row.get("name_of_deceased"),
            status_at_gp: MatchStatus::from_db_str(row.get("status_at_gp")),
            volume_no: row.get("volume_no"),
            date_published: row.get("date_published"),
            score: row.get("score"),
            duplicate: row.get("duplicate"),
            excel_name: row.get("excel_name"),
            match_type: row.get("match_type"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
        .collect();
    Ok(matches)
}

/// Deletes every persisted match. Hard reset, not reversible.
pub async fn clear_matches(config: &StoreConfig) -> Result<u64> {
    let client = connect_store(config).await?;
    let deleted = client
        .execute("DELETE FROM gazette_match", &[])
        .await
        .context("Failed to clear persisted matches")?;
    info!("Cleared {} persisted matches", deleted);
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::core::{GazetteRecord, RegistryRow};
    use crate::models::matching::MatchMode;

    #[test]
    fn test_from_accepted_escalates_status_and_carries_provenance() {
        let candidate = MatchCandidate {
            gazette: GazetteRecord {
                court_station: "Nairobi High Court".to_string(),
                cause_no: "123 OF 2020".to_string(),
                name_of_deceased: "JOHN KAMAU".to_string(),
                status_at_gp: MatchStatus::Published,
                volume_no: "Vol. CXXII - No. 45".to_string(),
                date_published: "15th May, 2020".to_string(),
            },
            registry: RegistryRow {
                columns: vec![("Deceased Name".to_string(), "John Kamau".to_string())],
                name_raw: "John Kamau".to_string(),
            },
            score: 1.0,
            mode: MatchMode::Exact,
        };

        let row = NewMatchRow::from_accepted(&candidate);
        assert_eq!(row.status_at_gp, MatchStatus::Approved);
        assert_eq!(row.name_norm, "john kamau");
        assert_eq!(row.excel_name.as_deref(), Some("John Kamau"));
        assert_eq!(row.match_type.as_deref(), Some("exact"));
    }
}
