// ==========================================
// Training Ingest - per-row upsert engine
// ==========================================
// Stage 3: one transaction per row. A failing row is rolled back alone
// and collected as a RowError; the batch continues. Failing to open a
// row transaction aborts the batch (connection-level problem); rows
// already committed stay reported in the partial outcome.
// ==========================================

use crate::domain::{BatchOutcome, RowError, SourcedRow};
use crate::importer::error::ImportError;
use crate::repository::training_import_repo::{UpsertStatement, WriteMode};
use rusqlite::{Connection, Transaction};

/// Effect of one successful row write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowEffect {
    Inserted,
    Updated,
    Unmatched,
}

fn apply_row<T: UpsertStatement>(tx: &Transaction<'_>, record: &T) -> rusqlite::Result<RowEffect> {
    let existed = record.exists(tx)?;
    let changed = record.write(tx)?;

    Ok(match (T::MODE, existed, changed) {
        (WriteMode::UpdateOnly, _, 0) => RowEffect::Unmatched,
        (_, true, _) => RowEffect::Updated,
        (_, false, _) => RowEffect::Inserted,
    })
}

/// A batch cut short because a row transaction could not be opened.
/// `partial` holds everything committed before the failure.
#[derive(Debug)]
pub struct BatchAborted {
    pub partial: BatchOutcome,
    pub error: ImportError,
}

/// Writes `rows` in order.
///
/// # Returns
/// - Ok(outcome): counts and collected row errors
/// - Err(BatchAborted): a row transaction could not be opened; the rows
///   already written are reported in `partial`
pub fn upsert_batch<T: UpsertStatement>(
    conn: &Connection,
    rows: &[SourcedRow<T>],
) -> Result<BatchOutcome, BatchAborted> {
    write_rows(rows, || conn.unchecked_transaction())
}

fn write_rows<'c, T, B>(rows: &[SourcedRow<T>], mut begin: B) -> Result<BatchOutcome, BatchAborted>
where
    T: UpsertStatement,
    B: FnMut() -> rusqlite::Result<Transaction<'c>>,
{
    let mut outcome = BatchOutcome::default();

    for row in rows {
        let tx = match begin() {
            Ok(tx) => tx,
            Err(e) => {
                tracing::error!(
                    entity = T::ENTITY,
                    row = row.row_number,
                    written = outcome.succeeded(),
                    error = %e,
                    "batch aborted"
                );
                return Err(BatchAborted {
                    partial: outcome,
                    error: ImportError::DatabaseConnectionError(e.to_string()),
                });
            }
        };
        outcome.attempted += 1;

        // dropping an uncommitted transaction rolls it back
        let result = match apply_row(&tx, &row.record) {
            Ok(effect) => tx.commit().map(|_| effect),
            Err(e) => Err(e),
        };

        match result {
            Ok(RowEffect::Inserted) => outcome.inserted += 1,
            Ok(RowEffect::Updated) => outcome.updated += 1,
            Ok(RowEffect::Unmatched) => {
                outcome.unmatched += 1;
                tracing::warn!(
                    entity = T::ENTITY,
                    key = %row.record.natural_key(),
                    row = row.row_number,
                    "no stored record matches this key; nothing updated"
                );
            }
            Err(e) => {
                let error = RowError {
                    entity: T::ENTITY.to_string(),
                    natural_key: row.record.natural_key(),
                    row_number: row.row_number,
                    message: e.to_string(),
                };
                tracing::warn!(error = %error, "row write failed");
                outcome.errors.push(error);
            }
        }
    }

    tracing::info!(
        entity = T::ENTITY,
        attempted = outcome.attempted,
        inserted = outcome.inserted,
        updated = outcome.updated,
        unmatched = outcome.unmatched,
        failed = outcome.errors.len(),
        "batch written"
    );

    Ok(outcome)
}
