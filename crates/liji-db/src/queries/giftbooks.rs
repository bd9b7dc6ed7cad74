//! Giftbook queries.
//!
//! A giftbook owns its line items. Items are never edited individually:
//! saving a giftbook deletes its items and writes the submitted ones again.

use chrono::Utc;
use liji_common::{GiftbookId, GiftbookItemId, Result};
use rusqlite::Connection;
use std::collections::{HashMap, HashSet};

use super::{begin_write, db_err, timestamp};
use crate::models::{Giftbook, GiftbookInput, GiftbookItem, SaveSummary};

fn row_to_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<GiftbookItem> {
    Ok(GiftbookItem {
        id: GiftbookItemId::from(row.get::<_, i64>(0)?),
        giftbook_id: GiftbookId::from(row.get::<_, i64>(1)?),
        person_name: row.get(2)?,
        amount: row.get(3)?,
        notes: row.get(4)?,
        created_at: timestamp(row, 5)?,
    })
}

/// List all giftbooks with their items, most recent event first.
pub fn list_giftbooks(conn: &Connection) -> Result<Vec<Giftbook>> {
    let mut items_by_book: HashMap<GiftbookId, Vec<GiftbookItem>> = HashMap::new();
    {
        let mut stmt = conn
            .prepare(
                "SELECT id, giftbook_id, person_name, amount, notes, created_at
                 FROM giftbook_items ORDER BY giftbook_id, id",
            )
            .map_err(db_err)?;
        let rows = stmt.query_map([], row_to_item).map_err(db_err)?;
        for item in rows {
            let item = item.map_err(db_err)?;
            items_by_book.entry(item.giftbook_id).or_default().push(item);
        }
    }

    let mut stmt = conn
        .prepare(
            "SELECT id, name, event_type, event_date, total_amount, total_count, notes,
                    created_at, updated_at
             FROM giftbooks ORDER BY event_date DESC, id ASC",
        )
        .map_err(db_err)?;

    let books = stmt
        .query_map([], |row| {
            let id = GiftbookId::from(row.get::<_, i64>(0)?);
            Ok(Giftbook {
                id,
                name: row.get(1)?,
                event_type: row.get(2)?,
                event_date: row.get(3)?,
                total_amount: row.get::<_, Option<f64>>(4)?.unwrap_or_default(),
                total_count: row.get::<_, Option<i64>>(5)?.unwrap_or_default(),
                notes: row.get(6)?,
                created_at: timestamp(row, 7)?,
                updated_at: timestamp(row, 8)?,
                items: items_by_book.remove(&id).unwrap_or_default(),
            })
        })
        .map_err(db_err)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(db_err)?;

    Ok(books)
}

/// Replace the stored giftbook set with `giftbooks`.
///
/// Same reconciliation as records: omitted giftbooks are deleted together
/// with their items, the rest are upserted, and each upserted giftbook gets
/// exactly the submitted items. One transaction covers the whole batch.
pub fn save_giftbooks(conn: &Connection, giftbooks: &[GiftbookInput]) -> Result<SaveSummary> {
    let tx = begin_write(conn)?;
    let mut summary = SaveSummary::default();

    let existing: HashSet<i64> = {
        let mut stmt = tx.prepare("SELECT id FROM giftbooks").map_err(db_err)?;
        let ids = stmt
            .query_map([], |row| row.get(0))
            .map_err(db_err)?
            .collect::<std::result::Result<HashSet<i64>, _>>()
            .map_err(db_err)?;
        ids
    };
    let incoming: HashSet<i64> = giftbooks
        .iter()
        .filter_map(|b| b.giftbook_id().map(GiftbookId::get))
        .collect();

    {
        let mut delete_items = tx
            .prepare_cached("DELETE FROM giftbook_items WHERE giftbook_id = ?")
            .map_err(db_err)?;
        let mut delete_book = tx
            .prepare_cached("DELETE FROM giftbooks WHERE id = ?")
            .map_err(db_err)?;
        for id in existing.difference(&incoming) {
            delete_items.execute([id]).map_err(db_err)?;
            summary.deleted += delete_book.execute([id]).map_err(db_err)?;
        }
    }

    let now = Utc::now().to_rfc3339();
    {
        let mut upsert = tx
            .prepare_cached(
                "INSERT INTO giftbooks (id, name, event_type, event_date, total_amount,
                     total_count, notes, created_at, updated_at)
                 VALUES (:id, :name, :event_type, :event_date, :total_amount,
                     :total_count, :notes, :now, :now)
                 ON CONFLICT(id) DO UPDATE SET
                     name = excluded.name,
                     event_type = excluded.event_type,
                     event_date = excluded.event_date,
                     total_amount = excluded.total_amount,
                     total_count = excluded.total_count,
                     notes = excluded.notes,
                     updated_at = excluded.updated_at",
            )
            .map_err(db_err)?;
        let mut delete_items = tx
            .prepare_cached("DELETE FROM giftbook_items WHERE giftbook_id = ?")
            .map_err(db_err)?;
        let mut insert_item = tx
            .prepare_cached(
                "INSERT INTO giftbook_items (giftbook_id, person_name, amount, notes, created_at)
                 VALUES (:giftbook_id, :person_name, :amount, :notes, :now)",
            )
            .map_err(db_err)?;

        for book in giftbooks {
            let id = book.giftbook_id().map(GiftbookId::get);
            upsert
                .execute(rusqlite::named_params! {
                    ":id": id,
                    ":name": book.name,
                    ":event_type": book.event_type,
                    ":event_date": book.event_date,
                    ":total_amount": book.total_amount,
                    ":total_count": book.total_count,
                    ":notes": book.notes,
                    ":now": now,
                })
                .map_err(db_err)?;

            let book_id = match id {
                Some(id) => {
                    delete_items.execute([id]).map_err(db_err)?;
                    if existing.contains(&id) {
                        summary.updated += 1;
                    } else {
                        summary.inserted += 1;
                    }
                    id
                }
                None => {
                    summary.inserted += 1;
                    tx.last_insert_rowid()
                }
            };

            for item in &book.items {
                insert_item
                    .execute(rusqlite::named_params! {
                        ":giftbook_id": book_id,
                        ":person_name": item.person_name,
                        ":amount": item.amount,
                        ":notes": item.notes,
                        ":now": now,
                    })
                    .map_err(db_err)?;
            }
        }
    }

    tx.commit().map_err(db_err)?;

    Ok(summary)
}
