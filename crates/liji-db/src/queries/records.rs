//! Gift record queries.
//!
//! Records are saved as a whole set: the client sends every record it wants
//! to keep and [`save_records`] reconciles the table against that set.

use chrono::Utc;
use liji_common::{RecordId, Result};
use rusqlite::Connection;
use std::collections::HashSet;

use super::{begin_write, db_err, timestamp};
use crate::models::{Record, RecordInput, SaveSummary};

const RECORD_COLUMNS: &str = "id, person_name, event_type, event_date, amount, gift_type, notes,
     is_returned, return_date, return_amount, created_at, updated_at";

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<Record> {
    Ok(Record {
        id: RecordId::from(row.get::<_, i64>(0)?),
        person_name: row.get(1)?,
        event_type: row.get(2)?,
        event_date: row.get(3)?,
        amount: row.get(4)?,
        gift_type: row.get(5)?,
        notes: row.get(6)?,
        is_returned: row.get::<_, Option<bool>>(7)?.unwrap_or(false),
        return_date: row.get(8)?,
        return_amount: row.get(9)?,
        created_at: timestamp(row, 10)?,
        updated_at: timestamp(row, 11)?,
    })
}

/// List all records, most recent event first.
pub fn list_records(conn: &Connection) -> Result<Vec<Record>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM records ORDER BY event_date DESC, id ASC"
        ))
        .map_err(db_err)?;

    let records = stmt
        .query_map([], row_to_record)
        .map_err(db_err)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(db_err)?;

    Ok(records)
}

/// Replace the stored record set with `records`.
///
/// Inside one transaction: rows whose id is not in `records` are deleted,
/// records without an id are inserted with a fresh id, and records with an id
/// are inserted or updated in place (keeping their `created_at`). Any failure
/// rolls the whole batch back.
pub fn save_records(conn: &Connection, records: &[RecordInput]) -> Result<SaveSummary> {
    let tx = begin_write(conn)?;
    let mut summary = SaveSummary::default();

    let existing: HashSet<i64> = {
        let mut stmt = tx.prepare("SELECT id FROM records").map_err(db_err)?;
        let ids = stmt
            .query_map([], |row| row.get(0))
            .map_err(db_err)?
            .collect::<std::result::Result<HashSet<i64>, _>>()
            .map_err(db_err)?;
        ids
    };
    let incoming: HashSet<i64> = records
        .iter()
        .filter_map(|r| r.record_id().map(RecordId::get))
        .collect();

    {
        let mut delete = tx
            .prepare_cached("DELETE FROM records WHERE id = ?")
            .map_err(db_err)?;
        for id in existing.difference(&incoming) {
            summary.deleted += delete.execute([id]).map_err(db_err)?;
        }
    }

    let now = Utc::now().to_rfc3339();
    {
        let mut upsert = tx
            .prepare_cached(
                "INSERT INTO records (id, person_name, event_type, event_date, amount, gift_type,
                     notes, is_returned, return_date, return_amount, created_at, updated_at)
                 VALUES (:id, :person_name, :event_type, :event_date, :amount, :gift_type,
                     :notes, :is_returned, :return_date, :return_amount, :now, :now)
                 ON CONFLICT(id) DO UPDATE SET
                     person_name = excluded.person_name,
                     event_type = excluded.event_type,
                     event_date = excluded.event_date,
                     amount = excluded.amount,
                     gift_type = excluded.gift_type,
                     notes = excluded.notes,
                     is_returned = excluded.is_returned,
                     return_date = excluded.return_date,
                     return_amount = excluded.return_amount,
                     updated_at = excluded.updated_at",
            )
            .map_err(db_err)?;

        for record in records {
            let id = record.record_id().map(RecordId::get);
            upsert
                .execute(rusqlite::named_params! {
                    ":id": id,
                    ":person_name": record.person_name,
                    ":event_type": record.event_type,
                    ":event_date": record.event_date,
                    ":amount": record.amount,
                    ":gift_type": record.gift_type,
                    ":notes": record.notes,
                    ":is_returned": record.is_returned,
                    ":return_date": record.return_date,
                    ":return_amount": record.return_amount,
                    ":now": now,
                })
                .map_err(db_err)?;

            match id {
                Some(id) if existing.contains(&id) => summary.updated += 1,
                _ => summary.inserted += 1,
            }
        }
    }

    tx.commit().map_err(db_err)?;

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;

    fn get(conn: &Connection, id: RecordId) -> Option<Record> {
        list_records(conn).unwrap().into_iter().find(|r| r.id == id)
    }

    fn input(id: Option<i64>, name: &str, date: &str, amount: f64) -> RecordInput {
        RecordInput {
            id,
            person_name: name.to_string(),
            event_type: "wedding".to_string(),
            event_date: date.to_string(),
            amount,
            gift_type: None,
            notes: None,
            is_returned: false,
            return_date: None,
            return_amount: None,
        }
    }

    #[test]
    fn test_save_and_list_round_trip() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let mut returned = input(None, "Wang Fang", "2024-03-01", 500.0);
        returned.gift_type = Some("cash".to_string());
        returned.is_returned = true;
        returned.return_date = Some("2024-06-01".to_string());
        returned.return_amount = Some(600.0);

        let batch = vec![input(None, "Li Wei", "2024-05-01", 200.0), returned];
        let summary = save_records(&conn, &batch).unwrap();
        assert_eq!(
            summary,
            SaveSummary {
                inserted: 2,
                updated: 0,
                deleted: 0
            }
        );

        let stored = list_records(&conn).unwrap();
        assert_eq!(stored.len(), 2);

        // Most recent event first
        assert_eq!(stored[0].person_name, "Li Wei");
        assert_eq!(stored[1].person_name, "Wang Fang");
        assert!(stored[1].is_returned);
        assert_eq!(stored[1].return_amount, Some(600.0));
        assert_eq!(stored[1].gift_type.as_deref(), Some("cash"));

        let echoed: Vec<RecordInput> = stored.into_iter().map(Into::into).collect();
        let mut expected = batch.clone();
        expected[0].id = echoed[0].id;
        expected[1].id = echoed[1].id;
        assert_eq!(echoed, expected);
    }

    #[test]
    fn test_omitted_record_is_deleted() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        save_records(
            &conn,
            &[
                input(None, "A", "2024-01-01", 10.0),
                input(None, "B", "2024-01-02", 20.0),
            ],
        )
        .unwrap();
        let stored = list_records(&conn).unwrap();
        let keep = stored.iter().find(|r| r.person_name == "A").unwrap().clone();
        let drop = stored.iter().find(|r| r.person_name == "B").unwrap().clone();

        let summary = save_records(&conn, &[keep.clone().into()]).unwrap();
        assert_eq!(summary.deleted, 1);
        assert_eq!(summary.updated, 1);

        assert!(get(&conn, drop.id).is_none());
        assert!(get(&conn, keep.id).is_some());
    }

    #[test]
    fn test_update_keeps_created_at() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        save_records(&conn, &[input(None, "A", "2024-01-01", 10.0)]).unwrap();
        let original = list_records(&conn).unwrap().remove(0);

        let mut edited: RecordInput = original.clone().into();
        edited.amount = 88.0;
        edited.notes = Some("raised".to_string());
        save_records(&conn, &[edited]).unwrap();

        let updated = get(&conn, original.id).unwrap();
        assert_eq!(updated.amount, 88.0);
        assert_eq!(updated.notes.as_deref(), Some("raised"));
        assert_eq!(updated.created_at, original.created_at);
        assert!(updated.updated_at >= original.updated_at);
    }

    #[test]
    fn test_client_supplied_id_is_kept() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let summary = save_records(&conn, &[input(Some(1700), "A", "2024-01-01", 1.0)]).unwrap();
        assert_eq!(summary.inserted, 1);

        let record = get(&conn, RecordId::from(1700)).unwrap();
        assert_eq!(record.person_name, "A");
    }

    #[test]
    fn test_empty_batch_clears_table() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        save_records(&conn, &[input(None, "A", "2024-01-01", 1.0)]).unwrap();
        let summary = save_records(&conn, &[]).unwrap();

        assert_eq!(summary.deleted, 1);
        assert!(list_records(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_failed_batch_rolls_back() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        save_records(&conn, &[input(None, "Kept", "2024-01-01", 1.0)]).unwrap();
        conn.execute_batch(
            "CREATE TRIGGER reject_boom BEFORE INSERT ON records
             WHEN NEW.person_name = 'boom'
             BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
        )
        .unwrap();

        // Drops "Kept", inserts "New", then fails on "boom".
        let result = save_records(
            &conn,
            &[
                input(None, "New", "2024-02-01", 2.0),
                input(None, "boom", "2024-03-01", 3.0),
            ],
        );
        assert!(result.is_err());

        let stored = list_records(&conn).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].person_name, "Kept");
    }

    #[test]
    fn test_concurrent_saves_serialize() {
        let dir = tempfile::tempdir().unwrap();
        let pool = crate::pool::init_pool(&dir.path().join("liji.db").to_string_lossy()).unwrap();

        let left: Vec<RecordInput> = (1..=40)
            .map(|i| input(Some(i), "left", "2024-01-01", i as f64))
            .collect();
        let right: Vec<RecordInput> = (1001..=1025)
            .map(|i| input(Some(i), "right", "2024-02-01", i as f64))
            .collect();

        std::thread::scope(|scope| {
            for batch in [&left, &right] {
                let pool = pool.clone();
                scope.spawn(move || {
                    let conn = pool.get().unwrap();
                    for _ in 0..25 {
                        save_records(&conn, batch).unwrap();
                    }
                });
            }
        });

        // The last committed batch wins whole; batches never interleave
        let conn = pool.get().unwrap();
        let stored = list_records(&conn).unwrap();
        let names: HashSet<&str> = stored.iter().map(|r| r.person_name.as_str()).collect();
        assert_eq!(names.len(), 1);
        match stored[0].person_name.as_str() {
            "left" => assert_eq!(stored.len(), left.len()),
            _ => assert_eq!(stored.len(), right.len()),
        }
    }
}
