//! Memo rows in the local cache.

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{Result, VibitsError};
use crate::memo::Memo;

const MEMO_COLUMNS: &str = "id, content, created_at, updated_at";

fn memo_from_row(row: &Row<'_>) -> rusqlite::Result<Memo> {
    Ok(Memo {
        id: row.get(0)?,
        content: row.get(1)?,
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
    })
}

/// Create a new local memo with a UUID v7 id and current timestamps.
pub fn insert_memo(conn: &Connection, content: &str) -> Result<Memo> {
    let id = uuid::Uuid::now_v7().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO memos (id, content, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
        params![id, content, now],
    )?;

    Ok(Memo {
        id,
        content: content.to_string(),
        created_at: Some(now.clone()),
        updated_at: Some(now),
    })
}

/// Insert or overwrite a memo exactly as given.
pub fn upsert_memo(conn: &Connection, memo: &Memo) -> Result<()> {
    conn.execute(
        "INSERT INTO memos (id, content, created_at, updated_at) VALUES (?1, ?2, ?3, ?4) \
         ON CONFLICT(id) DO UPDATE SET content = excluded.content, \
         created_at = excluded.created_at, updated_at = excluded.updated_at",
        params![memo.id, memo.content, memo.created_at, memo.updated_at],
    )?;
    Ok(())
}

/// Replace a memo's content and bump its update timestamp.
pub fn update_memo_content(conn: &Connection, id: &str, content: &str) -> Result<Memo> {
    let now = chrono::Utc::now().to_rfc3339();
    let rows = conn.execute(
        "UPDATE memos SET content = ?1, updated_at = ?2 WHERE id = ?3",
        params![content, now, id],
    )?;
    if rows == 0 {
        return Err(VibitsError::NotFound(id.to_string()));
    }
    get_memo(conn, id)?.ok_or_else(|| VibitsError::NotFound(id.to_string()))
}

pub fn delete_memo(conn: &Connection, id: &str) -> Result<()> {
    let rows = conn.execute("DELETE FROM memos WHERE id = ?1", params![id])?;
    if rows == 0 {
        return Err(VibitsError::NotFound(id.to_string()));
    }
    Ok(())
}

pub fn get_memo(conn: &Connection, id: &str) -> Result<Option<Memo>> {
    let memo = conn
        .query_row(
            &format!("SELECT {MEMO_COLUMNS} FROM memos WHERE id = ?1"),
            params![id],
            memo_from_row,
        )
        .optional()?;
    Ok(memo)
}

pub fn memo_exists(conn: &Connection, id: &str) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM memos WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// List memos newest first. `limit = None` returns everything.
pub fn list_memos(conn: &Connection, limit: Option<usize>) -> Result<Vec<Memo>> {
    // SQLite treats a negative LIMIT as "no limit"
    let limit = limit.map(|l| l as i64).unwrap_or(-1);
    let mut stmt = conn.prepare(&format!(
        "SELECT {MEMO_COLUMNS} FROM memos \
         ORDER BY COALESCE(created_at, updated_at) DESC, id DESC LIMIT ?1"
    ))?;

    let memos = stmt
        .query_map(params![limit], memo_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(memos)
}

pub fn count_memos(conn: &Connection) -> Result<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM memos", [], |row| row.get(0))?;
    Ok(count as u64)
}

/// Swap the whole memo table for `memos` in one transaction.
pub fn replace_all_memos(conn: &mut Connection, memos: &[Memo]) -> Result<usize> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM memos", [])?;
    for memo in memos {
        upsert_memo(&tx, memo)?;
    }
    tx.commit()?;
    Ok(memos.len())
}

/// Delete every cached memo. Returns the number removed.
pub fn clear_memos(conn: &Connection) -> Result<usize> {
    Ok(conn.execute("DELETE FROM memos", [])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[test]
    fn insert_and_get() {
        let conn = db::open_memory_database().unwrap();
        let memo = insert_memo(&conn, "first thought").unwrap();

        let loaded = get_memo(&conn, &memo.id).unwrap().unwrap();
        assert_eq!(loaded, memo);
        assert!(loaded.created_at.is_some());
        assert!(memo_exists(&conn, &memo.id).unwrap());
    }

    #[test]
    fn upsert_overwrites() {
        let conn = db::open_memory_database().unwrap();
        let memo = Memo::new("m1", "v1").created("2024-01-01T00:00:00Z");
        upsert_memo(&conn, &memo).unwrap();
        upsert_memo(&conn, &Memo::new("m1", "v2").created("2024-01-01T00:00:00Z")).unwrap();

        assert_eq!(count_memos(&conn).unwrap(), 1);
        assert_eq!(get_memo(&conn, "m1").unwrap().unwrap().content, "v2");
    }

    #[test]
    fn update_and_delete_missing_report_not_found() {
        let conn = db::open_memory_database().unwrap();
        assert!(matches!(
            update_memo_content(&conn, "nope", "x"),
            Err(VibitsError::NotFound(_))
        ));
        assert!(matches!(delete_memo(&conn, "nope"), Err(VibitsError::NotFound(_))));
    }

    #[test]
    fn update_bumps_updated_at() {
        let conn = db::open_memory_database().unwrap();
        upsert_memo(
            &conn,
            &Memo::new("m1", "old")
                .created("2024-01-01T00:00:00Z")
                .updated("2024-01-01T00:00:00Z"),
        )
        .unwrap();

        let updated = update_memo_content(&conn, "m1", "new").unwrap();
        assert_eq!(updated.content, "new");
        assert_eq!(updated.created_at.as_deref(), Some("2024-01-01T00:00:00Z"));
        assert_ne!(updated.updated_at.as_deref(), Some("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn list_is_newest_first_and_limited() {
        let conn = db::open_memory_database().unwrap();
        upsert_memo(&conn, &Memo::new("a", "a").created("2024-01-01T00:00:00Z")).unwrap();
        upsert_memo(&conn, &Memo::new("c", "c").created("2024-01-03T00:00:00Z")).unwrap();
        upsert_memo(&conn, &Memo::new("b", "b").updated("2024-01-02T00:00:00Z")).unwrap();

        let ids: Vec<String> = list_memos(&conn, None).unwrap().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);

        assert_eq!(list_memos(&conn, Some(2)).unwrap().len(), 2);
    }

    #[test]
    fn replace_all_swaps_contents() {
        let mut conn = db::open_memory_database().unwrap();
        insert_memo(&conn, "local only").unwrap();

        let fresh = vec![Memo::new("r1", "remote one"), Memo::new("r2", "remote two")];
        assert_eq!(replace_all_memos(&mut conn, &fresh).unwrap(), 2);

        assert_eq!(count_memos(&conn).unwrap(), 2);
        assert!(get_memo(&conn, "r1").unwrap().is_some());
        assert_eq!(clear_memos(&conn).unwrap(), 2);
    }
}
