//! SQLite-backed show cache implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::watch;
use tracing::debug;

use super::{CacheValidity, PageBatch, ShowStore, StorageError, StoreStats};
use crate::model::{RemoteKey, ShowDetail, ShowId, ShowSummary};

/// Columns read for every show query. `w` is the watchlist join.
const SHOW_COLUMNS: &str = "s.id, s.name, s.summary, s.show_type, s.language, s.genres, s.status,
     s.rating, s.image_url, s.large_image_url, s.updated, w.show_id IS NOT NULL";

/// Upsert used outside paging. The existing row's page is left untouched.
const UPSERT_CACHED: &str = "INSERT INTO shows (id, name, summary, show_type, language, genres, status, rating, image_url, large_image_url, updated, page)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, NULL)
     ON CONFLICT(id) DO UPDATE SET
        name = excluded.name,
        summary = excluded.summary,
        show_type = excluded.show_type,
        language = excluded.language,
        genres = excluded.genres,
        status = excluded.status,
        rating = excluded.rating,
        image_url = excluded.image_url,
        large_image_url = excluded.large_image_url,
        updated = excluded.updated";

/// Upsert used by page loads. Assigns the row to the fetched page.
const UPSERT_PAGED: &str = "INSERT INTO shows (id, name, summary, show_type, language, genres, status, rating, image_url, large_image_url, updated, page)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
     ON CONFLICT(id) DO UPDATE SET
        name = excluded.name,
        summary = excluded.summary,
        show_type = excluded.show_type,
        language = excluded.language,
        genres = excluded.genres,
        status = excluded.status,
        rating = excluded.rating,
        image_url = excluded.image_url,
        large_image_url = excluded.large_image_url,
        updated = excluded.updated,
        page = excluded.page";

fn db_err(e: rusqlite::Error) -> StorageError {
    StorageError::OperationFailed(e.to_string())
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// Flattened row as written to the `shows` table.
struct ShowRow<'a> {
    id: ShowId,
    name: &'a str,
    summary: &'a str,
    show_type: &'a str,
    language: &'a str,
    genres: String,
    status: &'a str,
    rating: Option<f64>,
    image_url: &'a str,
    large_image_url: &'a str,
    updated: i64,
}

impl<'a> ShowRow<'a> {
    fn from_summary(s: &'a ShowSummary) -> Self {
        Self {
            id: s.id,
            name: &s.name,
            summary: &s.summary,
            show_type: &s.show_type,
            language: &s.language,
            genres: s.genres.join(","),
            status: &s.status,
            rating: s.rating.map(f64::from),
            image_url: &s.image_url,
            large_image_url: &s.large_image_url,
            updated: s.updated,
        }
    }

    fn from_detail(d: &'a ShowDetail) -> Self {
        Self {
            id: d.id,
            name: &d.name,
            summary: &d.summary,
            show_type: &d.show_type,
            language: &d.language,
            genres: d.genres.join(","),
            status: &d.status,
            rating: d.rating.map(f64::from),
            image_url: &d.small_image_url,
            large_image_url: &d.large_image_url,
            updated: d.updated,
        }
    }

    /// Write the row. `Some(page)` assigns it to the paged collection; `None` keeps its page.
    fn write(&self, conn: &Connection, page: Option<u32>) -> Result<(), StorageError> {
        match page {
            Some(page) => conn.execute(
                UPSERT_PAGED,
                params![
                    self.id,
                    self.name,
                    self.summary,
                    self.show_type,
                    self.language,
                    &self.genres,
                    self.status,
                    self.rating,
                    self.image_url,
                    self.large_image_url,
                    self.updated,
                    page,
                ],
            ),
            None => conn.execute(
                UPSERT_CACHED,
                params![
                    self.id,
                    self.name,
                    self.summary,
                    self.show_type,
                    self.language,
                    &self.genres,
                    self.status,
                    self.rating,
                    self.image_url,
                    self.large_image_url,
                    self.updated,
                ],
            ),
        }
        .map_err(db_err)?;

        Ok(())
    }
}

/// SQLite-backed show cache.
pub struct SqliteShowStore {
    conn: Mutex<Connection>,
    revision: watch::Sender<u64>,
}

impl SqliteShowStore {
    /// Create a new SQLite store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(db_err)?;
        Self::from_connection(conn)
    }

    /// Create an in-memory SQLite store (useful for testing).
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        Self::register_functions(&conn)?;
        Self::initialize_schema(&conn)?;
        let (revision, _) = watch::channel(0);
        Ok(Self {
            conn: Mutex::new(conn),
            revision,
        })
    }

    /// `ulower(text)`: Unicode lower-casing. SQLite's own `lower()` and `LIKE`
    /// only fold ASCII.
    fn register_functions(conn: &Connection) -> Result<(), StorageError> {
        conn.create_scalar_function(
            "ulower",
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let text: Option<String> = ctx.get(0)?;
                Ok(text.map(|t| t.to_lowercase()))
            },
        )
        .map_err(db_err)
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StorageError> {
        conn.execute_batch(
            r#"
            -- Cached shows. page is NULL for rows cached outside paging (search, detail).
            CREATE TABLE IF NOT EXISTS shows (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                summary TEXT NOT NULL DEFAULT '',
                show_type TEXT NOT NULL DEFAULT '',
                language TEXT NOT NULL DEFAULT '',
                genres TEXT NOT NULL DEFAULT '',
                status TEXT NOT NULL DEFAULT '',
                rating REAL,
                image_url TEXT NOT NULL DEFAULT '',
                large_image_url TEXT NOT NULL DEFAULT '',
                updated INTEGER NOT NULL,
                page INTEGER
            );

            CREATE INDEX IF NOT EXISTS idx_shows_page ON shows(page, id);
            CREATE INDEX IF NOT EXISTS idx_shows_name ON shows(name);

            -- Pagination bookkeeping, one row per paged show
            CREATE TABLE IF NOT EXISTS remote_keys (
                show_id INTEGER PRIMARY KEY,
                prev_key INTEGER,
                next_key INTEGER
            );

            -- Watchlist membership
            CREATE TABLE IF NOT EXISTS watchlist (
                show_id INTEGER PRIMARY KEY,
                added_at TEXT NOT NULL
            );

            -- Single-row cache validity marker
            CREATE TABLE IF NOT EXISTS cache_metadata (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                last_refresh TEXT NOT NULL
            );
            "#,
        )
        .map_err(db_err)?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|_| StorageError::OperationFailed("connection lock poisoned".to_string()))
    }

    fn notify(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    fn row_to_summary(row: &rusqlite::Row) -> rusqlite::Result<ShowSummary> {
        let genres: String = row.get(5)?;
        let rating: Option<f64> = row.get(7)?;

        Ok(ShowSummary {
            id: row.get(0)?,
            name: row.get(1)?,
            summary: row.get(2)?,
            show_type: row.get(3)?,
            language: row.get(4)?,
            genres: genres
                .split(',')
                .filter(|g| !g.trim().is_empty())
                .map(|g| g.to_string())
                .collect(),
            status: row.get(6)?,
            rating: rating.map(|r| r as f32),
            image_url: row.get(8)?,
            large_image_url: row.get(9)?,
            updated: row.get(10)?,
            score: 0.0,
            is_in_watchlist: row.get(11)?,
        })
    }

    fn query_shows(
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<ShowSummary>, StorageError> {
        let mut stmt = conn.prepare(sql).map_err(db_err)?;
        let rows = stmt
            .query_map(params, Self::row_to_summary)
            .map_err(db_err)?;

        let mut shows = Vec::new();
        for row in rows {
            shows.push(row.map_err(db_err)?);
        }
        Ok(shows)
    }

    fn count(conn: &Connection, sql: &str) -> Result<u64, StorageError> {
        let n: i64 = conn.query_row(sql, [], |row| row.get(0)).map_err(db_err)?;
        Ok(n as u64)
    }

    fn escape_like(query: &str) -> String {
        let mut escaped = String::with_capacity(query.len() + 2);
        escaped.push('%');
        for c in query.chars() {
            if matches!(c, '%' | '_' | '\\') {
                escaped.push('\\');
            }
            escaped.push(c);
        }
        escaped.push('%');
        escaped
    }
}

impl ShowStore for SqliteShowStore {
    fn store_page(&self, batch: &PageBatch) -> Result<(), StorageError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(db_err)?;

        if batch.refresh_at.is_some() {
            tx.execute_batch(
                "DELETE FROM shows;
                 DELETE FROM remote_keys;",
            )
            .map_err(db_err)?;
        }

        for show in &batch.shows {
            ShowRow::from_summary(show).write(&tx, Some(batch.page))?;
            tx.execute(
                "INSERT OR REPLACE INTO remote_keys (show_id, prev_key, next_key) VALUES (?, ?, ?)",
                params![show.id, batch.prev_key, batch.next_key],
            )
            .map_err(db_err)?;
        }

        if let Some(at) = batch.refresh_at {
            tx.execute(
                "INSERT INTO cache_metadata (id, last_refresh) VALUES (1, ?)
                 ON CONFLICT(id) DO UPDATE SET last_refresh = excluded.last_refresh",
                params![at.to_rfc3339()],
            )
            .map_err(db_err)?;
        }

        tx.commit().map_err(db_err)?;
        drop(conn);

        debug!(
            "Stored page {} ({} shows, refresh={})",
            batch.page,
            batch.shows.len(),
            batch.refresh_at.is_some()
        );
        self.notify();
        Ok(())
    }

    fn shows_window(&self, limit: u32, offset: u32) -> Result<Vec<ShowSummary>, StorageError> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM shows s LEFT JOIN watchlist w ON w.show_id = s.id
             WHERE s.page IS NOT NULL
             ORDER BY s.page ASC, s.id ASC
             LIMIT ?1 OFFSET ?2",
            SHOW_COLUMNS
        );
        Self::query_shows(&conn, &sql, params![limit, offset])
    }

    fn count_shows(&self) -> Result<u64, StorageError> {
        let conn = self.lock()?;
        Self::count(&conn, "SELECT COUNT(*) FROM shows WHERE page IS NOT NULL")
    }

    fn get_show(&self, id: ShowId) -> Result<Option<ShowDetail>, StorageError> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM shows s LEFT JOIN watchlist w ON w.show_id = s.id WHERE s.id = ?",
            SHOW_COLUMNS
        );

        let show = conn
            .query_row(&sql, params![id], Self::row_to_summary)
            .optional()
            .map_err(db_err)?;

        Ok(show.map(ShowDetail::from))
    }

    fn show_page(&self, id: ShowId) -> Result<Option<u32>, StorageError> {
        let conn = self.lock()?;
        let page: Option<Option<u32>> = conn
            .query_row("SELECT page FROM shows WHERE id = ?", params![id], |row| {
                row.get(0)
            })
            .optional()
            .map_err(db_err)?;

        Ok(page.flatten())
    }

    fn search(&self, query: &str) -> Result<Vec<ShowSummary>, StorageError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.lock()?;
        let sql = format!(
            r"SELECT {} FROM shows s LEFT JOIN watchlist w ON w.show_id = s.id
             WHERE ulower(s.name) LIKE ?1 ESCAPE '\'
                OR ulower(s.summary) LIKE ?1 ESCAPE '\'
                OR ulower(s.genres) LIKE ?1 ESCAPE '\'
             ORDER BY s.name ASC, s.id ASC",
            SHOW_COLUMNS
        );
        let pattern = Self::escape_like(&query.to_lowercase());
        Self::query_shows(&conn, &sql, params![pattern])
    }

    fn upsert_shows(&self, shows: &[ShowSummary]) -> Result<(), StorageError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(db_err)?;

        for show in shows {
            ShowRow::from_summary(show).write(&tx, None)?;
        }

        tx.commit().map_err(db_err)?;
        drop(conn);

        self.notify();
        Ok(())
    }

    fn upsert_show_detail(&self, show: &ShowDetail) -> Result<(), StorageError> {
        let conn = self.lock()?;
        ShowRow::from_detail(show).write(&conn, None)?;
        drop(conn);

        self.notify();
        Ok(())
    }

    fn remote_key(&self, show_id: ShowId) -> Result<Option<RemoteKey>, StorageError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT show_id, prev_key, next_key FROM remote_keys WHERE show_id = ?",
            params![show_id],
            |row| {
                Ok(RemoteKey {
                    show_id: row.get(0)?,
                    prev_key: row.get(1)?,
                    next_key: row.get(2)?,
                })
            },
        )
        .optional()
        .map_err(db_err)
    }

    fn cache_validity(&self) -> Result<CacheValidity, StorageError> {
        let conn = self.lock()?;
        let last_refresh: Option<String> = conn
            .query_row(
                "SELECT last_refresh FROM cache_metadata WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_err)?;

        Ok(CacheValidity {
            last_refresh: last_refresh.as_deref().and_then(parse_timestamp),
        })
    }

    fn mark_cache_valid(&self, at: DateTime<Utc>) -> Result<(), StorageError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO cache_metadata (id, last_refresh) VALUES (1, ?)
             ON CONFLICT(id) DO UPDATE SET last_refresh = excluded.last_refresh",
            params![at.to_rfc3339()],
        )
        .map_err(db_err)?;

        Ok(())
    }

    fn add_to_watchlist(&self, id: ShowId) -> Result<(), StorageError> {
        let conn = self.lock()?;
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO watchlist (show_id, added_at) VALUES (?, ?)",
                params![id, Utc::now().to_rfc3339()],
            )
            .map_err(db_err)?;
        drop(conn);

        if inserted > 0 {
            self.notify();
        }
        Ok(())
    }

    fn remove_from_watchlist(&self, id: ShowId) -> Result<(), StorageError> {
        let conn = self.lock()?;
        let removed = conn
            .execute("DELETE FROM watchlist WHERE show_id = ?", params![id])
            .map_err(db_err)?;
        drop(conn);

        if removed > 0 {
            self.notify();
        }
        Ok(())
    }

    fn is_in_watchlist(&self, id: ShowId) -> Result<bool, StorageError> {
        let conn = self.lock()?;
        let exists = conn
            .query_row(
                "SELECT 1 FROM watchlist WHERE show_id = ?",
                params![id],
                |_| Ok(true),
            )
            .optional()
            .map_err(db_err)?;

        Ok(exists.unwrap_or(false))
    }

    fn watchlist_ids(&self) -> Result<Vec<ShowId>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT show_id FROM watchlist ORDER BY added_at ASC, show_id ASC")
            .map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, ShowId>(0))
            .map_err(db_err)?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row.map_err(db_err)?);
        }
        Ok(ids)
    }

    fn watchlist_shows(&self) -> Result<Vec<ShowSummary>, StorageError> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM watchlist w JOIN shows s ON s.id = w.show_id
             ORDER BY w.added_at ASC, s.id ASC",
            SHOW_COLUMNS
        );
        Self::query_shows(&conn, &sql, [])
    }

    fn stats(&self) -> Result<StoreStats, StorageError> {
        let total_shows;
        let paged_shows;
        let remote_keys;
        let watchlist_entries;
        {
            let conn = self.lock()?;
            total_shows = Self::count(&conn, "SELECT COUNT(*) FROM shows")?;
            paged_shows = Self::count(&conn, "SELECT COUNT(*) FROM shows WHERE page IS NOT NULL")?;
            remote_keys = Self::count(&conn, "SELECT COUNT(*) FROM remote_keys")?;
            watchlist_entries = Self::count(&conn, "SELECT COUNT(*) FROM watchlist")?;
        }

        Ok(StoreStats {
            total_shows,
            paged_shows,
            remote_keys,
            watchlist_entries,
            last_refresh: self.cache_validity()?.last_refresh,
        })
    }

    fn clear(&self) -> Result<(), StorageError> {
        let conn = self.lock()?;
        conn.execute_batch(
            "DELETE FROM remote_keys;
             DELETE FROM watchlist;
             DELETE FROM cache_metadata;
             DELETE FROM shows;",
        )
        .map_err(db_err)?;
        drop(conn);

        self.notify();
        Ok(())
    }

    fn changes(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    fn create_test_store() -> SqliteShowStore {
        SqliteShowStore::in_memory().unwrap()
    }

    fn page_batch(page: u32, ids: &[u32], refresh: bool) -> PageBatch {
        PageBatch {
            page,
            shows: ids
                .iter()
                .map(|id| fixtures::show(*id, &format!("Show {}", id)))
                .collect(),
            prev_key: page.checked_sub(1),
            next_key: if ids.is_empty() { None } else { Some(page + 1) },
            refresh_at: refresh.then(Utc::now),
        }
    }

    #[test]
    fn test_store_page_writes_shows_and_keys() {
        let store = create_test_store();
        store.store_page(&page_batch(0, &[1, 2, 3], true)).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_shows, 3);
        assert_eq!(stats.remote_keys, 3);
        assert!(stats.last_refresh.is_some());

        let key = store.remote_key(2).unwrap().unwrap();
        assert_eq!(key.prev_key, None);
        assert_eq!(key.next_key, Some(1));
        assert_eq!(store.show_page(2).unwrap(), Some(0));
    }

    #[test]
    fn test_refresh_clears_previous_rows() {
        let store = create_test_store();
        store.store_page(&page_batch(0, &[1, 2], true)).unwrap();
        store.store_page(&page_batch(1, &[3, 4], false)).unwrap();

        store.store_page(&page_batch(0, &[2, 5], true)).unwrap();

        let ids: Vec<u32> = store
            .shows_window(100, 0)
            .unwrap()
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![2, 5]);
        assert!(store.remote_key(1).unwrap().is_none());
        assert!(store.remote_key(3).unwrap().is_none());
        assert_eq!(store.stats().unwrap().remote_keys, 2);
    }

    #[test]
    fn test_failed_page_write_rolls_back() {
        let store = create_test_store();
        store.store_page(&page_batch(0, &[1, 2], true)).unwrap();

        store
            .lock()
            .unwrap()
            .execute_batch("DROP TABLE remote_keys;")
            .unwrap();

        let result = store.store_page(&page_batch(0, &[7, 8], true));
        assert!(matches!(result, Err(StorageError::OperationFailed(_))));

        // The refresh delete must not be visible
        let ids: Vec<u32> = store
            .shows_window(100, 0)
            .unwrap()
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_window_orders_by_page_then_id() {
        let store = create_test_store();
        store.store_page(&page_batch(1, &[300, 250], true)).unwrap();
        store.store_page(&page_batch(0, &[20, 10], false)).unwrap();

        let ids: Vec<u32> = store
            .shows_window(100, 0)
            .unwrap()
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![10, 20, 250, 300]);

        let second: Vec<u32> = store
            .shows_window(2, 2)
            .unwrap()
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(second, vec![250, 300]);
    }

    #[test]
    fn test_upsert_twice_is_idempotent_and_keeps_page() {
        let store = create_test_store();
        store.store_page(&page_batch(3, &[1], true)).unwrap();

        let shows = vec![fixtures::show(1, "Renamed"), fixtures::show(2, "Fresh")];
        store.upsert_shows(&shows).unwrap();
        store.upsert_shows(&shows).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_shows, 2);
        assert_eq!(store.show_page(1).unwrap(), Some(3));
        assert_eq!(store.show_page(2).unwrap(), None);
        assert_eq!(store.get_show(1).unwrap().unwrap().name, "Renamed");
    }

    #[test]
    fn test_upsert_detail_keeps_page() {
        let store = create_test_store();
        store.store_page(&page_batch(2, &[9], true)).unwrap();

        let mut detail = ShowDetail::from(fixtures::show(9, "Detail"));
        detail.summary = "Full synopsis".to_string();
        store.upsert_show_detail(&detail).unwrap();

        assert_eq!(store.show_page(9).unwrap(), Some(2));
        assert_eq!(store.get_show(9).unwrap().unwrap().summary, "Full synopsis");
    }

    #[test]
    fn test_cached_outside_paging_not_in_window() {
        let store = create_test_store();
        store.upsert_shows(&[fixtures::show(5, "Searched")]).unwrap();

        assert!(store.shows_window(10, 0).unwrap().is_empty());
        assert_eq!(store.count_shows().unwrap(), 0);
        assert!(store.get_show(5).unwrap().is_some());
    }

    #[test]
    fn test_get_show_nonexistent() {
        let store = create_test_store();
        assert!(store.get_show(404).unwrap().is_none());
        assert!(store.show_page(404).unwrap().is_none());
    }

    #[test]
    fn test_genres_round_trip() {
        let store = create_test_store();
        let mut show = fixtures::show(1, "Genres");
        show.genres = vec!["Drama".to_string(), "Science-Fiction".to_string()];
        store.upsert_shows(&[show]).unwrap();

        let detail = store.get_show(1).unwrap().unwrap();
        assert_eq!(detail.genres, vec!["Drama", "Science-Fiction"]);
    }

    #[test]
    fn test_search_matches_name_summary_and_genre() {
        let store = create_test_store();
        let mut by_name = fixtures::show(1, "Person of Interest");
        by_name.genres = vec!["Action".to_string()];
        let mut by_summary = fixtures::show(2, "Bitten");
        by_summary.summary = "A person discovers a werewolf pack".to_string();
        let mut by_genre = fixtures::show(3, "Under the Dome");
        by_genre.genres = vec!["Personal".to_string()];
        let unrelated = fixtures::show(4, "Arrow");
        store
            .upsert_shows(&[by_name, by_summary, by_genre, unrelated])
            .unwrap();

        let mut ids: Vec<u32> = store
            .search("PERSON")
            .unwrap()
            .iter()
            .map(|s| s.id)
            .collect();
        ids.sort();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_search_escapes_like_wildcards() {
        let store = create_test_store();
        store
            .upsert_shows(&[fixtures::show(1, "100% Hotter"), fixtures::show(2, "1000 Ways")])
            .unwrap();

        let results = store.search("100%").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, 1);
    }

    #[test]
    fn test_search_folds_non_ascii_case() {
        let store = create_test_store();
        let mut elite = fixtures::show(1, "Élite");
        elite.genres = vec!["Drama".to_string()];
        let mut olafur = fixtures::show(2, "Arnaldur");
        olafur.summary = "<p>ÓLAFUR returns to Reykjavík.</p>".to_string();
        store.upsert_shows(&[elite, olafur]).unwrap();

        let lower = store.search("élite").unwrap();
        assert_eq!(lower.len(), 1);
        assert_eq!(lower[0].name, "Élite");
        assert_eq!(store.search("ÉLITE").unwrap().len(), 1);

        let by_summary = store.search("ólafur").unwrap();
        assert_eq!(by_summary.len(), 1);
        assert_eq!(by_summary[0].id, 2);
    }

    #[test]
    fn test_search_blank_query() {
        let store = create_test_store();
        store.upsert_shows(&[fixtures::show(1, "Anything")]).unwrap();
        assert!(store.search("   ").unwrap().is_empty());
    }

    #[test]
    fn test_watchlist_membership() {
        let store = create_test_store();
        store.upsert_shows(&[fixtures::show(1, "Watched")]).unwrap();

        assert!(!store.is_in_watchlist(1).unwrap());
        store.add_to_watchlist(1).unwrap();
        store.add_to_watchlist(1).unwrap();
        assert!(store.is_in_watchlist(1).unwrap());
        assert!(store.get_show(1).unwrap().unwrap().is_in_watchlist);

        let watchlist = store.watchlist_shows().unwrap();
        assert_eq!(watchlist.len(), 1);
        assert!(watchlist[0].is_in_watchlist);

        store.remove_from_watchlist(1).unwrap();
        assert!(!store.is_in_watchlist(1).unwrap());
        assert!(store.watchlist_shows().unwrap().is_empty());
    }

    #[test]
    fn test_watchlist_without_cached_row_not_joined() {
        let store = create_test_store();
        store.add_to_watchlist(42).unwrap();

        assert!(store.is_in_watchlist(42).unwrap());
        assert_eq!(store.watchlist_ids().unwrap(), vec![42]);
        assert!(store.watchlist_shows().unwrap().is_empty());
    }

    #[test]
    fn test_cache_validity_marker() {
        let store = create_test_store();
        assert!(store.cache_validity().unwrap().last_refresh.is_none());

        let at = DateTime::parse_from_rfc3339("2026-01-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        store.mark_cache_valid(at).unwrap();
        assert_eq!(store.cache_validity().unwrap().last_refresh, Some(at));
    }

    #[test]
    fn test_writes_bump_revision() {
        let store = create_test_store();
        let rx = store.changes();
        let start = *rx.borrow();

        store.upsert_shows(&[fixtures::show(1, "A")]).unwrap();
        store.add_to_watchlist(1).unwrap();
        // No-op: already present
        store.add_to_watchlist(1).unwrap();

        assert_eq!(*rx.borrow(), start + 2);
    }

    #[test]
    fn test_clear() {
        let store = create_test_store();
        store.store_page(&page_batch(0, &[1, 2], true)).unwrap();
        store.add_to_watchlist(1).unwrap();

        store.clear().unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_shows, 0);
        assert_eq!(stats.remote_keys, 0);
        assert_eq!(stats.watchlist_entries, 0);
        assert!(stats.last_refresh.is_none());
    }

    #[test]
    fn test_on_disk_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");

        {
            let store = SqliteShowStore::new(&path).unwrap();
            store.store_page(&page_batch(0, &[1], true)).unwrap();
            store.add_to_watchlist(1).unwrap();
        }

        let reopened = SqliteShowStore::new(&path).unwrap();
        assert_eq!(reopened.count_shows().unwrap(), 1);
        assert!(reopened.is_in_watchlist(1).unwrap());
    }
}
