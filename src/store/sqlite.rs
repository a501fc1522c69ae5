use crate::errors::{AppError, AppResult};
use crate::models::{AppSettings, Entity, EntityKind, EntityRef};
use crate::store::{MemoryStore, ObjectStore, Predicate, SortOrder};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const SCHEMA_SQL: &str = include_str!("schema.sql");

#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
    working: MemoryStore,
}

impl SqliteStore {
    pub fn open(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| AppError::Io(err.to_string()))?;
        }
        let conn = Connection::open(path).map_err(AppError::from)?;
        conn.execute_batch(SCHEMA_SQL).map_err(AppError::from)?;

        let mut store = Self {
            conn: Mutex::new(conn),
            db_path: path.to_path_buf(),
            working: MemoryStore::new(),
        };
        store.load_entities()?;
        store.ensure_default_settings()?;

        tracing::debug!(path = %store.db_path.display(), entities = store.working.len(), "object store opened");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn load_entities(&mut self) -> AppResult<()> {
        let rows = {
            let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
            let mut statement = conn.prepare("SELECT kind, id, body_json FROM entities ORDER BY kind, id")?;
            let rows = statement
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        for (kind, id, body) in rows {
            match serde_json::from_str::<Entity>(&body) {
                Ok(entity) => self.working.load(entity),
                Err(error) => {
                    tracing::warn!(kind = %kind, id = %id, error = %error, "skipping unreadable entity row");
                }
            }
        }
        Ok(())
    }

    fn ensure_default_settings(&self) -> AppResult<()> {
        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        conn.execute(
            "INSERT OR IGNORE INTO settings (key, value_json, updated_at) VALUES ('app', ?1, ?2)",
            params![
                serde_json::to_string(&AppSettings::default())?,
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    pub fn get_settings(&self) -> AppResult<AppSettings> {
        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        let raw = conn
            .query_row(
                "SELECT value_json FROM settings WHERE key = 'app'",
                [],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        match raw {
            Some(raw) => Ok(serde_json::from_str::<AppSettings>(&raw).unwrap_or_default()),
            None => Ok(AppSettings::default()),
        }
    }

    pub fn update_settings(&self, update: serde_json::Value) -> AppResult<AppSettings> {
        let current = self.get_settings()?;
        let mut merged = serde_json::to_value(current)?;
        merge_json(&mut merged, update);
        let settings: AppSettings =
            serde_json::from_value(merged).map_err(|error| AppError::Config(error.to_string()))?;

        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        conn.execute(
            "INSERT INTO settings (key, value_json, updated_at)
             VALUES ('app', ?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json, updated_at = excluded.updated_at",
            params![serde_json::to_string(&settings)?, Utc::now().to_rfc3339()],
        )?;

        Ok(settings)
    }

    /// Writes one change set in a single transaction. Nothing is applied on error.
    fn commit(&self, written: &[Entity], deleted: &[EntityRef]) -> AppResult<()> {
        let now = Utc::now().to_rfc3339();
        let mut conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        let tx = conn.transaction()?;
        for entity in written {
            tx.execute(
                "INSERT INTO entities (kind, id, body_json, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(kind, id) DO UPDATE SET body_json = excluded.body_json, updated_at = excluded.updated_at",
                params![entity.kind().as_str(), entity.id(), serde_json::to_string(entity)?, now],
            )?;
        }
        for reference in deleted {
            tx.execute(
                "DELETE FROM entities WHERE kind = ?1 AND id = ?2",
                params![reference.kind.as_str(), reference.id],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    #[cfg(test)]
    fn persisted_count(&self, kind: EntityKind) -> AppResult<i64> {
        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM entities WHERE kind = ?1",
            [kind.as_str()],
            |row| row.get(0),
        )?)
    }
}

impl ObjectStore for SqliteStore {
    fn fetch(&self, kind: EntityKind, predicate: &Predicate, sort: SortOrder) -> AppResult<Vec<Entity>> {
        self.working.fetch(kind, predicate, sort)
    }

    fn get(&self, reference: &EntityRef) -> AppResult<Option<Entity>> {
        self.working.get(reference)
    }

    fn put(&mut self, entity: Entity) -> AppResult<()> {
        self.working.put(entity)
    }

    fn delete(&mut self, reference: &EntityRef) -> AppResult<bool> {
        self.working.delete(reference)
    }

    fn save(&mut self) -> AppResult<()> {
        if !self.working.has_changes() {
            return Ok(());
        }
        let (written, deleted) = self.working.pending_changes();
        self.commit(&written, &deleted)?;
        self.working.mark_committed();

        tracing::debug!(written = written.len(), deleted = deleted.len(), "object store committed");
        Ok(())
    }
}

fn merge_json(target: &mut serde_json::Value, update: serde_json::Value) {
    match (target, update) {
        (serde_json::Value::Object(target_map), serde_json::Value::Object(update_map)) => {
            for (key, value) in update_map {
                merge_json(target_map.entry(key).or_insert(serde_json::Value::Null), value);
            }
        }
        (target, update) => {
            *target = update;
        }
    }
}
