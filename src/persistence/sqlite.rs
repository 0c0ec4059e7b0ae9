use super::{PersistenceError, PersistenceResult, PlanStore};
use crate::calendar::DATE_FORMAT;
use crate::plan::DailyTask;
use crate::{Item, Plan, Settings};
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::{Mutex, MutexGuard};

pub struct SqlitePlanStore {
    connection: Mutex<Connection>,
}

impl SqlitePlanStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS plan_settings (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                settings_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS items (
                position INTEGER PRIMARY KEY,
                id TEXT NOT NULL UNIQUE,
                item_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS daily_tasks (
                date TEXT PRIMARY KEY,
                task_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn lock(&self) -> PersistenceResult<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| PersistenceError::InvalidData("sqlite connection poisoned".into()))
    }

    fn save_settings(tx: &rusqlite::Transaction, settings: &Settings) -> PersistenceResult<()> {
        let json = serde_json::to_string(settings)?;
        tx.execute("DELETE FROM plan_settings", [])?;
        tx.execute(
            "INSERT INTO plan_settings (id, settings_json) VALUES (1, ?1)",
            params![json],
        )?;
        Ok(())
    }

    fn save_items(tx: &rusqlite::Transaction, items: &[Item]) -> PersistenceResult<()> {
        tx.execute("DELETE FROM items", [])?;
        let mut stmt = tx.prepare("INSERT INTO items (position, id, item_json) VALUES (?1, ?2, ?3)")?;
        for (position, item) in items.iter().enumerate() {
            let json = serde_json::to_string(item)?;
            stmt.execute(params![position as i64, item.id, json])?;
        }
        Ok(())
    }

    fn save_tasks(tx: &rusqlite::Transaction, tasks: &[DailyTask]) -> PersistenceResult<()> {
        tx.execute("DELETE FROM daily_tasks", [])?;
        let mut stmt = tx.prepare("INSERT INTO daily_tasks (date, task_json) VALUES (?1, ?2)")?;
        for task in tasks {
            let json = serde_json::to_string(task)?;
            stmt.execute(params![task.date.format(DATE_FORMAT).to_string(), json])?;
        }
        Ok(())
    }

    /// Drop everything stored, leaving an empty schema.
    pub fn clear(&self) -> PersistenceResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM plan_settings", [])?;
        tx.execute("DELETE FROM items", [])?;
        tx.execute("DELETE FROM daily_tasks", [])?;
        tx.commit()?;
        Ok(())
    }
}

impl PlanStore for SqlitePlanStore {
    fn save_plan(&self, plan: &Plan) -> PersistenceResult<()> {
        super::validate_plan(plan)?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        Self::save_settings(&tx, &plan.settings)?;
        Self::save_items(&tx, &plan.source_items)?;
        Self::save_tasks(&tx, &plan.tasks)?;
        tx.commit()?;
        Ok(())
    }

    fn load_plan(&self) -> PersistenceResult<Option<Plan>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare("SELECT settings_json FROM plan_settings WHERE id = 1")?;
        let settings_json: Option<String> = stmt.query_row([], |row| row.get(0)).optional()?;
        let Some(settings_json) = settings_json else {
            return Ok(None);
        };
        let settings: Settings = serde_json::from_str(&settings_json)?;

        let mut stmt = conn.prepare("SELECT item_json FROM items ORDER BY position ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut source_items = Vec::new();
        for json in rows {
            source_items.push(serde_json::from_str::<Item>(&json?)?);
        }

        // ISO dates sort lexically in calendar order.
        let mut stmt = conn.prepare("SELECT task_json FROM daily_tasks ORDER BY date ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut tasks = Vec::new();
        for json in rows {
            tasks.push(serde_json::from_str::<DailyTask>(&json?)?);
        }

        let plan = Plan {
            settings,
            tasks,
            source_items,
        };
        super::validate_plan(&plan)?;
        Ok(Some(plan))
    }
}
