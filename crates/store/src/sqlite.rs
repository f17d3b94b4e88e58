//! SQLite store implementation.
//!
//! Uses a single SQLite database file with one table per record category:
//! `samples`, `agents`, `messages`, `positions`, `strategies`, and
//! `mission_progress`. Extractor queries are read-only filtered lookups
//! keyed by (sample, agent); they order by row id so that timestamp ties
//! replay in insertion order, which keeps pipeline output reproducible.

use crate::records::{
    AgentRow, FetchedMessages, FetchedPositions, FetchedStrategies, MessageRow, PositionRow,
    ProgressRow, StrategyRow, TableCounts,
};
use chrono::Utc;
use missionloom_core::error::StoreError;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow, SqliteSynchronous,
};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use tracing::{debug, info};

/// The mission-record store.
///
/// Cloning is cheap (the pool is reference-counted), but a pipeline pass
/// over one agent must own its calls sequentially — the store performs no
/// per-agent synchronization.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (and if necessary create) a store at the given path.
    ///
    /// The schema is created automatically on first open.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Storage(format!("failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("mission store opened at {}", path.display());
        Ok(store)
    }

    /// Create from an existing pool (useful for testing with `:memory:`).
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Create tables and indexes.
    async fn run_migrations(&self) -> Result<(), StoreError> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS samples (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                hash       TEXT UNIQUE NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS agents (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                sample_id INTEGER NOT NULL REFERENCES samples(id),
                agent_no  INTEGER NOT NULL,
                role      TEXT NOT NULL,
                mission   TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                sample_id   INTEGER NOT NULL REFERENCES samples(id),
                timestamp   INTEGER NOT NULL,
                sender_id   INTEGER NOT NULL REFERENCES agents(id),
                receiver_id INTEGER NOT NULL REFERENCES agents(id),
                body        TEXT NOT NULL,
                kind        TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS positions (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                sample_id INTEGER NOT NULL REFERENCES samples(id),
                agent_id  INTEGER NOT NULL REFERENCES agents(id),
                timestamp INTEGER NOT NULL,
                pos_x     INTEGER NOT NULL,
                pos_y     INTEGER NOT NULL,
                kind      TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS strategies (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                sample_id INTEGER NOT NULL REFERENCES samples(id),
                agent_id  INTEGER NOT NULL REFERENCES agents(id),
                timestamp INTEGER NOT NULL,
                text      TEXT NOT NULL,
                scope     TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS mission_progress (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                sample_id INTEGER NOT NULL REFERENCES samples(id),
                agent_id  INTEGER NOT NULL REFERENCES agents(id),
                timestamp INTEGER NOT NULL,
                progress  TEXT NOT NULL
            )
            "#,
            "CREATE INDEX IF NOT EXISTS idx_messages_sender ON messages(sample_id, sender_id)",
            "CREATE INDEX IF NOT EXISTS idx_messages_receiver ON messages(sample_id, receiver_id)",
            "CREATE INDEX IF NOT EXISTS idx_positions_agent ON positions(sample_id, agent_id)",
            "CREATE INDEX IF NOT EXISTS idx_strategies_agent ON strategies(sample_id, agent_id)",
            "CREATE INDEX IF NOT EXISTS idx_progress_agent ON mission_progress(sample_id, agent_id)",
        ];

        for sql in statements {
            sqlx::query(sql)
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::MigrationFailed(format!("{e}")))?;
        }

        debug!("mission store migrations complete");
        Ok(())
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ── Extractor queries ─────────────────────────────────────────────────

    /// All sample ids, ascending.
    pub async fn list_sample_ids(&self) -> Result<Vec<i64>, StoreError> {
        let rows = sqlx::query("SELECT id FROM samples ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("list samples: {e}")))?;
        rows.iter()
            .map(|r| r.try_get("id").map_err(|e| StoreError::QueryFailed(format!("id column: {e}"))))
            .collect()
    }

    /// All agents belonging to one sample, ascending by row id.
    pub async fn fetch_agents(&self, sample_id: i64) -> Result<Vec<AgentRow>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, sample_id, agent_no, role, mission FROM agents \
             WHERE sample_id = ?1 ORDER BY id",
        )
        .bind(sample_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("fetch agents: {e}")))?;
        rows.iter().map(row_to_agent).collect()
    }

    /// Messages for one (sample, agent) pair, split into sent and received.
    ///
    /// Each row is joined with the counterpart agent so converters can emit
    /// the peer's `AGENT#<n>` token without a second lookup.
    pub async fn fetch_messages(
        &self,
        sample_id: i64,
        agent_id: i64,
    ) -> Result<FetchedMessages, StoreError> {
        let sent = sqlx::query(
            "SELECT m.id, m.timestamp, a.agent_no AS peer_agent_no, m.body, m.kind \
             FROM messages m JOIN agents a ON a.id = m.receiver_id \
             WHERE m.sample_id = ?1 AND m.sender_id = ?2 ORDER BY m.id",
        )
        .bind(sample_id)
        .bind(agent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("fetch sent messages: {e}")))?;

        let received = sqlx::query(
            "SELECT m.id, m.timestamp, a.agent_no AS peer_agent_no, m.body, m.kind \
             FROM messages m JOIN agents a ON a.id = m.sender_id \
             WHERE m.sample_id = ?1 AND m.receiver_id = ?2 ORDER BY m.id",
        )
        .bind(sample_id)
        .bind(agent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("fetch received messages: {e}")))?;

        Ok(FetchedMessages {
            sent: sent.iter().map(row_to_message).collect::<Result<_, _>>()?,
            received: received.iter().map(row_to_message).collect::<Result<_, _>>()?,
        })
    }

    /// Position fixes for one (sample, agent) pair, split into the agent's
    /// own track and targets in its field of view.
    pub async fn fetch_positions(
        &self,
        sample_id: i64,
        agent_id: i64,
    ) -> Result<FetchedPositions, StoreError> {
        let ego = self.fetch_positions_of_kind(sample_id, agent_id, "agent").await?;
        let targets = self.fetch_positions_of_kind(sample_id, agent_id, "target").await?;
        Ok(FetchedPositions { ego, targets })
    }

    async fn fetch_positions_of_kind(
        &self,
        sample_id: i64,
        agent_id: i64,
        kind: &str,
    ) -> Result<Vec<PositionRow>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, timestamp, pos_x, pos_y, kind FROM positions \
             WHERE sample_id = ?1 AND agent_id = ?2 AND kind = ?3 ORDER BY id",
        )
        .bind(sample_id)
        .bind(agent_id)
        .bind(kind)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("fetch positions ({kind}): {e}")))?;
        rows.iter().map(row_to_position).collect()
    }

    /// Strategy updates for one (sample, agent) pair, split by scope.
    pub async fn fetch_strategies(
        &self,
        sample_id: i64,
        agent_id: i64,
    ) -> Result<FetchedStrategies, StoreError> {
        let local = self.fetch_strategies_of_scope(sample_id, agent_id, "local").await?;
        let global = self.fetch_strategies_of_scope(sample_id, agent_id, "global").await?;
        Ok(FetchedStrategies { local, global })
    }

    async fn fetch_strategies_of_scope(
        &self,
        sample_id: i64,
        agent_id: i64,
        scope: &str,
    ) -> Result<Vec<StrategyRow>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, timestamp, text, scope FROM strategies \
             WHERE sample_id = ?1 AND agent_id = ?2 AND scope = ?3 ORDER BY id",
        )
        .bind(sample_id)
        .bind(agent_id)
        .bind(scope)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("fetch strategies ({scope}): {e}")))?;
        rows.iter().map(row_to_strategy).collect()
    }

    /// Mission-progress notes for one (sample, agent) pair.
    pub async fn fetch_progress(
        &self,
        sample_id: i64,
        agent_id: i64,
    ) -> Result<Vec<ProgressRow>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, timestamp, progress FROM mission_progress \
             WHERE sample_id = ?1 AND agent_id = ?2 ORDER BY id",
        )
        .bind(sample_id)
        .bind(agent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("fetch progress: {e}")))?;
        rows.iter().map(row_to_progress).collect()
    }

    /// One agent row by id — the metadata record for its timeline.
    pub async fn fetch_agent(&self, agent_id: i64) -> Result<Option<AgentRow>, StoreError> {
        let row = sqlx::query(
            "SELECT id, sample_id, agent_no, role, mission FROM agents WHERE id = ?1",
        )
        .bind(agent_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("fetch agent: {e}")))?;
        row.as_ref().map(row_to_agent).transpose()
    }

    /// Per-table row counts.
    pub async fn counts(&self) -> Result<TableCounts, StoreError> {
        Ok(TableCounts {
            samples: self.count_table("samples").await?,
            agents: self.count_table("agents").await?,
            messages: self.count_table("messages").await?,
            positions: self.count_table("positions").await?,
            strategies: self.count_table("strategies").await?,
            mission_progress: self.count_table("mission_progress").await?,
        })
    }

    async fn count_table(&self, table: &str) -> Result<i64, StoreError> {
        // Table names come from the fixed list above, never from input.
        let sql = format!("SELECT COUNT(*) AS n FROM {table}");
        let row = sqlx::query(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("count {table}: {e}")))?;
        row.try_get("n")
            .map_err(|e| StoreError::QueryFailed(format!("count column: {e}")))
    }

    // ── Insert helpers (used by ingestion) ────────────────────────────────

    /// Look up a sample id by export-file hash.
    pub async fn find_sample_by_hash(&self, hash: &str) -> Result<Option<i64>, StoreError> {
        let row = sqlx::query("SELECT id FROM samples WHERE hash = ?1")
            .bind(hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("find sample by hash: {e}")))?;
        row.map(|r| {
            r.try_get("id")
                .map_err(|e| StoreError::QueryFailed(format!("id column: {e}")))
        })
        .transpose()
    }

    pub(crate) async fn insert_sample(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        hash: &str,
    ) -> Result<i64, StoreError> {
        let result = sqlx::query("INSERT INTO samples (hash, created_at) VALUES (?1, ?2)")
            .bind(hash)
            .bind(Utc::now().to_rfc3339())
            .execute(&mut **tx)
            .await
            .map_err(|e| StoreError::Storage(format!("insert sample: {e}")))?;
        Ok(result.last_insert_rowid())
    }

    pub(crate) async fn insert_agent(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        sample_id: i64,
        agent_no: i64,
        role: &str,
        mission: &str,
    ) -> Result<i64, StoreError> {
        let result = sqlx::query(
            "INSERT INTO agents (sample_id, agent_no, role, mission) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(sample_id)
        .bind(agent_no)
        .bind(role)
        .bind(mission)
        .execute(&mut **tx)
        .await
        .map_err(|e| StoreError::Storage(format!("insert agent: {e}")))?;
        Ok(result.last_insert_rowid())
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) async fn insert_message(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        sample_id: i64,
        timestamp: i64,
        sender_id: i64,
        receiver_id: i64,
        body: &str,
        kind: &str,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO messages (sample_id, timestamp, sender_id, receiver_id, body, kind) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(sample_id)
        .bind(timestamp)
        .bind(sender_id)
        .bind(receiver_id)
        .bind(body)
        .bind(kind)
        .execute(&mut **tx)
        .await
        .map_err(|e| StoreError::Storage(format!("insert message: {e}")))?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) async fn insert_position(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        sample_id: i64,
        agent_id: i64,
        timestamp: i64,
        pos_x: i64,
        pos_y: i64,
        kind: &str,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO positions (sample_id, agent_id, timestamp, pos_x, pos_y, kind) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(sample_id)
        .bind(agent_id)
        .bind(timestamp)
        .bind(pos_x)
        .bind(pos_y)
        .bind(kind)
        .execute(&mut **tx)
        .await
        .map_err(|e| StoreError::Storage(format!("insert position: {e}")))?;
        Ok(())
    }

    pub(crate) async fn insert_strategy(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        sample_id: i64,
        agent_id: i64,
        timestamp: i64,
        text: &str,
        scope: &str,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO strategies (sample_id, agent_id, timestamp, text, scope) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(sample_id)
        .bind(agent_id)
        .bind(timestamp)
        .bind(text)
        .bind(scope)
        .execute(&mut **tx)
        .await
        .map_err(|e| StoreError::Storage(format!("insert strategy: {e}")))?;
        Ok(())
    }

    pub(crate) async fn insert_progress(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        sample_id: i64,
        agent_id: i64,
        timestamp: i64,
        progress: &str,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO mission_progress (sample_id, agent_id, timestamp, progress) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(sample_id)
        .bind(agent_id)
        .bind(timestamp)
        .bind(progress)
        .execute(&mut **tx)
        .await
        .map_err(|e| StoreError::Storage(format!("insert progress: {e}")))?;
        Ok(())
    }
}

// ── Row mapping ───────────────────────────────────────────────────────────

fn column<T>(row: &SqliteRow, name: &str) -> Result<T, StoreError>
where
    T: for<'r> sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(name)
        .map_err(|e| StoreError::QueryFailed(format!("{name} column: {e}")))
}

fn row_to_message(row: &SqliteRow) -> Result<MessageRow, StoreError> {
    Ok(MessageRow {
        id: column(row, "id")?,
        timestamp: column(row, "timestamp")?,
        peer_agent_no: column(row, "peer_agent_no")?,
        body: column(row, "body")?,
        kind: column(row, "kind")?,
    })
}

fn row_to_position(row: &SqliteRow) -> Result<PositionRow, StoreError> {
    Ok(PositionRow {
        id: column(row, "id")?,
        timestamp: column(row, "timestamp")?,
        pos_x: column(row, "pos_x")?,
        pos_y: column(row, "pos_y")?,
        kind: column(row, "kind")?,
    })
}

fn row_to_strategy(row: &SqliteRow) -> Result<StrategyRow, StoreError> {
    Ok(StrategyRow {
        id: column(row, "id")?,
        timestamp: column(row, "timestamp")?,
        text: column(row, "text")?,
        scope: column(row, "scope")?,
    })
}

fn row_to_progress(row: &SqliteRow) -> Result<ProgressRow, StoreError> {
    Ok(ProgressRow {
        id: column(row, "id")?,
        timestamp: column(row, "timestamp")?,
        progress: column(row, "progress")?,
    })
}

fn row_to_agent(row: &SqliteRow) -> Result<AgentRow, StoreError> {
    Ok(AgentRow {
        id: column(row, "id")?,
        sample_id: column(row, "sample_id")?,
        agent_no: column(row, "agent_no")?,
        role: column(row, "role")?,
        mission: column(row, "mission")?,
    })
}
