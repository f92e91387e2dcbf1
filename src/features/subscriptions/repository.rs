use super::models::{Subscription, SubscriptionDraft};
use super::store::{publish, SubscriptionEvent, SubscriptionStore, EVENT_CHANNEL_CAPACITY};
use crate::shared::database::initialize_database;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::{current_timestamp, nanoid::generate_subscription_id};
use async_trait::async_trait;
use chrono_tz::Tz;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

const SELECT_COLUMNS: &str =
    "SELECT id, title, amount, start_date, period, created_at, updated_at FROM subscriptions";

fn map_row(row: &Row<'_>) -> rusqlite::Result<Subscription> {
    Ok(Subscription {
        id: row.get(0)?,
        title: row.get(1)?,
        amount: row.get(2)?,
        start_date: row.get(3)?,
        period: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

/// サブスクリプションを作成する
///
/// # 引数
/// * `conn` - データベース接続
/// * `draft` - 保存する下書き（IDは無視され、新しいnanoIdが採番される）
/// * `now` - 作成日時（RFC3339形式）
///
/// # 戻り値
/// 作成されたサブスクリプション、または失敗時はエラー
pub fn create(conn: &Connection, draft: &SubscriptionDraft, now: &str) -> AppResult<Subscription> {
    let id = generate_subscription_id();

    conn.execute(
        "INSERT INTO subscriptions (id, title, amount, start_date, period, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![id, draft.title, draft.amount, draft.start_date, draft.period, now, now],
    )?;

    find_by_id(conn, &id)
}

/// IDでサブスクリプションを取得する
pub fn find_by_id(conn: &Connection, id: &str) -> AppResult<Subscription> {
    conn.query_row(
        &format!("{SELECT_COLUMNS} WHERE id = ?1"),
        params![id],
        map_row,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => {
            AppError::NotFound(format!("ID {id} のサブスクリプションが見つかりません"))
        }
        _ => AppError::Database(e.to_string()),
    })
}

/// サブスクリプション一覧を取得する（作成日時の新しい順）
pub fn find_all(conn: &Connection) -> AppResult<Vec<Subscription>> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_COLUMNS} ORDER BY created_at DESC, rowid DESC"
    ))?;
    let subscriptions = stmt.query_map([], map_row)?;

    subscriptions
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::Database(e.to_string()))
}

/// サブスクリプションを更新する
///
/// # 引数
/// * `conn` - データベース接続
/// * `id` - サブスクリプションID
/// * `draft` - 更新内容
/// * `now` - 更新日時（RFC3339形式）
pub fn update(
    conn: &Connection,
    id: &str,
    draft: &SubscriptionDraft,
    now: &str,
) -> AppResult<Subscription> {
    let rows_affected = conn.execute(
        "UPDATE subscriptions
         SET title = ?1, amount = ?2, start_date = ?3, period = ?4, updated_at = ?5
         WHERE id = ?6",
        params![draft.title, draft.amount, draft.start_date, draft.period, now, id],
    )?;

    if rows_affected == 0 {
        return Err(AppError::NotFound(format!(
            "ID {id} のサブスクリプションが見つかりません"
        )));
    }

    find_by_id(conn, id)
}

/// サブスクリプションを削除する
pub fn delete(conn: &Connection, id: &str) -> AppResult<()> {
    let rows_affected = conn.execute("DELETE FROM subscriptions WHERE id = ?1", params![id])?;

    if rows_affected == 0 {
        return Err(AppError::NotFound(format!(
            "ID {id} のサブスクリプションが見つかりません"
        )));
    }

    Ok(())
}

/// SQLiteファイルに保存するサブスクリプションストア
pub struct LocalStore {
    db_connection: Arc<Mutex<Connection>>,
    events: broadcast::Sender<SubscriptionEvent>,
    timezone: Tz,
}

impl LocalStore {
    /// 既存の接続からストアを作成する
    ///
    /// # 引数
    /// * `db_connection` - テーブル作成済みのデータベース接続
    /// * `timezone` - 作成日時・更新日時の記録に使うタイムゾーン
    pub fn new(db_connection: Arc<Mutex<Connection>>, timezone: Tz) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            db_connection,
            events,
            timezone,
        }
    }

    /// データベースファイルを開いてストアを作成する
    pub fn open(database_path: &Path, timezone: Tz) -> AppResult<Self> {
        let conn = initialize_database(database_path)?;
        Ok(Self::new(Arc::new(Mutex::new(conn)), timezone))
    }

    fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> AppResult<T>) -> AppResult<T> {
        let conn = self
            .db_connection
            .lock()
            .map_err(|e| AppError::concurrency(format!("データベースロック取得失敗: {e}")))?;
        f(&conn)
    }
}

#[async_trait]
impl SubscriptionStore for LocalStore {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn list(&self) -> AppResult<Vec<Subscription>> {
        let subscriptions = self.with_connection(find_all)?;
        log::debug!("ローカルからサブスクリプションを取得しました: count={}", subscriptions.len());
        Ok(subscriptions)
    }

    async fn save(&self, draft: SubscriptionDraft) -> AppResult<Subscription> {
        let now = current_timestamp(self.timezone);

        match draft.id.as_deref() {
            Some(id) => {
                let updated = self.with_connection(|conn| update(conn, id, &draft, &now))?;
                log::info!("サブスクリプションを更新しました: id={}", updated.id);
                publish(&self.events, SubscriptionEvent::Updated(updated.clone()));
                Ok(updated)
            }
            None => {
                let created = self.with_connection(|conn| create(conn, &draft, &now))?;
                log::info!("サブスクリプションを作成しました: id={}", created.id);
                publish(&self.events, SubscriptionEvent::Inserted(created.clone()));
                Ok(created)
            }
        }
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        if id.trim().is_empty() {
            return Err(AppError::validation("削除するIDを指定してください"));
        }

        self.with_connection(|conn| delete(conn, id))?;
        log::info!("サブスクリプションを削除しました: id={id}");
        publish(&self.events, SubscriptionEvent::Deleted { id: id.to_string() });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SubscriptionEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::database::create_tables;
    use crate::shared::utils::nanoid::is_valid_nanoid;
    use tempfile::TempDir;

    fn memory_store() -> LocalStore {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        LocalStore::new(Arc::new(Mutex::new(conn)), Tz::UTC)
    }

    fn draft(title: &str) -> SubscriptionDraft {
        SubscriptionDraft::new(title, 10.0, "2024-03-01", 30)
    }

    #[tokio::test]
    async fn test_save_creates_with_nanoid() {
        let store = memory_store();

        let created = store.save(draft("Netflix")).await.unwrap();

        assert!(is_valid_nanoid(&created.id));
        assert_eq!(created.title, "Netflix");
        assert_eq!(created.period, 30);
        assert!(!created.created_at.is_empty());
        assert_eq!(created.created_at, created.updated_at);
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = memory_store();
        store.save(draft("Netflix")).await.unwrap();
        store.save(draft("Spotify")).await.unwrap();
        store.save(draft("Hulu")).await.unwrap();

        let titles: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.title)
            .collect();

        assert_eq!(titles, vec!["Hulu", "Spotify", "Netflix"]);
    }

    #[tokio::test]
    async fn test_save_with_id_updates() {
        let store = memory_store();
        let created = store.save(draft("Netflix")).await.unwrap();

        let mut edit = draft("Netflix Premium");
        edit.id = Some(created.id.clone());
        edit.amount = 15.0;
        let updated = store.save(edit).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "Netflix Premium");
        assert_eq!(updated.amount, 15.0);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_save_with_unknown_id_is_not_found() {
        let store = memory_store();
        let mut edit = draft("Ghost");
        edit.id = Some("missing".to_string());

        let result = store.save(edit).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = memory_store();
        let created = store.save(draft("Netflix")).await.unwrap();

        store.delete(&created.id).await.unwrap();

        assert!(store.list().await.unwrap().is_empty());
        assert!(matches!(
            store.delete(&created.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_requires_id() {
        let store = memory_store();
        assert!(matches!(
            store.delete("  ").await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_events_are_published() {
        let store = memory_store();
        let mut events = store.subscribe();

        let created = store.save(draft("Netflix")).await.unwrap();
        let mut edit = draft("Netflix 4K");
        edit.id = Some(created.id.clone());
        let updated = store.save(edit).await.unwrap();
        store.delete(&created.id).await.unwrap();

        assert_eq!(
            events.recv().await.unwrap(),
            SubscriptionEvent::Inserted(created.clone())
        );
        assert_eq!(
            events.recv().await.unwrap(),
            SubscriptionEvent::Updated(updated)
        );
        assert_eq!(
            events.recv().await.unwrap(),
            SubscriptionEvent::Deleted { id: created.id }
        );
    }

    #[tokio::test]
    async fn test_open_persists_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("subscriptions.db");

        {
            let store = LocalStore::open(&db_path, Tz::UTC).unwrap();
            store.save(draft("Netflix")).await.unwrap();
        }

        let reopened = LocalStore::open(&db_path, Tz::UTC).unwrap();
        let subscriptions = reopened.list().await.unwrap();
        assert_eq!(subscriptions.len(), 1);
        assert_eq!(subscriptions[0].title, "Netflix");
    }
}
