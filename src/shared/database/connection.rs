use crate::shared::errors::{AppError, AppResult};
use rusqlite::Connection;
use std::path::Path;

/// データベース接続を初期化し、テーブルを作成する
///
/// # 引数
/// * `database_path` - データベースファイルのパス
///
/// # 戻り値
/// データベース接続、または失敗時はエラー
pub fn initialize_database(database_path: &Path) -> AppResult<Connection> {
    let conn = Connection::open(database_path).map_err(|e| {
        AppError::Database(format!("データベースのオープンに失敗しました: {e}"))
    })?;

    create_tables(&conn)?;

    log::info!("データベースを初期化しました: {database_path:?}");

    Ok(conn)
}

/// データベーステーブルを作成する
///
/// # 引数
/// * `conn` - データベース接続
///
/// # 戻り値
/// 成功時はOk(())、失敗時はエラー
pub fn create_tables(conn: &Connection) -> AppResult<()> {
    create_subscriptions_table(conn)?;
    create_indexes(conn)?;
    Ok(())
}

/// サブスクリプションテーブルを作成する
fn create_subscriptions_table(conn: &Connection) -> AppResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS subscriptions (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            amount REAL NOT NULL CHECK(amount > 0),
            start_date TEXT NOT NULL,
            period INTEGER NOT NULL CHECK(period >= 1),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

/// インデックスを作成する
fn create_indexes(conn: &Connection) -> AppResult<()> {
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_subscriptions_created_at ON subscriptions(created_at)",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_database_creates_file() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let conn = initialize_database(&db_path).unwrap();

        assert!(db_path.exists());
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='subscriptions'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_create_tables_is_repeatable() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();
    }

    #[test]
    fn test_period_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO subscriptions (id, title, amount, start_date, period, created_at, updated_at)
             VALUES ('a', 't', 1.0, '2024-01-01', 0, 'x', 'x')",
            [],
        );
        assert!(result.is_err());
    }
}
