use crate::features::billing::MonthWindow;
use crate::features::dashboard::{
    build_snapshot, render_dashboard, render_rows, render_summary, watch_dashboard,
};
use crate::features::subscriptions::{
    add_subscription, build_draft, delete_subscription, edit_subscription, list_subscriptions,
    SubscriptionPatch, SubscriptionStore,
};
use crate::shared::config::{BillingSettings, StoreBackend};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::{format_amount, now_in};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StoreArg {
    /// ローカルのSQLiteファイル
    Local,
    /// APIサーバー
    Remote,
}

impl From<StoreArg> for StoreBackend {
    fn from(value: StoreArg) -> Self {
        match value {
            StoreArg::Local => StoreBackend::Local,
            StoreArg::Remote => StoreBackend::Remote,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "subscription-tracker",
    version,
    about = "サブスクリプションの支払い予定と月々の支出を管理します"
)]
pub struct Cli {
    /// 保存先（省略時は SUBSCRIPTION_STORE、既定は local）
    #[arg(long, value_enum, global = true)]
    pub store: Option<StoreArg>,

    /// SQLiteファイルのパス（省略時は SUBSCRIPTION_DB_PATH またはアプリデータディレクトリ）
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// サブスクリプション一覧と次回支払いまでの日数を表示
    List,

    /// サブスクリプションを追加
    Add {
        /// サービス名
        #[arg(long)]
        title: String,
        /// 1周期あたりの金額
        #[arg(long, allow_negative_numbers = true)]
        amount: f64,
        /// 初回請求日（YYYY-MM-DD、省略時は今日）
        #[arg(long)]
        start_date: Option<String>,
        /// 請求周期（日数、省略時は30）
        #[arg(long, allow_negative_numbers = true)]
        period: Option<i64>,
    },

    /// サブスクリプションを編集
    Edit {
        /// 対象のID
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        amount: Option<f64>,
        #[arg(long)]
        start_date: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        period: Option<i64>,
    },

    /// サブスクリプションを削除
    Delete {
        /// 対象のID
        id: String,
    },

    /// 合計金額と月別の支出内訳を表示
    Summary {
        /// 対象月（YYYY-MM、省略時は今月）
        #[arg(long)]
        month: Option<String>,
    },

    /// ダッシュボードを定期的に再表示（Ctrl+Cで終了）
    Watch {
        /// 再計算間隔（秒、省略時は REFRESH_INTERVAL_SECONDS）
        #[arg(long)]
        interval: Option<u64>,
    },
}

/// サブコマンドを実行し、結果を `out` に出力する
///
/// # 引数
/// * `command` - 実行するサブコマンド
/// * `store` - サブスクリプションの保存先
/// * `settings` - 請求表示設定
/// * `out` - 出力先
pub async fn execute<W: Write>(
    command: Command,
    store: &dyn SubscriptionStore,
    settings: &BillingSettings,
    out: &mut W,
) -> AppResult<()> {
    match command {
        Command::List => {
            let subscriptions = list_subscriptions(store).await?;
            let snapshot =
                build_snapshot(&subscriptions, &now_in(settings.timezone), settings, None)?;
            render_rows(out, &snapshot)?;
        }
        Command::Add {
            title,
            amount,
            start_date,
            period,
        } => {
            let draft = build_draft(&title, amount, start_date, period, settings.timezone);
            let created = add_subscription(store, draft).await?;
            writeln!(
                out,
                "追加しました: {} ({}, {} {}, {}から{}日ごと)",
                created.id,
                created.title,
                format_amount(created.amount),
                settings.currency.source,
                created.start_date,
                created.period
            )?;
        }
        Command::Edit {
            id,
            title,
            amount,
            start_date,
            period,
        } => {
            let patch = SubscriptionPatch {
                title,
                amount,
                start_date,
                period,
            };
            let updated = edit_subscription(store, &id, patch).await?;
            writeln!(
                out,
                "更新しました: {} ({}, {} {}, {}から{}日ごと)",
                updated.id,
                updated.title,
                format_amount(updated.amount),
                settings.currency.source,
                updated.start_date,
                updated.period
            )?;
        }
        Command::Delete { id } => {
            delete_subscription(store, &id).await?;
            writeln!(out, "削除しました: {id}")?;
        }
        Command::Summary { month } => {
            let window = month.as_deref().map(MonthWindow::parse).transpose()?;
            let subscriptions = list_subscriptions(store).await?;
            let snapshot =
                build_snapshot(&subscriptions, &now_in(settings.timezone), settings, window)?;
            render_summary(out, &snapshot)?;
        }
        Command::Watch { interval } => {
            let mut settings = settings.clone();
            if let Some(seconds) = interval {
                if seconds == 0 {
                    return Err(AppError::validation("間隔は1秒以上で指定してください"));
                }
                settings.refresh_interval = Duration::from_secs(seconds);
            }

            watch_dashboard(store, &settings, None, |snapshot| {
                writeln!(out, "=== {} ===", snapshot.generated_at)?;
                render_dashboard(&mut *out, snapshot)?;
                writeln!(out)?;
                Ok(())
            })
            .await?;
        }
    }

    out.flush()?;
    Ok(())
}
