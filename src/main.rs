use clap::Parser;
use subscription_tracker_lib::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = subscription_tracker_lib::run(cli).await {
        log::error!("コマンドの実行に失敗しました: {}", e.details());
        eprintln!("エラー: {}", e.user_message());
        std::process::exit(1);
    }
}
