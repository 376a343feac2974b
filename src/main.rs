use anyhow::Result;
use std::sync::Arc;

use quiz_portal::utils::logging;
use quiz_portal::{App, Config, Console, FileStore, LlmQuizGateway};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);

    let gateway = Arc::new(LlmQuizGateway::new(&config));
    let store = Box::new(FileStore::new(&config.session_dir));

    // 初始化并运行应用
    let app = App::initialize(config, gateway, store).await?;
    Console::new(app).run().await?;

    Ok(())
}
