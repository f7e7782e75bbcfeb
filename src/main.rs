use anyhow::Result;
use clap::Parser;

use mangrove_pulse::cli::Cli;
use mangrove_pulse::{logger, App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置，命令行参数优先
    let mut config = Config::from_env();
    cli.apply(&mut config);

    // 初始化日志
    logger::init_with_verbose(config.verbose_logging);

    // 初始化并运行应用
    let app = App::initialize(config, cli.command.name())?;
    app.run(cli.command, cli.layer).await?;

    Ok(())
}
