use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;
use std::io::Write;
use std::process;

use bmp_stego::{
    cli::{Cli, Commands},
    handler::{handle_decode, handle_encode},
};

fn init_logger(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    Builder::new()
        .format(|buf, record| writeln!(buf, "{} : {}", record.level(), record.args()))
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// 程序的主入口点
///
/// 负责解析命令行参数，并根据 `-e` 或 `-d` 将执行分派到相应的处理函数。
/// 任何失败都以状态码 1 退出。
fn main() -> anyhow::Result<()> {
    // 用法错误同样以状态码 1 退出；--help 与 --version 以 0 退出
    let cli = Cli::try_parse().unwrap_or_else(|e| {
        let code = if e.use_stderr() { 1 } else { 0 };
        let _ = e.print();
        process::exit(code);
    });

    init_logger(cli.verbose);

    match cli.command()? {
        Commands::Encode(args) => handle_encode(args),
        Commands::Decode(args) => handle_decode(args),
    }
}
