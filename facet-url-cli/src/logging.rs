use tracing_subscriber::EnvFilter;

/// 初始化日志，输出到标准错误；`RUST_LOG` 可覆盖默认级别
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
