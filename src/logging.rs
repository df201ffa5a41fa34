//! 日志初始化：`RUST_LOG` 优先，否则默认 info，`--verbose` 时为 debug

use tracing_subscriber::EnvFilter;

/// 未设置 `RUST_LOG` 时使用的过滤规则
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "seminario_rs=debug,info"
    } else {
        "info"
    }
}

/// 初始化全局日志，输出到stderr。重复调用时静默忽略。
pub fn init(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init();
}
