use std::io::Write;
use std::path::Path;

use build_receipt::server;
use build_receipt::util::logging::standards::events;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    std::panic::set_hook(Box::new(|panic_info| {
        let payload = panic_info.payload();
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s
        } else {
            "Unknown panic payload"
        };

        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "Unknown location".to_string());

        eprintln!("[PANIC] 程序异常退出");
        eprintln!("位置: {}", location);
        eprintln!("原因: {}", message);
        eprintln!(
            "时间: {}",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        );

        tracing::error!(event = events::PANIC_RAISED, location = %location, reason = %message);

        std::io::stderr().flush().ok();
    }));

    let mut args = std::env::args();
    let _ = args.next();

    match args.next().as_deref() {
        Some("render") | Some("--render") => {
            let output = args.next();
            server::render_page(output.as_deref().map(Path::new))?;
            Ok(())
        }
        Some("json") | Some("--json") => server::print_json(),
        None | Some("serve") | Some("--serve") => server::start_server().await,
        Some(other) => {
            eprintln!("未知命令: {}", other);
            eprintln!("用法: build-receipt [serve | render [PATH] | json]");
            std::process::exit(2);
        }
    }
}
