use cfg_if::cfg_if;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};
use tracing_subscriber::util::SubscriberInitExt;

cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        pub fn init() {
            // Browser console via tracing-wasm
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"));

            let wasm_layer = tracing_wasm::WASMLayer::new(tracing_wasm::WASMLayerConfig::default());

            // try_init: the page may call start() again after a hot reload
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(wasm_layer)
                .try_init();

            #[cfg(feature = "console_error_panic_hook")]
            console_error_panic_hook::set_once();
        }
    } else {
        use tracing_appender::non_blocking::WorkerGuard;
        use tracing_subscriber::fmt;
        use std::env;
        use std::io;
        use std::path::Path;
        use once_cell::sync::OnceCell;

        static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

        /// Default log file when RUST_LOG_FILE is unset
        const DEFAULT_LOG_FILE: &str = "logs/gallery.log";

        pub fn init() {
            // RUST_LOG or info
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"));

            let console_layer = fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_level(true)
                .compact();

            let log_path = env::var("RUST_LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
            let log_path = Path::new(&log_path);
            let dir = log_path.parent().unwrap_or(Path::new("."));
            let file_name = log_path
                .file_name()
                .unwrap_or(std::ffi::OsStr::new("gallery.log"));
            let (nb_writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, file_name));
            let _ = FILE_GUARD.set(guard);

            let file_layer = fmt::layer()
                .with_writer(nb_writer)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_level(true)
                .compact();

            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(console_layer)
                .with(file_layer)
                .try_init();

            // Route panics through tracing with a backtrace
            std::panic::set_hook(Box::new(|info| {
                let mut msg = String::new();
                if let Some(loc) = info.location() {
                    msg.push_str(&format!("panic at {}:{}:{} ", loc.file(), loc.line(), loc.column()));
                }
                if let Some(s) = info.payload().downcast_ref::<&str>() { msg.push_str(s); }
                else if let Some(s) = info.payload().downcast_ref::<String>() { msg.push_str(s); }
                else { msg.push_str("<non-string panic>"); }
                let bt = std::backtrace::Backtrace::force_capture();
                tracing::error!("{}\nBacktrace:\n{:?}", msg, bt);
            }));
        }
    }
}
