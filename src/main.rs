use clap::Parser;

mod cli;
mod components;
mod pages;

use cli::Cli;
use taskflow::application::Application;
use taskflow::config::AppConfig;
use taskflow::sync::keyring;

/// Fallback logger when the journal is unavailable.
struct StderrLog;

impl log::Log for StderrLog {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::LevelFilter::Warn
    }
    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            eprintln!("taskflow: {}: {}", record.level(), record.args());
        }
    }
    fn flush(&self) {}
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_path);
    let mut config = AppConfig::load(&config_path);
    if let Some(dir) = &cli.data_dir {
        config.data_directory = dir.clone();
    }
    taskflow::set_debug_logging(config.debug_logging || cli.debug);

    // Log to the systemd user journal (`journalctl --user -t taskflow -f`).
    // Wrapper filters: taskflow at info/debug (per config), everything else at warn.
    {
        struct FilteredJournal {
            inner: systemd_journal_logger::JournalLog,
        }

        impl log::Log for FilteredJournal {
            fn enabled(&self, metadata: &log::Metadata) -> bool {
                if metadata.target().starts_with("taskflow") {
                    let max = if taskflow::debug_logging() {
                        log::LevelFilter::Debug
                    } else {
                        log::LevelFilter::Info
                    };
                    metadata.level() <= max
                } else {
                    metadata.level() <= log::LevelFilter::Warn
                }
            }
            fn log(&self, record: &log::Record) {
                if self.enabled(record.metadata()) {
                    log::Log::log(&self.inner, record);
                }
            }
            fn flush(&self) {
                log::Log::flush(&self.inner);
            }
        }

        // No journal (containers, macOS): warnings and errors go to stderr instead.
        match systemd_journal_logger::JournalLog::new() {
            Ok(journal) => {
                let journal = journal.with_syslog_identifier("taskflow".to_string());
                if log::set_boxed_logger(Box::new(FilteredJournal { inner: journal })).is_ok() {
                    // Global max must be Debug so taskflow debug logs can pass through when toggled
                    log::set_max_level(log::LevelFilter::Debug);
                }
            }
            Err(_) => {
                if log::set_boxed_logger(Box::new(StderrLog)).is_ok() {
                    log::set_max_level(log::LevelFilter::Warn);
                }
            }
        }
    }

    let api_key = keyring::resolve_api_key().await;
    let mut app = Application::from_config(&config, api_key)?;
    if let Err(e) = cli::dispatch(&mut app, cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;

    #[test]
    fn stderr_fallback_keeps_warnings_only() {
        let at = |level| log::Metadata::builder().level(level).target("taskflow").build();
        assert!(StderrLog.enabled(&at(log::Level::Error)));
        assert!(StderrLog.enabled(&at(log::Level::Warn)));
        assert!(!StderrLog.enabled(&at(log::Level::Info)));
        assert!(!StderrLog.enabled(&at(log::Level::Debug)));
    }
}
