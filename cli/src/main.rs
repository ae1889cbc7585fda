pub mod cli;
pub mod commands;
pub mod console;

use std::ops::ControlFlow;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use common::logger::init_logger;
use monitor::{
    alert::ServerChanNotifier,
    config::{AppConfig, ConfigSource, RETENTION, SharedConfig},
    db::Db,
    engine::{Collaborators, Monitor, MonitorHandle},
    history::{HistoryStore, Sample, SqliteHistoryStore},
    sinks::{LogBuffer, LogSink},
    source::JijinhaoClient,
};

use cli::Cli;
use commands::{Command, HELP};
use console::{ConsoleAlert, ConsoleDisplay, format_stats};

/// Everything the stdin command loop talks to.
struct Console {
    handle: MonitorHandle,
    config: SharedConfig,
    log: Arc<LogBuffer>,
    display: Arc<ConsoleDisplay>,
}

impl Console {
    fn apply(&self, cmd: Command) -> ControlFlow<()> {
        match cmd {
            Command::Start => {
                // rejection reason already went to the log
                let _ = self.handle.start();
            }
            Command::Pause => {
                if !self.handle.pause() {
                    println!("not running");
                }
            }
            Command::Toggle => {
                let _ = self.handle.toggle();
            }
            Command::Status => self.print_status(),
            Command::Stats => {
                let stats = self.display.latest().and_then(|d| d.stats);
                println!("{}", format_stats(stats));
            }
            Command::Log(n) => {
                for line in self.log.tail(n) {
                    println!("{line}");
                }
            }
            Command::Set(field, value) => {
                self.log
                    .append(&format!("{} set to {:?}", field.label(), value));
                self.config.update(|c| field.apply(c, value));
            }
            Command::Notify(on) => {
                self.config.update(|c| c.notify_enabled = on);
                self.log.append(if on {
                    "Notifications on"
                } else {
                    "Notifications off"
                });
            }
            Command::Key(key) => {
                self.config.update(|c| c.notify_key = key);
                self.log.append("Notification key updated");
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    fn print_status(&self) {
        let raw = self.config.current();
        println!("state:        {:?}", self.handle.run_state());
        println!("buy avg:      {}", raw.buy_avg_price);
        println!("target buy:   {}", raw.target_buy_price);
        println!("target sell:  {}", raw.target_sell_price);
        println!("interval (s): {}", raw.interval_seconds);
        println!("window (min): {}", raw.stats_window_minutes);
        println!(
            "notify:       {} (key {})",
            raw.notify_enabled,
            if raw.notify_key.is_empty() { "unset" } else { "set" }
        );
        println!("recent polls: {:?}", self.handle.failure_flags());
        match self.display.latest() {
            Some(d) => println!("last price:   {:.2} (profit {:.2})", d.price, d.profit),
            None => println!("last price:   -"),
        }
    }

    async fn run(&self) -> anyhow::Result<()> {
        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for ctrl-c");
            }
            info!("Shutdown signal received");
        };
        self.serve(BufReader::new(tokio::io::stdin()), shutdown).await
    }

    /// Reads commands until `quit` or `shutdown`. Closed input only stops
    /// the reading; the monitor keeps running until shutdown.
    async fn serve<R, S>(&self, input: R, shutdown: S) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        S: Future<Output = ()>,
    {
        let mut lines = input.lines();
        let mut input_open = true;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                line = lines.next_line(), if input_open => {
                    let Some(line) = line? else {
                        info!("stdin closed, running until shutdown");
                        input_open = false;
                        continue;
                    };
                    match Command::parse(&line) {
                        Ok(Some(cmd)) => {
                            if self.apply(cmd).is_break() {
                                break;
                            }
                        }
                        Ok(None) => {}
                        Err(e) => println!("{e}"),
                    }
                }
                _ = &mut shutdown => break,
            }
        }

        Ok(())
    }
}

/// Opens the history database and runs the start-up retention sweep.
async fn init_store(cfg: &AppConfig) -> anyhow::Result<(Arc<SqliteHistoryStore>, Vec<Sample>)> {
    let db = Db::connect(&cfg.database_url).await?;
    db.migrate().await?;

    let store = Arc::new(SqliteHistoryStore::from_pool(db.pool));

    let loaded = match store.load(RETENTION).await {
        Ok(samples) => samples,
        Err(e) => {
            warn!(error = ?e, "failed to load price history, starting empty");
            Vec::new()
        }
    };

    Ok((store, loaded))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let is_production = std::env::var("APP_ENV").unwrap_or_default() == "production";
    init_logger("goldwatch", is_production);

    info!("Starting goldwatch...");

    let app = AppConfig::from_env();
    let (store, loaded) = init_store(&app).await?;
    info!(samples = loaded.len(), "price history loaded");

    let config = SharedConfig::new(cli.initial_config());
    let log = Arc::new(LogBuffer::new(cli.max_log_lines, true));
    let display = Arc::new(ConsoleDisplay::default());

    let (monitor, handle) = Monitor::new(
        Collaborators {
            config: Arc::new(config.clone()),
            source: Arc::new(JijinhaoClient::new(app.quote_url, app.product)?),
            store,
            notifier: Arc::new(ServerChanNotifier::new()?),
            local_alert: Arc::new(ConsoleAlert),
            display: display.clone(),
            log: log.clone(),
        },
        loaded,
    );

    tokio::spawn(monitor.run());

    if cli.autostart {
        let _ = handle.start();
    }

    println!("{HELP}");

    let console = Console {
        handle,
        config,
        log,
        display,
    };
    console.run().await
}
