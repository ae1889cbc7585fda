use thiserror::Error;

use monitor::config::RawConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Buy,
    TargetBuy,
    TargetSell,
    Interval,
    Window,
}

impl Field {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "buy" => Some(Field::Buy),
            "target-buy" | "tb" => Some(Field::TargetBuy),
            "target-sell" | "ts" => Some(Field::TargetSell),
            "interval" => Some(Field::Interval),
            "window" => Some(Field::Window),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::Buy => "buy average price",
            Field::TargetBuy => "target buy price",
            Field::TargetSell => "target sell price",
            Field::Interval => "interval",
            Field::Window => "stats window",
        }
    }

    /// Stores the raw text; validation happens when the monitor reads it.
    pub fn apply(&self, cfg: &mut RawConfig, value: String) {
        match self {
            Field::Buy => cfg.buy_avg_price = value,
            Field::TargetBuy => cfg.target_buy_price = value,
            Field::TargetSell => cfg.target_sell_price = value,
            Field::Interval => cfg.interval_seconds = value,
            Field::Window => cfg.stats_window_minutes = value,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Pause,
    Toggle,
    Status,
    Stats,
    Log(usize),
    Set(Field, String),
    Notify(bool),
    Key(String),
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command {0:?} (try `help`)")]
    Unknown(String),

    #[error("unknown field {0:?}; expected buy, target-buy, target-sell, interval or window")]
    UnknownField(String),

    #[error("usage: {0}")]
    Usage(&'static str),
}

pub const HELP: &str = "\
commands:
  start | pause | toggle        control monitoring
  status                        run state, form values, last price
  stats                         latest windowed statistics
  log [n]                       last n log lines (default 20)
  set <field> <value>           field: buy, target-buy, target-sell, interval, window
  notify on|off                 push notifications
  key <sendkey>                 ServerChan sendkey
  help | quit";

impl Command {
    /// `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let rest: Vec<&str> = words.collect();

        let cmd = match (verb.to_ascii_lowercase().as_str(), rest.as_slice()) {
            ("start" | "run", []) => Command::Start,
            ("pause" | "stop", []) => Command::Pause,
            ("toggle" | "t", []) => Command::Toggle,
            ("status" | "s", []) => Command::Status,
            ("stats", []) => Command::Stats,
            ("log", []) => Command::Log(20),
            ("log", [n]) => Command::Log(n.parse().map_err(|_| CommandError::Usage("log [n]"))?),
            ("set", [field, value]) => {
                let f = Field::parse(field)
                    .ok_or_else(|| CommandError::UnknownField(field.to_string()))?;
                Command::Set(f, value.to_string())
            }
            ("set", _) => return Err(CommandError::Usage("set <field> <value>")),
            ("notify", ["on"]) => Command::Notify(true),
            ("notify", ["off"]) => Command::Notify(false),
            ("notify", _) => return Err(CommandError::Usage("notify on|off")),
            ("key", [k]) => Command::Key(k.to_string()),
            ("key", []) => Command::Key(String::new()),
            ("help" | "?", _) => Command::Help,
            ("quit" | "exit" | "q", []) => Command::Quit,
            _ => return Err(CommandError::Unknown(line.trim().to_string())),
        };

        Ok(Some(cmd))
    }
}
