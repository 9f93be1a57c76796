use anyhow::{bail, Result};
use cartera::accounting::{sell, SellRequest};
use cartera::config::AppConfig;
use cartera::fees::{Broker, FeeResolver};
use cartera::market_data::iol::IolProvider;
use cartera::market_data::MarketDataProvider;
use cartera::screener::{dollar_mep, screen, BuySignal};
use cartera::store::csv_store::CsvStore;
use cartera::store::LotStore;
use cartera::types::{normalize_ticker, Lot, LotId};
use cartera::valuation::{evaluate, SellSignal, Valuation};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::collections::BTreeSet;
use tracing::Level;
use tracing_subscriber::fmt;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// The log verbosity level
    #[clap(short, long, default_value = "warn")]
    pub verbosity: Level,
    /// The path to the config file
    #[clap(short, long)]
    pub config: String,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Value every open lot at current quotes and show sell alerts
    Portfolio,
    /// Register a purchase as a new lot
    Buy {
        #[clap(long)]
        ticker: String,
        #[clap(long)]
        quantity: u32,
        #[clap(long)]
        price: f64,
        #[clap(long, default_value = "DEFAULT")]
        broker: String,
        /// Acquisition date, defaults to today
        #[clap(long)]
        date: Option<NaiveDate>,
        #[clap(long, default_value_t = 0.0)]
        take_profit: f64,
        #[clap(long, default_value_t = 0.0)]
        stop_loss: f64,
    },
    /// Sell part or all of one lot and log the realized result
    Sell {
        #[clap(long)]
        ticker: String,
        /// Acquisition date of the lot being sold
        #[clap(long)]
        acquired: NaiveDate,
        #[clap(long)]
        quantity: u32,
        #[clap(long)]
        price: f64,
        /// Acquisition price, to pick between same-day lots
        #[clap(long)]
        price_hint: Option<f64>,
        /// Sale date, defaults to today
        #[clap(long)]
        date: Option<NaiveDate>,
    },
    /// Set or clear a lot's take-profit/stop-loss thresholds
    Alerts {
        #[clap(long)]
        ticker: String,
        #[clap(long)]
        acquired: NaiveDate,
        /// Acquisition price identifying the lot
        #[clap(long)]
        price: f64,
        #[clap(long, default_value_t = 0.0)]
        take_profit: f64,
        #[clap(long, default_value_t = 0.0)]
        stop_loss: f64,
    },
    /// Show the closed-trade log and the total realized result
    History,
    /// Run the RSI/drawdown buy screener over a ticker panel
    Screen {
        /// Panel name from the config; all panels plus holdings when omitted
        #[clap(long)]
        panel: Option<String>,
    },
    /// Show the MEP dollar implied by the AL30/GD30 bond pairs
    Mep,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = fmt().with_max_level(args.verbosity).finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    let config = AppConfig::deserialize_from_file(&args.config)?;
    let mut store = CsvStore::new(&config.store.portfolio_path, &config.store.history_path);
    let fees = FeeResolver::new(config.fees.clone());

    match args.command {
        Command::Portfolio => show_portfolio(&config, &store, &fees).await,
        Command::Buy {
            ticker,
            quantity,
            price,
            broker,
            date,
            take_profit,
            stop_loss,
        } => {
            let lot = Lot {
                ticker: normalize_ticker(&ticker),
                acquired: date.unwrap_or_else(|| Local::now().date_naive()),
                quantity,
                price,
                broker: Broker::parse(&broker),
                take_profit,
                stop_loss,
            };
            store.add_lot(lot.clone())?;
            println!("Registered {} x{} @ {:.2} ({})", lot.ticker, lot.quantity, lot.price, lot.broker);
            Ok(())
        }
        Command::Sell {
            ticker,
            acquired,
            quantity,
            price,
            price_hint,
            date,
        } => {
            let request = SellRequest {
                ticker: normalize_ticker(&ticker),
                acquired,
                price_hint,
                quantity,
                sale_price: price,
                sale_date: date.unwrap_or_else(|| Local::now().date_naive()),
            };
            let lots = store.list_open_lots()?;
            let outcome = sell(&lots, &request, &fees)?;
            store.apply_sale(&outcome.trade, &outcome.mutation)?;
            println!(
                "Sold {} x{} @ {:.2}: realized {:+.2} (cost {:.2}, net {:.2})",
                outcome.trade.ticker,
                outcome.trade.quantity,
                outcome.trade.sale_price,
                outcome.trade.realized_result,
                outcome.trade.cost_basis,
                outcome.trade.net_proceeds,
            );
            Ok(())
        }
        Command::Alerts {
            ticker,
            acquired,
            price,
            take_profit,
            stop_loss,
        } => {
            let id = LotId {
                ticker: normalize_ticker(&ticker),
                acquired,
                price,
            };
            store.update_alerts(&id, take_profit, stop_loss)?;
            println!("Alerts for {id}: take-profit {take_profit:.2}, stop-loss {stop_loss:.2}");
            Ok(())
        }
        Command::History => show_history(&store),
        Command::Screen { panel } => run_screener(&config, &store, panel).await,
        Command::Mep => show_mep(&config).await,
    }
}

fn provider(config: &AppConfig) -> Result<IolProvider> {
    match &config.iol {
        Some(creds) => Ok(IolProvider::new(
            "IOL".to_string(),
            creds.username.clone(),
            creds.password.clone(),
        )),
        None => bail!("This command needs live quotes; add [iol] credentials to the config"),
    }
}

async fn show_portfolio(config: &AppConfig, store: &CsvStore, fees: &FeeResolver) -> Result<()> {
    let lots = store.list_open_lots()?;
    if lots.is_empty() {
        println!("Portfolio is empty.");
        return Ok(());
    }

    let tickers: Vec<String> = lots
        .iter()
        .map(|lot| lot.ticker.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let prices = provider(config)?.current_prices(&tickers).await?;

    println!(
        "{:<10} {:<11} {:>6} {:>10} {:>10} {:>12} {:>12} {:>8}  {}",
        "TICKER", "ACQUIRED", "QTY", "P.BUY", "P.NOW", "COST", "NET GAIN", "%NET", "SIGNAL"
    );
    for row in evaluate(&lots, &prices, fees) {
        match row.valuation {
            Valuation::Priced(marks) => println!(
                "{:<10} {:<11} {:>6} {:>10.2} {:>10.2} {:>12.2} {:>+12.2} {:>7.2}%  {}",
                row.ticker,
                row.acquired.to_string(),
                row.quantity,
                row.price,
                marks.current_price,
                marks.cost_basis,
                marks.unrealized_gain,
                marks.unrealized_gain_pct.unwrap_or(0.0) * 100.0,
                signal_label(marks.signal),
            ),
            Valuation::PriceMissing => println!(
                "{:<10} {:<11} {:>6} {:>10.2} {:>10} {:>12} {:>12} {:>8}  PRICE MISSING",
                row.ticker,
                row.acquired.to_string(),
                row.quantity,
                row.price,
                "--",
                "--",
                "--",
                "--",
            ),
        }
    }
    Ok(())
}

fn show_history(store: &CsvStore) -> Result<()> {
    let trades = store.list_closed_trades()?;
    if trades.is_empty() {
        println!("No closed trades yet.");
        return Ok(());
    }
    let mut total = 0.0;
    for trade in &trades {
        total += trade.realized_result;
        println!(
            "{:<10} {} -> {}  x{:<5} buy {:>10.2} sell {:>10.2}  result {:+.2} ({})",
            trade.ticker,
            trade.acquired,
            trade.sale_date,
            trade.quantity,
            trade.acquisition_price,
            trade.sale_price,
            trade.realized_result,
            trade.broker,
        );
    }
    println!("Total realized: {total:+.2}");
    Ok(())
}

async fn run_screener(config: &AppConfig, store: &CsvStore, panel: Option<String>) -> Result<()> {
    let mut tickers = BTreeSet::new();
    match panel {
        Some(name) => {
            let Some(panel_tickers) = config.panels.get(&name) else {
                bail!("Panel `{name}` not found in config");
            };
            tickers.extend(panel_tickers.iter().map(|t| normalize_ticker(t)));
        }
        None => {
            for panel_tickers in config.panels.values() {
                tickers.extend(panel_tickers.iter().map(|t| normalize_ticker(t)));
            }
            for lot in store.list_open_lots()? {
                tickers.insert(lot.ticker);
            }
        }
    }
    if tickers.is_empty() {
        bail!("Nothing to screen: no panels configured and no open lots");
    }

    let tickers: Vec<String> = tickers.into_iter().collect();
    let history = provider(config)?
        .daily_history(&tickers, config.history_days)
        .await?;

    println!(
        "{:<10} {:>10} {:>6} {:>8} {:>8} {:>8}  {}",
        "TICKER", "PRICE", "RSI", "DD 30D", "DD 5D", "DAY", "SIGNAL"
    );
    for row in screen(&history) {
        println!(
            "{:<10} {:>10.2} {:>6.1} {:>7.1}% {:>7.1}% {:>+7.1}%  {}",
            row.ticker,
            row.price,
            row.rsi,
            row.drawdown_30d * 100.0,
            row.drawdown_5d * 100.0,
            row.day_change * 100.0,
            match row.signal {
                BuySignal::Buy => "BUY",
                BuySignal::Neutral => "-",
            },
        );
    }
    Ok(())
}

async fn show_mep(config: &AppConfig) -> Result<()> {
    let pairs = [
        "AL30.BA".to_string(),
        "AL30D.BA".to_string(),
        "GD30.BA".to_string(),
        "GD30D.BA".to_string(),
    ];
    let history = provider(config)?
        .daily_history(&pairs, config.history_days)
        .await?;
    match dollar_mep(&history) {
        Some(quote) => println!(
            "MEP ${:.2} ({:+.2}% vs previous close)",
            quote.rate,
            quote.day_change * 100.0
        ),
        None => println!("No overlapping bond history to derive the MEP rate."),
    }
    Ok(())
}

fn signal_label(signal: SellSignal) -> &'static str {
    match signal {
        SellSignal::StopLoss => "STOP LOSS",
        SellSignal::TakeProfit => "TAKE PROFIT",
        SellSignal::Neutral => "-",
    }
}
