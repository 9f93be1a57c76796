use cartera::accounting::{sell, SellRequest};
use cartera::store::csv_store::CsvStore;
use cartera::store::{LotStore, StoreError};
use cartera::types::LotId;
use std::io::Write;
use tempfile::TempDir;

mod common;
use common::{date, ggal_lot, resolver};

fn store_in(dir: &TempDir) -> CsvStore {
    CsvStore::new(
        dir.path().join("portfolio.csv"),
        dir.path().join("history.csv"),
    )
}

#[test]
fn lots_round_trip_with_normalized_tickers() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir);

    let mut lot = ggal_lot();
    lot.ticker = "ggal".to_string();
    store.add_lot(lot).unwrap();

    let lots = store.list_open_lots().unwrap();
    assert_eq!(lots.len(), 1);
    assert_eq!(lots[0].ticker, "GGAL.BA");
    assert_eq!(lots[0].quantity, 10);
}

#[test]
fn empty_store_lists_nothing() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    assert!(store.list_open_lots().unwrap().is_empty());
    assert!(store.list_closed_trades().unwrap().is_empty());
}

#[test]
fn full_sale_removes_the_lot_and_logs_the_trade() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir);
    let fees = resolver();
    store.add_lot(ggal_lot()).unwrap();

    let lots = store.list_open_lots().unwrap();
    let outcome = sell(
        &lots,
        &SellRequest {
            ticker: "GGAL.BA".to_string(),
            acquired: date("2024-01-01"),
            price_hint: None,
            quantity: 10,
            sale_price: 120.0,
            sale_date: date("2024-06-01"),
        },
        &fees,
    )
    .unwrap();
    store.apply_sale(&outcome.trade, &outcome.mutation).unwrap();

    assert!(store.list_open_lots().unwrap().is_empty());
    let trades = store.list_closed_trades().unwrap();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0], outcome.trade);
}

#[test]
fn partial_sale_reduces_remaining_quantity() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir);
    let fees = resolver();
    store.add_lot(ggal_lot()).unwrap();

    let lots = store.list_open_lots().unwrap();
    let outcome = sell(
        &lots,
        &SellRequest {
            ticker: "GGAL.BA".to_string(),
            acquired: date("2024-01-01"),
            price_hint: None,
            quantity: 4,
            sale_price: 120.0,
            sale_date: date("2024-06-01"),
        },
        &fees,
    )
    .unwrap();
    store.apply_sale(&outcome.trade, &outcome.mutation).unwrap();

    let lots = store.list_open_lots().unwrap();
    assert_eq!(lots.len(), 1);
    assert_eq!(lots[0].quantity, 6);
}

#[test]
fn successive_trades_append_to_the_history() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir);
    let fees = resolver();
    store.add_lot(ggal_lot()).unwrap();

    for quantity in [4, 6] {
        let lots = store.list_open_lots().unwrap();
        let outcome = sell(
            &lots,
            &SellRequest {
                ticker: "GGAL.BA".to_string(),
                acquired: date("2024-01-01"),
                price_hint: None,
                quantity,
                sale_price: 120.0,
                sale_date: date("2024-06-01"),
            },
            &fees,
        )
        .unwrap();
        store.apply_sale(&outcome.trade, &outcome.mutation).unwrap();
    }

    assert!(store.list_open_lots().unwrap().is_empty());
    assert_eq!(store.list_closed_trades().unwrap().len(), 2);
}

#[test]
fn alerts_update_in_place() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir);
    let lot = ggal_lot();
    store.add_lot(lot.clone()).unwrap();

    store.update_alerts(&lot.id(), 150.0, 80.0).unwrap();
    let lots = store.list_open_lots().unwrap();
    assert_eq!(lots[0].take_profit, 150.0);
    assert_eq!(lots[0].stop_loss, 80.0);

    store.update_alerts(&lot.id(), 0.0, 0.0).unwrap();
    let lots = store.list_open_lots().unwrap();
    assert_eq!(lots[0].take_profit, 0.0);
}

#[test]
fn mutating_an_unknown_lot_fails() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir);
    store.add_lot(ggal_lot()).unwrap();

    let id = LotId {
        ticker: "YPFD.BA".to_string(),
        acquired: date("2024-01-01"),
        price: 100.0,
    };
    let err = store.delete_lot(&id).unwrap_err();
    assert!(matches!(err, StoreError::LotNotFound(_)));
}

#[test]
fn malformed_rows_are_skipped() {
    let dir = TempDir::new().unwrap();
    let portfolio = dir.path().join("portfolio.csv");
    let mut file = std::fs::File::create(&portfolio).unwrap();
    writeln!(file, "ticker,acquired,quantity,price,broker,take_profit,stop_loss").unwrap();
    writeln!(file, "GGAL.BA,2024-01-01,10,100.0,IOL,0.0,0.0").unwrap();
    writeln!(file, "YPFD.BA,not-a-date,5,abc,IOL,0.0,0.0").unwrap();

    let store = CsvStore::new(portfolio, dir.path().join("history.csv"));
    let lots = store.list_open_lots().unwrap();
    assert_eq!(lots.len(), 1);
    assert_eq!(lots[0].ticker, "GGAL.BA");
}
