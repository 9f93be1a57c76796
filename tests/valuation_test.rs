use cartera::accounting::{sell, SellRequest};
use cartera::valuation::{evaluate, SellSignal, Valuation};
use std::collections::HashMap;

mod common;
use common::{al30_lot, assert_close, date, ggal_lot, resolver};

fn prices(entries: &[(&str, f64)]) -> HashMap<String, f64> {
    entries
        .iter()
        .map(|(t, p)| (t.to_string(), *p))
        .collect()
}

#[test]
fn missing_quote_degrades_one_lot_only() {
    let fees = resolver();
    let lots = vec![ggal_lot(), al30_lot()];
    let rows = evaluate(&lots, &prices(&[("AL30.BA", 55.0)]), &fees);

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].valuation, Valuation::PriceMissing);
    assert!(matches!(rows[1].valuation, Valuation::Priced(_)));
}

#[test]
fn unrealized_gain_matches_a_sale_at_the_same_price() {
    let fees = resolver();
    let lots = vec![ggal_lot()];
    let rows = evaluate(&lots, &prices(&[("GGAL.BA", 120.0)]), &fees);

    let Valuation::Priced(marks) = &rows[0].valuation else {
        panic!("expected a priced valuation");
    };

    let outcome = sell(
        &lots,
        &SellRequest {
            ticker: "GGAL.BA".to_string(),
            acquired: lots[0].acquired,
            price_hint: None,
            quantity: 10,
            sale_price: 120.0,
            sale_date: date("2024-06-01"),
        },
        &fees,
    )
    .unwrap();

    assert_close(marks.cost_basis, outcome.trade.cost_basis);
    assert_close(marks.net_exit_value, outcome.trade.net_proceeds);
    assert_close(marks.unrealized_gain, outcome.trade.realized_result);
}

#[test]
fn bond_market_value_uses_divisor() {
    let fees = resolver();
    let mut bond = al30_lot();
    bond.quantity = 100;
    bond.price = 100.0;
    let mut equity = ggal_lot();
    equity.quantity = 100;
    let lots = vec![bond, equity];

    let rows = evaluate(
        &lots,
        &prices(&[("AL30.BA", 100.0), ("GGAL.BA", 100.0)]),
        &fees,
    );
    let Valuation::Priced(bond_marks) = &rows[0].valuation else {
        panic!("bond should be priced");
    };
    let Valuation::Priced(equity_marks) = &rows[1].valuation else {
        panic!("equity should be priced");
    };
    assert_close(bond_marks.market_value, 100.0);
    assert_close(equity_marks.market_value, 10_000.0);
}

#[test]
fn stop_loss_wins_when_both_thresholds_trigger() {
    let fees = resolver();
    let mut lot = ggal_lot();
    // Degenerate configuration: at 85 the price is at or below the
    // stop-loss and at or above the take-profit.
    lot.stop_loss = 90.0;
    lot.take_profit = 80.0;
    let rows = evaluate(&[lot], &prices(&[("GGAL.BA", 85.0)]), &fees);

    let Valuation::Priced(marks) = &rows[0].valuation else {
        panic!("expected a priced valuation");
    };
    assert_eq!(marks.signal, SellSignal::StopLoss);
}

#[test]
fn take_profit_triggers_at_or_above_threshold() {
    let fees = resolver();
    let mut lot = ggal_lot();
    lot.take_profit = 120.0;
    lot.stop_loss = 80.0;
    let rows = evaluate(&[lot], &prices(&[("GGAL.BA", 120.0)]), &fees);

    let Valuation::Priced(marks) = &rows[0].valuation else {
        panic!("expected a priced valuation");
    };
    assert_eq!(marks.signal, SellSignal::TakeProfit);
}

#[test]
fn unset_thresholds_never_trigger_at_low_prices() {
    let fees = resolver();
    let lot = ggal_lot();
    let rows = evaluate(&[lot], &prices(&[("GGAL.BA", 0.01)]), &fees);

    let Valuation::Priced(marks) = &rows[0].valuation else {
        panic!("expected a priced valuation");
    };
    // Thresholds at 0.0 mean "not configured", not "trigger at zero".
    assert_eq!(marks.signal, SellSignal::Neutral);
}
