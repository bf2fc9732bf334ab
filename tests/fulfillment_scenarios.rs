//! End-to-end fulfillments against the in-memory ledger.

mod support;

use alloy_primitives::{Address, U256};
use fillwright::application::{Action, ApprovalKind};
use fillwright::domain::{
    ConsiderationItem, DomainError, Fee, FulfillmentStrategy, ItemType, OfferItem, Order,
};
use fillwright::error::{Error, ExecutionError};
use fillwright::testkit::domain::{address, ether, units, OrderBuilder};
use fillwright::testkit::ledger::{FailurePoint, Submission};
use rust_decimal_macros::dec;

use support::market::{
    collection, currency, fee_recipient, fulfiller, offerer, settlement, token_id, Market,
};

fn erc1155_listing_for_eth(amount: u64, price: U256, fee_bps: u16) -> Order {
    OrderBuilder::new(offerer())
        .offer_erc1155(collection(), token_id(), U256::from(amount))
        .consider_native(price, offerer())
        .fees(&[Fee::new(fee_recipient(), fee_bps)])
        .partial()
        .build()
}

fn erc1155_listing_for_usdc(amount: u64, price: U256, fee_bps: u16) -> Order {
    OrderBuilder::new(offerer())
        .offer_erc1155(collection(), token_id(), U256::from(amount))
        .consider_erc20(currency(), price, offerer())
        .fees(&[Fee::new(fee_recipient(), fee_bps)])
        .partial()
        .build()
}

#[tokio::test]
async fn partial_eth_listing_needs_only_the_exchange_call() {
    let market = Market::new();
    market.list_erc1155(10);
    market.ledger.mint_native(fulfiller(), ether(10));
    let order = erc1155_listing_for_eth(10, ether(10), 250);

    let plan = market.planner.plan(market.request(&order, 2)).await.unwrap();

    assert_eq!(plan.len(), 1);
    assert!(plan.actions()[0].is_exchange());
    assert_eq!(plan.exchange().call().value, ether(2));

    plan.execute_all().await.unwrap();

    let ledger = &market.ledger;
    assert_eq!(ledger.erc1155_balance(collection(), token_id(), offerer()), U256::from(8));
    assert_eq!(ledger.erc1155_balance(collection(), token_id(), fulfiller()), U256::from(2));
    assert_eq!(ledger.native_balance(offerer()), ether(dec!(1.95)));
    assert_eq!(ledger.native_balance(fee_recipient()), ether(dec!(0.05)));
    assert_eq!(ledger.native_balance(fulfiller()), ether(8));
}

#[tokio::test]
async fn irrational_unit_price_settles_without_rounding_failure() {
    let market = Market::new();
    market.list_erc1155(3);
    market.ledger.mint_native(fulfiller(), ether(10));
    let price = ether(dec!(3.1415926535897) * dec!(3));
    let order = erc1155_listing_for_eth(3, price, 247);

    let plan = market.planner.plan(market.request(&order, 2)).await.unwrap();
    let value = plan.exchange().call().value;
    plan.execute_all().await.unwrap();

    let ledger = &market.ledger;
    assert_eq!(value, ether(dec!(6.2831853071794)));
    assert_eq!(ledger.erc1155_balance(collection(), token_id(), offerer()), U256::from(1));
    assert_eq!(ledger.erc1155_balance(collection(), token_id(), fulfiller()), U256::from(2));
    assert_eq!(
        ledger.native_balance(offerer()) + ledger.native_balance(fee_recipient()),
        value
    );
    assert_eq!(ledger.native_balance(fulfiller()), ether(10) - value);
}

#[tokio::test]
async fn six_decimal_currency_listing_approves_then_fills() {
    let market = Market::new();
    market.list_erc1155(3);
    market.ledger.mint_erc20(currency(), fulfiller(), units(100, 6));
    let order = erc1155_listing_for_usdc(3, units(dec!(15.51), 6), 243);

    let plan = market.planner.plan(market.request(&order, 2)).await.unwrap();

    assert_eq!(plan.len(), 2);
    let approval = plan.approvals().next().unwrap();
    assert_eq!(approval.token(), currency());
    assert_eq!(approval.operator(), settlement());
    assert_eq!(approval.kind(), ApprovalKind::Allowance { amount: U256::MAX });
    assert!(plan.actions()[1].is_exchange());

    plan.execute_all().await.unwrap();

    let ledger = &market.ledger;
    assert_eq!(ledger.allowance_of(currency(), fulfiller(), settlement()), U256::MAX);
    assert_eq!(ledger.erc20_balance(currency(), offerer()), U256::from(10_088_738));
    assert_eq!(ledger.erc20_balance(currency(), fee_recipient()), U256::from(251_262));
    assert_eq!(ledger.erc20_balance(currency(), fulfiller()), units(dec!(89.66), 6));
    assert_eq!(ledger.erc1155_balance(collection(), token_id(), offerer()), U256::from(1));
    assert_eq!(ledger.erc1155_balance(collection(), token_id(), fulfiller()), U256::from(2));
}

#[tokio::test]
async fn accepting_partial_offer_approves_collection_and_fee_currency() {
    let market = Market::new();
    let ledger = &market.ledger;
    ledger.mint_erc20(currency(), offerer(), ether(3));
    ledger.set_allowance(currency(), offerer(), settlement(), U256::MAX);
    ledger.mint_erc1155(collection(), token_id(), fulfiller(), U256::from(3));
    let order = OrderBuilder::new(offerer())
        .offer_erc20(currency(), ether(3))
        .consider_erc1155(collection(), token_id(), U256::from(3), offerer())
        .consider_erc20(currency(), ether(dec!(0.075)), fee_recipient())
        .partial()
        .build();

    // units of an ERC-20 offer are its base units
    let request = market.request_units(&order, ether(2));
    let plan = market.planner.plan(request).await.unwrap();

    let labels: Vec<&str> = plan.actions().iter().map(Action::label).collect();
    assert_eq!(labels, ["setApprovalForAll", "approve", "fulfill"]);
    assert_eq!(plan.strategy(), FulfillmentStrategy::Advanced);

    plan.execute_all().await.unwrap();

    assert_eq!(ledger.erc20_balance(currency(), offerer()), ether(1));
    assert_eq!(ledger.erc20_balance(currency(), fulfiller()), ether(dec!(1.95)));
    assert_eq!(ledger.erc20_balance(currency(), fee_recipient()), ether(dec!(0.05)));
    assert_eq!(ledger.erc1155_balance(collection(), token_id(), offerer()), U256::from(2));
    assert_eq!(ledger.erc1155_balance(collection(), token_id(), fulfiller()), U256::from(1));
}

#[tokio::test]
async fn actions_can_be_submitted_one_at_a_time() {
    let market = Market::new();
    market.list_erc1155(3);
    market.ledger.mint_erc20(currency(), fulfiller(), units(100, 6));
    let order = erc1155_listing_for_usdc(3, units(dec!(15.51), 6), 243);

    let plan = market.planner.plan(market.request(&order, 1)).await.unwrap();
    for action in plan.actions() {
        action.submit().await.unwrap();
    }

    assert_eq!(
        market.ledger.erc1155_balance(collection(), token_id(), fulfiller()),
        U256::from(1)
    );
    assert_eq!(market.ledger.submissions().len(), 2);
}

#[tokio::test]
async fn exchange_failure_keeps_confirmed_approvals() {
    let market = Market::new();
    market.list_erc1155(3);
    market.ledger.mint_erc20(currency(), fulfiller(), units(100, 6));
    market.ledger.fail_on(FailurePoint::Exchange);
    let order = erc1155_listing_for_usdc(3, units(dec!(15.51), 6), 243);

    let plan = market.planner.plan(market.request(&order, 2)).await.unwrap();
    let err = plan.execute_all().await.unwrap_err();

    assert!(matches!(
        err,
        Error::Execution(ExecutionError::ExchangeSubmissionFailed { .. })
    ));
    let ledger = &market.ledger;
    assert_eq!(ledger.allowance_of(currency(), fulfiller(), settlement()), U256::MAX);
    assert_eq!(ledger.erc20_balance(currency(), fulfiller()), units(100, 6));
    assert_eq!(ledger.erc1155_balance(collection(), token_id(), offerer()), U256::from(3));
    assert!(matches!(
        ledger.submissions().as_slice(),
        [Submission::Approve { .. }]
    ));
}

#[tokio::test]
async fn approval_failure_stops_before_the_exchange() {
    let market = Market::new();
    market.list_erc1155(3);
    market.ledger.mint_erc20(currency(), fulfiller(), units(100, 6));
    market.ledger.fail_on(FailurePoint::Approval(currency()));
    let order = erc1155_listing_for_usdc(3, units(dec!(15.51), 6), 243);

    let plan = market.planner.plan(market.request(&order, 2)).await.unwrap();
    let err = plan.execute_all().await.unwrap_err();

    match err {
        Error::Execution(ExecutionError::ApprovalSubmissionFailed { token, operator, .. }) => {
            assert_eq!(token, currency());
            assert_eq!(operator, settlement());
        }
        other => panic!("expected approval failure, got {other}"),
    }
    assert!(market.ledger.submissions().is_empty());
}

#[tokio::test]
async fn successive_partial_fills_track_remaining_units() {
    let market = Market::new();
    market.list_erc1155(10);
    market.ledger.mint_native(fulfiller(), ether(20));
    let order = erc1155_listing_for_eth(10, ether(10), 250);

    for units in [2, 3] {
        let plan = market.planner.plan(market.request(&order, units)).await.unwrap();
        plan.execute_all().await.unwrap();
    }

    let status = market.ledger.status_of(order.hash);
    assert_eq!((status.total_filled, status.total_size), (U256::from(1), U256::from(2)));

    let err = market
        .planner
        .plan(market.request(&order, 6))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Domain(DomainError::InsufficientRemainingUnits { .. })
    ));

    // the rest of the order is still fillable
    let plan = market.planner.plan(market.request(&order, 5)).await.unwrap();
    plan.execute_all().await.unwrap();
    assert!(market.ledger.status_of(order.hash).is_fully_filled());
    assert_eq!(
        market.ledger.erc1155_balance(collection(), token_id(), fulfiller()),
        U256::from(10)
    );
}

#[tokio::test]
async fn partial_fill_with_tip_pays_the_tip_exactly() {
    let market = Market::new();
    market.list_erc1155(10);
    market.ledger.mint_native(fulfiller(), ether(10));
    let tipper = address(0x44);
    let order = erc1155_listing_for_eth(10, ether(10), 250);

    let request = market.request(&order, 3).tip(Fee::new(tipper, 100));
    let plan = market.planner.plan(request).await.unwrap();
    let call = plan.exchange().call();

    assert_eq!(call.tips[0].amount(), ether(dec!(0.03)));
    assert_eq!(call.value, ether(dec!(3.03)));

    plan.execute_all().await.unwrap();
    assert_eq!(market.ledger.native_balance(tipper), ether(dec!(0.03)));
    assert_eq!(market.ledger.native_balance(fulfiller()), ether(dec!(6.97)));
}

#[tokio::test]
async fn stale_plan_fails_at_the_settlement_boundary() {
    let market = Market::new();
    market.list_erc1155(10);
    market.ledger.mint_native(fulfiller(), ether(10));
    let order = erc1155_listing_for_eth(10, ether(10), 250);

    let plan = market.planner.plan(market.request(&order, 2)).await.unwrap();
    market.ledger.cancel(order.hash);

    let err = plan.execute_all().await.unwrap_err();
    assert!(matches!(
        err,
        Error::Execution(ExecutionError::ExchangeSubmissionFailed { .. })
    ));
    assert_eq!(market.ledger.native_balance(fulfiller()), ether(10));
}

#[tokio::test]
async fn requested_units_count_items_of_the_offer() {
    for count in [1u64, 2] {
        let market = Market::new();
        market.list_erc1155(3);
        market.ledger.mint_erc20(currency(), fulfiller(), units(100, 6));

        // 5.17 USDC for all three: the payment split has no factor of 3
        let order = erc1155_listing_for_usdc(3, units(dec!(5.17), 6), 243);
        let err = market
            .planner
            .plan(market.request(&order, count))
            .await
            .unwrap_err();
        assert!(
            matches!(
                err,
                Error::Domain(DomainError::InvalidFraction { numerator, denominator })
                    if numerator == U256::from(count) && denominator == U256::from(3)
            ),
            "{count} units"
        );
        assert!(market.ledger.submissions().is_empty());

        // priced at 5.17 per item, the same request fills exactly `count`
        let order = erc1155_listing_for_usdc(3, units(dec!(15.51), 6), 243);
        let plan = market
            .planner
            .plan(market.request(&order, count))
            .await
            .unwrap();
        assert_eq!(plan.exchange().call().offer[0].start_amount, U256::from(count));
        plan.execute_all().await.unwrap();

        let ledger = &market.ledger;
        assert_eq!(
            ledger.erc1155_balance(collection(), token_id(), fulfiller()),
            U256::from(count)
        );
        assert_eq!(
            ledger.erc1155_balance(collection(), token_id(), offerer()),
            U256::from(3 - count)
        );
    }
}

#[tokio::test]
async fn indivisible_listing_still_fills_whole() {
    let market = Market::new();
    market.list_erc1155(3);
    market.ledger.mint_erc20(currency(), fulfiller(), units(100, 6));
    let order = erc1155_listing_for_usdc(3, units(dec!(5.17), 6), 243);

    let plan = market.planner.plan(market.request(&order, 3)).await.unwrap();
    plan.execute_all().await.unwrap();

    let ledger = &market.ledger;
    assert_eq!(ledger.erc1155_balance(collection(), token_id(), fulfiller()), U256::from(3));
    assert_eq!(ledger.erc20_balance(currency(), offerer()), U256::from(5_044_369));
    assert_eq!(ledger.erc20_balance(currency(), fee_recipient()), U256::from(125_631));
}

#[tokio::test]
async fn exchange_ahead_of_its_approval_is_rejected_by_settlement() {
    let market = Market::new();
    market.list_erc1155(3);
    market.ledger.mint_erc20(currency(), fulfiller(), units(100, 6));
    let order = erc1155_listing_for_usdc(3, units(dec!(15.51), 6), 243);
    let plan = market.planner.plan(market.request(&order, 2)).await.unwrap();

    let err = plan.exchange().submit().await.unwrap_err();

    match err {
        Error::Execution(ExecutionError::ExchangeSubmissionFailed { source }) => {
            assert!(source.to_string().contains("insufficient allowance"), "{source}");
        }
        other => panic!("expected exchange failure, got {other}"),
    }
    let ledger = &market.ledger;
    assert!(ledger.submissions().is_empty());
    assert_eq!(ledger.erc20_balance(currency(), fulfiller()), units(100, 6));
    assert_eq!(ledger.erc1155_balance(collection(), token_id(), offerer()), U256::from(3));

    for action in plan.actions() {
        action.submit().await.unwrap();
    }
    assert_eq!(ledger.erc1155_balance(collection(), token_id(), fulfiller()), U256::from(2));
    assert_eq!(ledger.erc20_balance(currency(), fulfiller()), units(dec!(89.66), 6));
}

#[tokio::test]
async fn declining_price_partial_fill_covers_the_settled_payment() {
    let market = Market::new();
    market.list_erc1155(10);
    market.ledger.mint_native(fulfiller(), ether(10));
    market.ledger.set_timestamp(1_003);
    let order = OrderBuilder::new(offerer())
        .offer_erc1155(collection(), token_id(), U256::from(10))
        .consider_item(ConsiderationItem {
            item_type: ItemType::Native,
            token: Address::ZERO,
            identifier_or_criteria: U256::ZERO,
            start_amount: ether(10),
            end_amount: ether(5),
            recipient: offerer(),
        })
        .fees(&[Fee::new(fee_recipient(), 250)])
        .window(1_000, 1_007)
        .partial()
        .build();

    let request = market.request(&order, 3).at(1_003);
    let plan = market.planner.plan(request).await.unwrap();
    let call = plan.exchange().call().clone();
    plan.execute_all().await.unwrap();

    let ledger = &market.ledger;
    let to_offerer = ledger.native_balance(offerer());
    let to_fee = ledger.native_balance(fee_recipient());
    assert!(call.consideration[0].amount() >= to_offerer);
    assert!(call.consideration[1].amount() >= to_fee);
    assert!(call.value >= to_offerer + to_fee);
    assert_eq!(ledger.native_balance(fulfiller()), ether(10) - to_offerer - to_fee);
    assert_eq!(ledger.erc1155_balance(collection(), token_id(), fulfiller()), U256::from(3));
}

#[tokio::test]
async fn decaying_offer_partial_fill_pays_at_least_the_planned_offer() {
    let market = Market::new();
    let ledger = &market.ledger;
    ledger.set_timestamp(1_001);
    ledger.mint_erc20(currency(), offerer(), ether(3));
    ledger.set_allowance(currency(), offerer(), settlement(), U256::MAX);
    ledger.mint_erc1155(collection(), token_id(), fulfiller(), U256::from(3));
    let order = OrderBuilder::new(offerer())
        .offer_item(OfferItem {
            item_type: ItemType::Erc20,
            token: currency(),
            identifier_or_criteria: U256::ZERO,
            start_amount: ether(3),
            end_amount: ether(dec!(1.5)),
        })
        .consider_erc1155(collection(), token_id(), U256::from(3), offerer())
        .window(1_000, 1_007)
        .partial()
        .build();

    let request = market.request_units(&order, ether(1)).at(1_001);
    let plan = market.planner.plan(request).await.unwrap();
    let planned = plan.exchange().call().offer[0].start_amount;
    plan.execute_all().await.unwrap();

    assert!(planned <= ledger.erc20_balance(currency(), fulfiller()));
    assert_eq!(ledger.erc1155_balance(collection(), token_id(), offerer()), U256::from(1));
}
