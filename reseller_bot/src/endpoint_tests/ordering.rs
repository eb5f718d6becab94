use reseller_engine::{
    db_types::{ChatId, ChatMember, Credits, UserId},
    order_objects::RefundPolicy,
    test_utils::fakes::{FakeFulfillment, PlacedCall},
    AccountApi,
};

use super::{
    helpers::{group_text, private_text, TestShop, OPERATOR, SHOP_GROUP},
    mocks::MockPanel,
};
use crate::{bot::BotSettings, replies::NOT_AUTHORIZED};

const ALICE: UserId = UserId(100);
const MALLORY: UserId = UserId(200);
const GROUP_OWNER: UserId = UserId(300);

#[actix_web::test]
async fn whitelisted_party_places_an_order() {
    let (shop, panel) = TestShop::new().await;
    shop.stock("view", "101", 50).await;
    shop.whitelist(ALICE, 1000).await;

    shop.send(private_text(ALICE, "/order https://t.me/mychannel view 10000")).await;

    assert_eq!(panel.calls(), vec![PlacedCall {
        service_id: "101".into(),
        link: "https://t.me/mychannel".into(),
        quantity: 10_000
    }]);
    assert_eq!(shop.balance(ALICE).await, Credits::from_whole(500));
    let receipt = shop.transport.last_text_to(ALICE.into()).expect("No receipt");
    assert_eq!(
        receipt,
        "Order for https://t.me/mychannel\n✅ view x10000: 500.00 CR (order #1001)\nTotal: 500.00 CR\nBalance: 500.00 CR"
    );
}

#[actix_web::test]
async fn multi_item_order_with_a_failing_service_is_partly_refunded() {
    let panel = FakeFulfillment::new();
    let settings = BotSettings { refund_policy: RefundPolicy::FailedItems, ..BotSettings::new(OPERATOR) };
    let shop = TestShop::with_fulfillment(panel.clone(), settings).await;
    shop.stock("view", "101", 50).await;
    shop.stock("like", "102", 1000).await;
    shop.whitelist(ALICE, 1000).await;
    panel.fail_service("102");

    shop.send(private_text(ALICE, "/order https://t.me/post/5 VIEW 2000 like 500")).await;

    assert_eq!(panel.call_count(), 2);
    // 100 for the views, 500 for the likes, which were refunded
    assert_eq!(shop.balance(ALICE).await, Credits::from_whole(900));
    let receipt = shop.transport.last_text_to(ALICE.into()).expect("No receipt");
    assert!(receipt.contains("✅ VIEW x2000: 100.00 CR (order #1001)"), "{receipt}");
    assert!(receipt.contains("❌ like x500: 500.00 CR failed"), "{receipt}");
    assert!(receipt.contains("Refunded: 500.00 CR"), "{receipt}");
    assert!(receipt.ends_with("Balance: 900.00 CR"), "{receipt}");
}

#[actix_web::test]
async fn insufficient_balance_charges_nothing() {
    let (shop, panel) = TestShop::new().await;
    shop.stock("view", "101", 50).await;
    shop.whitelist(ALICE, 100).await;

    shop.send(private_text(ALICE, "/order https://t.me/mychannel view 10000")).await;

    assert_eq!(panel.call_count(), 0);
    assert_eq!(shop.balance(ALICE).await, Credits::from_whole(100));
    let reply = shop.transport.last_text_to(ALICE.into()).expect("No reply");
    assert!(reply.starts_with("Insufficient balance. This order costs 500.00 CR, but your balance is 100.00 CR."));
}

#[actix_web::test]
async fn unparseable_order_shows_usage() {
    let (shop, panel) = TestShop::new().await;
    shop.stock("view", "101", 50).await;
    shop.whitelist(ALICE, 1000).await;

    shop.send(private_text(ALICE, "/order view 10000")).await;

    assert_eq!(panel.call_count(), 0);
    let reply = shop.transport.last_text_to(ALICE.into()).expect("No reply");
    assert!(reply.contains("Usage: /order"), "{reply}");
}

#[actix_web::test]
async fn private_party_not_on_the_whitelist_is_told_so() {
    let (shop, panel) = TestShop::new().await;
    shop.stock("view", "101", 50).await;
    AccountApi::new(shop.db.clone()).adjust_balance(MALLORY, Credits::from_whole(1000)).await.unwrap();

    shop.send(private_text(MALLORY, "/order https://t.me/mychannel view 10000")).await;

    assert_eq!(panel.call_count(), 0);
    assert_eq!(shop.transport.texts_to(MALLORY.into()), vec!["You are not on the whitelist".to_string()]);
    assert_eq!(shop.balance(MALLORY).await, Credits::from_whole(1000));
}

#[actix_web::test]
async fn group_members_without_authority_are_ignored() {
    let _ = env_logger::try_init();
    let mut panel = MockPanel::new();
    panel.expect_place_order().never();
    let shop = TestShop::with_fulfillment(panel, BotSettings::new(OPERATOR)).await;
    shop.stock("view", "101", 50).await;
    // Whitelisting and admin rights do not count in groups
    shop.whitelist(MALLORY, 1000).await;
    AccountApi::new(shop.db.clone()).add_admin(MALLORY).await.unwrap();
    shop.transport.set_admins(SHOP_GROUP, vec![
        ChatMember { user_id: GROUP_OWNER, status: "creator".into() },
        ChatMember { user_id: MALLORY, status: "administrator".into() },
    ]);

    shop.send(group_text(SHOP_GROUP, MALLORY, "/order https://t.me/mychannel view 10000")).await;
    shop.send(group_text(SHOP_GROUP, MALLORY, "/status 1001")).await;
    shop.send(group_text(SHOP_GROUP, MALLORY, "/setprice view 1")).await;

    assert!(shop.transport.sent().is_empty());
    assert_eq!(shop.balance(MALLORY).await, Credits::from_whole(1000));
}

#[actix_web::test]
async fn group_creator_orders_on_behalf_of_the_group() {
    let _ = env_logger::try_init();
    let mut panel = MockPanel::new();
    panel.expect_place_order().times(1).returning(|service_id, link, quantity| {
        assert_eq!(service_id, "101");
        assert_eq!(link, "https://t.me/mychannel");
        assert_eq!(quantity, 10_000);
        Ok("9001".to_string())
    });
    let shop = TestShop::with_fulfillment(panel, BotSettings::new(OPERATOR)).await;
    shop.stock("view", "101", 50).await;
    AccountApi::new(shop.db.clone()).adjust_balance(GROUP_OWNER, Credits::from_whole(600)).await.unwrap();
    shop.transport.set_admins(SHOP_GROUP, vec![ChatMember { user_id: GROUP_OWNER, status: "creator".into() }]);

    shop.send(group_text(SHOP_GROUP, GROUP_OWNER, "/order@shop_bot https://t.me/mychannel view 10000")).await;

    assert_eq!(shop.balance(GROUP_OWNER).await, Credits::from_whole(100));
    let receipt = shop.transport.last_text_to(SHOP_GROUP).expect("No receipt in the group");
    assert!(receipt.contains("(order #9001)"), "{receipt}");
}

#[actix_web::test]
async fn operator_orders_are_free() {
    let (shop, panel) = TestShop::new().await;
    shop.stock("view", "101", 50).await;

    shop.send(private_text(OPERATOR, "/order https://t.me/mychannel view 10000")).await;
    shop.send(group_text(SHOP_GROUP, OPERATOR, "/order https://t.me/other view 1000")).await;

    assert_eq!(panel.call_count(), 2);
    assert_eq!(shop.balance(OPERATOR).await, Credits::zero());
    let receipt = shop.transport.last_text_to(SHOP_GROUP).expect("No receipt in the group");
    assert!(!receipt.contains("Balance:"), "{receipt}");
}

#[actix_web::test]
async fn operator_manages_the_store() {
    let (shop, _) = TestShop::new().await;
    let me = ChatId::from(OPERATOR);

    shop.send(private_text(OPERATOR, "/setservice Story Views 3301")).await;
    assert_eq!(shop.transport.last_text_to(me).unwrap(), "Updated. story views: 0.00 CR per 1000");
    shop.send(private_text(OPERATOR, "/setprice story views 12.5")).await;
    assert_eq!(shop.transport.last_text_to(me).unwrap(), "Updated. story views: 12.50 CR per 1000");
    shop.send(private_text(OPERATOR, "/setprice like 1000")).await;
    shop.send(private_text(OPERATOR, "/products")).await;
    assert_eq!(
        shop.transport.last_text_to(me).unwrap(),
        "Products:\nlike: 1000.00 CR per 1000 (unavailable)\nstory views: 12.50 CR per 1000"
    );

    shop.send(private_text(OPERATOR, "/addbalance 100 250")).await;
    assert_eq!(shop.transport.last_text_to(me).unwrap(), "The balance of 100 is now 250.00 CR.");
    shop.send(private_text(OPERATOR, "/addbalance 100 -300")).await;
    assert_eq!(shop.transport.last_text_to(me).unwrap(), "The adjustment would leave user 100 with a negative balance");
    assert_eq!(shop.balance(ALICE).await, Credits::from_whole(250));

    shop.send(private_text(OPERATOR, "/whitelist 100")).await;
    assert_eq!(shop.transport.last_text_to(me).unwrap(), "100 is now whitelisted.");
    shop.send(private_text(OPERATOR, "/addadmin 100")).await;
    shop.send(private_text(OPERATOR, "/addadmin 100")).await;
    assert_eq!(shop.transport.last_text_to(me).unwrap(), "100 was already an admin.");
    shop.send(private_text(OPERATOR, "/deladmin 100")).await;
    assert_eq!(shop.transport.last_text_to(me).unwrap(), "100 is no longer an admin.");
    shop.send(private_text(OPERATOR, "/deladmin bob")).await;
    assert_eq!(shop.transport.last_text_to(me).unwrap(), "Usage: /deladmin <user id>");
}

#[actix_web::test]
async fn store_commands_are_operator_only() {
    let (shop, _) = TestShop::new().await;
    shop.whitelist(ALICE, 10).await;
    AccountApi::new(shop.db.clone()).add_admin(ALICE).await.unwrap();

    shop.send(private_text(ALICE, "/addbalance 100 1000")).await;
    shop.send(private_text(ALICE, "/setprice view 1")).await;

    assert_eq!(shop.transport.texts_to(ALICE.into()), vec![NOT_AUTHORIZED.to_string(), NOT_AUTHORIZED.to_string()]);
    assert_eq!(shop.balance(ALICE).await, Credits::from_whole(10));
}

#[actix_web::test]
async fn balance_views() {
    let (shop, _) = TestShop::new().await;
    shop.whitelist(ALICE, 1500).await;

    shop.send(private_text(ALICE, "/balance")).await;
    assert_eq!(shop.transport.last_text_to(ALICE.into()).unwrap(), "Your balance: 1500.00 CR");

    shop.send(private_text(OPERATOR, "/balance")).await;
    let view = shop.transport.last_text_to(OPERATOR.into()).unwrap();
    assert!(view.starts_with("Your balance: 0.00 CR\n\nPanel balance: 100.84 USD"), "{view}");
    assert!(view.contains("Total of all balances: 1500.00 CR"), "{view}");
}

#[actix_web::test]
async fn order_status_for_the_operator() {
    let (shop, _) = TestShop::new().await;
    shop.stock("view", "101", 50).await;
    shop.send(private_text(OPERATOR, "/order https://t.me/mychannel view 1000")).await;

    shop.send(private_text(OPERATOR, "/status 1001")).await;
    assert_eq!(
        shop.transport.last_text_to(OPERATOR.into()).unwrap(),
        "Order #1001: In progress\nCharge: 0.5 USD\nStart count: 0\nRemains: 10"
    );

    shop.send(private_text(ALICE, "/status 1001")).await;
    assert_eq!(shop.transport.last_text_to(ALICE.into()).unwrap(), NOT_AUTHORIZED);
}
