use reseller_engine::{
    db_types::{ChatId, Credits, UserId},
    test_utils::fakes::FakeFulfillment,
    AccountApi,
    RechargeStep,
};

use super::helpers::{button_press, private_photo, private_text, TestShop, OPERATOR};
use crate::{
    bot::BotSettings,
    replies::{NOT_AUTHORIZED, NO_RECHARGE, PROOF_REQUIRED, RECHARGE_CANCELLED},
    transport::MessageRef,
};

const ALICE: UserId = UserId(100);
const BOB: UserId = UserId(150);
const REVIEWERS: ChatId = ChatId(-2002);

/// Walks `user` through to a submitted request, and returns the review message with its approve and reject actions.
async fn submit_request(
    shop: &TestShop,
    user: UserId,
    amount: &str,
    review_chat: ChatId,
) -> (MessageRef, String, String) {
    shop.send(private_text(user, "/recharge")).await;
    let (prompt, buttons) = shop.transport.last_buttons_to(user.into()).expect("No amount buttons");
    let wanted = format!("rc:amt:{amount}");
    let action = buttons.iter().find(|b| b.action == wanted).expect("No such amount").action.clone();
    shop.send(button_press(user, user.into(), prompt.message_id, &action)).await;
    shop.send(private_photo(user, "receipt-photo")).await;
    let (review, buttons) = shop.transport.last_buttons_to(review_chat).expect("Request was not sent for review");
    (review, buttons[0].action.clone(), buttons[1].action.clone())
}

#[actix_web::test]
async fn approved_recharge_credits_the_party() {
    let (shop, _) = TestShop::new().await;
    let alice = ChatId::from(ALICE);
    let operator = ChatId::from(OPERATOR);

    shop.send(private_text(ALICE, "/recharge")).await;
    let (prompt, buttons) = shop.transport.last_buttons_to(alice).expect("No amount buttons");
    let actions = buttons.iter().map(|b| b.action.as_str()).collect::<Vec<_>>();
    assert_eq!(actions, vec!["rc:amt:500", "rc:amt:1000", "rc:amt:2000", "rc:amt:5000", "rc:amt:10000", "rc:cancel"]);
    assert_eq!(buttons[1].label, "1000.00 CR");

    shop.send(button_press(ALICE, alice, prompt.message_id, "rc:amt:1000")).await;
    assert!(shop.transport.cleared().contains(&prompt));
    assert!(shop.transport.last_text_to(alice).unwrap().starts_with("Recharge of 1000.00 CR."));
    assert_eq!(
        shop.bot.recharges().current_step(ALICE),
        Some(RechargeStep::AwaitingProof { amount: Credits::from_whole(1000) })
    );

    shop.send(private_photo(ALICE, "receipt-photo")).await;
    assert_eq!(
        shop.transport.last_text_to(alice).unwrap(),
        "Thanks! Your recharge request #1 for 1000.00 CR is waiting for review."
    );
    assert_eq!(shop.transport.photos(), vec![(
        operator,
        "receipt-photo".to_string(),
        "Recharge request #1\nUser: 100\nAmount: 1000.00 CR".to_string()
    )]);
    assert_eq!(shop.bot.recharges().current_step(ALICE), None);
    assert_eq!(shop.balance(ALICE).await, Credits::zero());

    let (review, buttons) = shop.transport.last_buttons_to(operator).unwrap();
    assert_eq!(buttons[0].action, "rc:approve:1");
    assert_eq!(buttons[1].action, "rc:reject:1");
    shop.send(button_press(OPERATOR, operator, review.message_id, "rc:approve:1")).await;

    assert_eq!(shop.balance(ALICE).await, Credits::from_whole(1000));
    assert!(shop.transport.cleared().contains(&review));
    assert_eq!(shop.transport.answers().last().unwrap(), "Recharge request #1 approved by 1");
    assert_eq!(
        shop.transport.last_text_to(alice).unwrap(),
        "Your recharge #1 of 1000.00 CR was approved. Your balance is now 1000.00 CR."
    );
}

#[actix_web::test]
async fn requests_are_only_decided_once() {
    let (shop, _) = TestShop::new().await;
    let operator = ChatId::from(OPERATOR);
    let (review, approve, reject) = submit_request(&shop, ALICE, "500", operator).await;

    shop.send(button_press(OPERATOR, operator, review.message_id, &approve)).await;
    shop.send(button_press(OPERATOR, operator, review.message_id, &approve)).await;
    shop.send(button_press(OPERATOR, operator, review.message_id, &reject)).await;

    assert_eq!(shop.balance(ALICE).await, Credits::from_whole(500));
    let answers = shop.transport.answers();
    assert_eq!(&answers[answers.len() - 2..], &[
        "Recharge request #1 has already been decided: Approved".to_string(),
        "Recharge request #1 has already been decided: Approved".to_string(),
    ]);
    let notices = shop.transport.texts_to(ALICE.into()).into_iter().filter(|t| t.contains("was approved")).count();
    assert_eq!(notices, 1);
}

#[actix_web::test]
async fn rejected_recharge_leaves_the_balance_alone() {
    let (shop, _) = TestShop::new().await;
    let operator = ChatId::from(OPERATOR);
    shop.whitelist(ALICE, 20).await;
    let (review, _, reject) = submit_request(&shop, ALICE, "2000", operator).await;

    shop.send(button_press(OPERATOR, operator, review.message_id, &reject)).await;

    assert_eq!(shop.balance(ALICE).await, Credits::from_whole(20));
    assert_eq!(
        shop.transport.last_text_to(ALICE.into()).unwrap(),
        "Your recharge #1 of 2000.00 CR was rejected. Contact the operator if you think this is a mistake."
    );
    assert_eq!(shop.transport.last_text_to(operator).unwrap(), "Recharge request #1 rejected by 1");
}

#[actix_web::test]
async fn only_admins_decide() {
    let settings = BotSettings { review_chat: Some(REVIEWERS), ..BotSettings::new(OPERATOR) };
    let shop = TestShop::with_fulfillment(FakeFulfillment::new(), settings).await;
    let (review, approve, _) = submit_request(&shop, ALICE, "1000", REVIEWERS).await;

    shop.send(button_press(BOB, REVIEWERS, review.message_id, &approve)).await;
    assert_eq!(shop.transport.answers().last().unwrap(), NOT_AUTHORIZED);
    assert_eq!(shop.balance(ALICE).await, Credits::zero());

    AccountApi::new(shop.db.clone()).add_admin(BOB).await.unwrap();
    shop.send(button_press(BOB, REVIEWERS, review.message_id, &approve)).await;
    assert_eq!(shop.balance(ALICE).await, Credits::from_whole(1000));
    assert_eq!(shop.transport.answers().last().unwrap(), "Recharge request #1 approved by 150");
}

#[actix_web::test]
async fn review_falls_back_to_the_operator() {
    let settings = BotSettings { review_chat: Some(REVIEWERS), ..BotSettings::new(OPERATOR) };
    let shop = TestShop::with_fulfillment(FakeFulfillment::new(), settings).await;
    shop.transport.fail_chat(REVIEWERS);

    let (_, approve, _) = submit_request(&shop, ALICE, "500", OPERATOR.into()).await;

    assert_eq!(approve, "rc:approve:1");
    assert_eq!(shop.transport.photos().len(), 1);
}

#[actix_web::test]
async fn conversation_edge_cases() {
    let (shop, _) = TestShop::new().await;
    let alice = ChatId::from(ALICE);

    shop.send(private_photo(ALICE, "stray")).await;
    assert_eq!(shop.transport.last_text_to(alice).unwrap(), NO_RECHARGE);

    shop.send(private_text(ALICE, "/recharge")).await;
    shop.send(private_text(ALICE, "750")).await;
    let reply = shop.transport.last_text_to(alice).unwrap();
    assert!(reply.starts_with("'750' is not one of the available amounts"), "{reply}");

    shop.send(private_text(ALICE, "5000")).await;
    shop.send(private_text(ALICE, "here is the receipt")).await;
    assert_eq!(shop.transport.last_text_to(alice).unwrap(), PROOF_REQUIRED);

    shop.send(private_text(ALICE, "/cancel")).await;
    assert_eq!(shop.transport.last_text_to(alice).unwrap(), RECHARGE_CANCELLED);
    shop.send(private_photo(ALICE, "late")).await;
    assert_eq!(shop.transport.last_text_to(alice).unwrap(), NO_RECHARGE);
    assert!(shop.transport.photos().is_empty());
}

#[actix_web::test]
async fn cancel_button_and_restart() {
    let (shop, _) = TestShop::new().await;
    let alice = ChatId::from(ALICE);

    shop.send(private_text(ALICE, "/recharge")).await;
    let (first, _) = shop.transport.last_buttons_to(alice).unwrap();
    // Starting again replaces the conversation
    shop.send(private_text(ALICE, "/recharge")).await;
    let (second, _) = shop.transport.last_buttons_to(alice).unwrap();
    assert_ne!(first, second);
    assert_eq!(shop.bot.recharges().current_step(ALICE), Some(RechargeStep::AwaitingAmount));

    shop.send(button_press(ALICE, alice, second.message_id, "rc:cancel")).await;
    assert_eq!(shop.transport.answers().last().unwrap(), RECHARGE_CANCELLED);
    assert_eq!(shop.bot.recharges().current_step(ALICE), None);

    shop.send(button_press(ALICE, alice, first.message_id, "rc:amt:500")).await;
    assert_eq!(shop.transport.last_text_to(alice).unwrap(), NO_RECHARGE);
}

#[actix_web::test]
async fn starting_a_recharge_opens_an_account() {
    let (shop, _) = TestShop::new().await;
    let accounts = AccountApi::new(shop.db.clone());
    assert_eq!(accounts.ledger_summary().await.unwrap().accounts, 0);

    shop.send(private_text(ALICE, "/recharge")).await;

    assert_eq!(accounts.ledger_summary().await.unwrap().accounts, 1);
    assert_eq!(shop.balance(ALICE).await, Credits::zero());
}
