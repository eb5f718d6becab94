use cucumber::given;
use reseller_engine::{
    db_types::{ChatId, ChatMember, Credits},
    order_objects::RefundPolicy,
};

use crate::cucumber::{
    store_world::{user_id, StoreSystem},
    StoreWorld,
};

#[given("a fresh install")]
async fn fresh_database(world: &mut StoreWorld) {
    let system = StoreSystem::new().await;
    world.system = Some(system);
}

#[given(expr = "the product {string} costs {int} per 1000 with service id {string}")]
async fn product_with_service(world: &mut StoreWorld, name: String, price: i64, service_id: String) {
    let catalog = world.system().catalog();
    catalog.set_price(&name, Credits::from_whole(price)).await.expect("Error setting price");
    catalog.set_service_id(&name, &service_id).await.expect("Error setting service id");
}

#[given(expr = "the product {string} costs {int} per 1000 with no service id")]
async fn product_without_service(world: &mut StoreWorld, name: String, price: i64) {
    let catalog = world.system().catalog();
    catalog.set_price(&name, Credits::from_whole(price)).await.expect("Error setting price");
}

#[given(expr = "{word} has a balance of {int}")]
async fn set_balance(world: &mut StoreWorld, name: String, balance: i64) {
    let user = user_id(&name);
    let accounts = world.system().accounts();
    let current = accounts.balance(user).await.expect("Error fetching balance");
    accounts.adjust_balance(user, Credits::from_whole(balance) - current).await.expect("Error setting balance");
}

#[given(expr = "the refund policy is {word}")]
async fn refund_policy(world: &mut StoreWorld, policy: String) {
    world.system_mut().refund_policy = policy.parse::<RefundPolicy>().expect("Not a refund policy");
}

#[given(expr = "the fulfillment service is down for service {string}")]
async fn service_down(world: &mut StoreWorld, service_id: String) {
    world.system().fulfillment.fail_service(&service_id);
}

#[given(expr = "{word} created the group {int}")]
async fn group_creator(world: &mut StoreWorld, name: String, chat: i64) {
    let members = vec![
        ChatMember { user_id: user_id(&name), status: "creator".into() },
        ChatMember { user_id: user_id("bob"), status: "administrator".into() },
    ];
    world.system().authority.set_admins(ChatId(chat), members);
}

#[given("the chat transport is unreachable")]
async fn transport_down(world: &mut StoreWorld) {
    world.system().authority.set_unreachable(true);
}

#[given(expr = "{word} is an admin")]
async fn make_admin(world: &mut StoreWorld, name: String) {
    world.system().accounts().add_admin(user_id(&name)).await.expect("Error adding admin");
}

#[given(expr = "{word} is whitelisted")]
async fn whitelist(world: &mut StoreWorld, name: String) {
    world.system().accounts().set_whitelisted(user_id(&name), true).await.expect("Error whitelisting");
}

#[given(expr = "{word} has a pending recharge request for {int}")]
async fn pending_request(world: &mut StoreWorld, name: String, amount: u64) {
    let user = user_id(&name);
    let api = world.system().recharges();
    api.start(user);
    api.submit_amount(user, &amount.to_string()).expect("Error choosing amount");
    let request = api.submit_proof(user, Some("proof-file")).await.expect("Error submitting proof");
    world.last_request_id = Some(request.id);
}
