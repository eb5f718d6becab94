mod helpers;
mod mocks;
mod ordering;
mod recharge;
mod webhook;
