pub mod airdrop;
pub mod faucet;
pub mod task;
pub mod waitlist;
