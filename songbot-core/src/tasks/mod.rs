pub mod reward_sync;
