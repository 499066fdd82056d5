pub mod action;
pub mod credential;
pub mod redeem;
pub mod track;
