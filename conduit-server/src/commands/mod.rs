pub mod channel;
pub mod serve;
