//! Registry activities

pub mod check_alias_available;
pub mod delete_channel_record;
pub mod register_channel;
pub mod resolve_channel;
pub mod update_channel_alias;
