pub mod common;
pub mod error;
pub mod filter;
pub mod live_data;
pub mod pudos_ativos;
pub mod recent_history;
