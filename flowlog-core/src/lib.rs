pub mod config;
pub mod error;
pub mod flow;
pub mod record;
pub mod target;
pub mod timestamp;

pub use config::FlowLogConfig;
pub use error::FlowLogError;
pub use flow::{Flow, FlowRequest, FlowResponse};
pub use record::ExchangeRecord;
pub use timestamp::TimeZoneSetting;
