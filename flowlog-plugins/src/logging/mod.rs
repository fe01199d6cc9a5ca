pub mod flow_logger;
