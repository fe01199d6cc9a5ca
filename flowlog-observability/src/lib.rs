pub mod flow_file_writer;

pub use flow_file_writer::FlowFileWriter;
