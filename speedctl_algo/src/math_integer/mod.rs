pub mod filters;
pub mod fifo_buffer;
