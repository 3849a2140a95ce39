#![no_std]

#[cfg(test)]
extern crate std;

pub mod klog;
pub mod numfmt;
pub mod ring_buffer;

pub use klog::{
    KlogLevel, is_enabled_level, klog_get_level, klog_init, klog_register_backend,
    klog_set_level,
};
pub use numfmt::NumBuf;
pub use ring_buffer::RingBuffer;
