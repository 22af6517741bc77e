//! In-process impairment simulation, for exercising the analysis without a real qdisc

pub mod channel;

pub use channel::{uniform_sender_trace, ChannelConfig, ChannelStats, ImpairmentChannel, LossModel};
