// Application layer: the HTTP surface in front of the aggregator.

pub mod server;
