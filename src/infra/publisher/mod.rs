pub mod http_publisher;

pub use http_publisher::HttpPublisher;
