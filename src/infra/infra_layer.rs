// The infra module implements the ports the other layers define:
// discovery reads module trees from disk, the publisher talks to the REST API.

#[path = "discovery/module_discovery.rs"]
pub mod discovery;

#[path = "publisher/mod.rs"]
pub mod publisher;
