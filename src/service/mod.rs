pub mod notifier;
pub mod request_service;
