// Domain layer modules
pub mod domain;

// Infrastructure layer modules
pub mod infrastructure;

// Application layer modules
pub mod application;

// HTTP layer modules
pub mod api;
