// handlers/mod.rs - Route handlers
//
// Public:    GET /drinks, GET /health, login helper pages
// Protected: everything else under /drinks*, behind a PermissionGuard layer
//            installed per route in routes.rs
pub mod drinks;
pub mod login;
pub mod system;
