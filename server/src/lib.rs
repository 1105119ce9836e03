//! Same-origin API gateway in front of the micro-posting backend.
//!
//! Browser requests to `/proxy/...` are forwarded to `BACKEND_URL` under
//! `/api/...` with their cookies, and the backend's status, JSON body and
//! `Set-Cookie` headers are relayed back. See [`proxy`] for the forwarding
//! rules and [`routes`] for the route table.

pub mod config;
pub mod proxy;
pub mod routes;
pub mod state;
