//! # Padelyzer Admin Session
//!
//! Session and authorization component behind the Padelyzer admin dashboard.
//!
//! The [`session::SessionManager`] owns the single authoritative session
//! record: the current identity, its admin flag, the bearer token, and the
//! loading/error state the dashboard renders. Credential verification is
//! delegated to an identity provider (Firebase Identity Toolkit in
//! production) and the admin role is read from a directory document store
//! (Firestore). Both are injected as trait objects so tests run against
//! in-memory fakes.
//!
//! Dashboard access is admin-only: a sign-in with valid credentials but a
//! non-admin role is signed out again and surfaces
//! `"Acceso solo para administradores"`.

pub mod cli;
pub mod provider;
pub mod session;
pub mod storage;
