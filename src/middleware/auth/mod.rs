pub mod access;
pub mod webhook;
