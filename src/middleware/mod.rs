/*
 * Responsibility
 * - Public interface of the middleware layer
 * - auth: bearer/role guard and webhook signature guard; http: cross-cutting transport layers
 */
pub mod auth;
pub mod http;
