/*!
 * Authenticated identity extractor
 *
 * Public API:
 * - AuthIdentity
 */
mod identity;

pub use identity::AuthIdentity;
