/*!
 * Caller identity extractors
 *
 * Responsibility:
 * - credentials middleware が組み立てた Identity を handler に提供する
 * - authorize guard が決めた GrantedLevel を handler に提供する
 *
 * Public API:
 * - AuthenticatedUser
 * - GrantedLevel
 */

mod core;
mod types;

pub use self::core::AuthenticatedUser;
pub use self::types::GrantedLevel;
