/// Lifecycle managers for Kanflow's entities
///
/// A lifecycle manager performs the actual create/update/delete after the
/// authorization engine has approved it. Every authorize-then-mutate
/// sequence runs inside a single transaction: the [`BoardPolicy`] snapshot
/// is loaded on the same transaction that performs the write, so the
/// membership check and the mutation observe one consistent view and a
/// concurrent membership change cannot slip between check and write.
///
/// [`BoardPolicy`]: crate::auth::authorization::BoardPolicy
///
/// # Modules
///
/// - `board`: Board create/update/delete and the owner-is-always-a-member
///   invariant
/// - `task`: Task create/update/delete with participant validation and the
///   board-immutability rule
/// - `comment`: Comment create and author-or-owner delete

pub mod board;
pub mod comment;
pub mod task;
