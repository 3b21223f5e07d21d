/// Board authorization engine
///
/// This module decides every access question in Kanflow: who may see a
/// board, who may mutate it, and whether a proposed assignee/reviewer or
/// comment deletion is legal. Decisions are made against a [`BoardPolicy`]
/// snapshot so a check and the write it protects can share one consistent
/// view; the lifecycle managers load the snapshot inside the transaction
/// that performs the write.
///
/// # Permission Model
///
/// 1. **Participation**: a user is a board participant iff they are the
///    board's owner or appear in its member set. Participation gates every
///    read and most writes on the board, its tasks, and its comments.
/// 2. **Ownership**: board update/delete and comment moderation require the
///    single, immutable owner.
/// 3. **Participant references**: a task's assignee/reviewer, when set,
///    must be a participant of the task's board.
///
/// # Example
///
/// ```
/// use kanflow_shared::auth::authorization::{BoardPolicy, ParticipantField};
/// use uuid::Uuid;
///
/// let owner = Uuid::new_v4();
/// let member = Uuid::new_v4();
/// let outsider = Uuid::new_v4();
///
/// let policy = BoardPolicy::from_parts(Uuid::new_v4(), owner, [member]);
///
/// assert!(policy.authorize(member).is_ok());
/// assert!(policy.authorize(outsider).is_err());
/// assert!(policy
///     .validate_participant(ParticipantField::Assignee, Some(member))
///     .is_ok());
/// ```

use std::collections::HashSet;
use std::fmt;

use sqlx::PgExecutor;
use uuid::Uuid;

/// Which participant reference on a task failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantField {
    /// The task's assignee
    Assignee,

    /// The task's reviewer
    Reviewer,
}

impl ParticipantField {
    /// Field name as it appears in API payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantField::Assignee => "assignee",
            ParticipantField::Reviewer => "reviewer",
        }
    }
}

impl fmt::Display for ParticipantField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for authorization and lifecycle checks
///
/// Every variant is recoverable by the caller; the API layer alone decides
/// the transport representation. Authorization outcomes are deterministic
/// given current state, so none of these warrant a retry.
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// User is not a participant of the board
    #[error("You do not have access to this board")]
    AccessDenied,

    /// Non-owner attempted an owner-only board mutation
    #[error("Only the board owner can perform this action")]
    NotOwner,

    /// Proposed assignee/reviewer is not a board participant
    #[error("Selected {field} must be a board member")]
    InvalidParticipant {
        /// The offending field
        field: ParticipantField,
    },

    /// Attempt to move a task to a different board
    ///
    /// Board membership anchors authorization at creation time; allowing
    /// moves would let a task escape its authorization scope.
    #[error("Tasks cannot be moved to another board")]
    BoardReassignmentForbidden,

    /// Non-author, non-owner attempted to delete a comment
    #[error("You can only delete your own comments")]
    CommentDeleteForbidden,

    /// Referenced entity does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Membership snapshot of a single board
///
/// The membership oracle: one immutable view of `owner + members`, loaded
/// in a single query. All guard decisions are pure functions over this
/// snapshot, which keeps them O(1), side-effect free, and testable without
/// a database.
#[derive(Debug, Clone)]
pub struct BoardPolicy {
    board_id: Uuid,
    owner_id: Uuid,
    members: HashSet<Uuid>,
}

impl BoardPolicy {
    /// Builds a policy from already-known parts
    ///
    /// The owner counts as a participant whether or not it appears in
    /// `members`.
    pub fn from_parts(
        board_id: Uuid,
        owner_id: Uuid,
        members: impl IntoIterator<Item = Uuid>,
    ) -> Self {
        Self {
            board_id,
            owner_id,
            members: members.into_iter().collect(),
        }
    }

    /// Loads the membership snapshot for a board
    ///
    /// Returns `None` when the board does not exist. Run this on the same
    /// transaction as the write it authorizes so both observe one snapshot.
    pub async fn load(
        executor: impl PgExecutor<'_>,
        board_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let row: Option<(Uuid, Uuid, Vec<Uuid>)> = sqlx::query_as(
            r#"
            SELECT b.id,
                   b.owner_id,
                   COALESCE(
                       array_agg(m.user_id) FILTER (WHERE m.user_id IS NOT NULL),
                       '{}'
                   ) AS member_ids
            FROM boards b
            LEFT JOIN board_members m ON m.board_id = b.id
            WHERE b.id = $1
            GROUP BY b.id, b.owner_id
            "#,
        )
        .bind(board_id)
        .fetch_optional(executor)
        .await?;

        Ok(row.map(|(id, owner_id, member_ids)| Self::from_parts(id, owner_id, member_ids)))
    }

    /// The board this snapshot describes
    pub fn board_id(&self) -> Uuid {
        self.board_id
    }

    /// The board's owner
    pub fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    /// Checks whether a user is a board participant
    ///
    /// True iff the user is the owner or appears in the member set.
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id || self.members.contains(&user_id)
    }

    /// Authorizes board-level access
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::AccessDenied`] when the user is not a
    /// participant. Callers must run this before acting on the board or
    /// anything it contains.
    pub fn authorize(&self, user_id: Uuid) -> Result<(), AccessError> {
        if self.is_participant(user_id) {
            Ok(())
        } else {
            Err(AccessError::AccessDenied)
        }
    }

    /// Authorizes an owner-only mutation
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::NotOwner`] for any requester other than the
    /// board owner, participants included.
    pub fn require_owner(&self, user_id: Uuid) -> Result<(), AccessError> {
        if self.owner_id == user_id {
            Ok(())
        } else {
            Err(AccessError::NotOwner)
        }
    }

    /// Validates a proposed assignee or reviewer
    ///
    /// `None` is always valid: unassigning is allowed. A present candidate
    /// must be a board participant.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::InvalidParticipant`] naming the offending
    /// field.
    pub fn validate_participant(
        &self,
        field: ParticipantField,
        candidate: Option<Uuid>,
    ) -> Result<(), AccessError> {
        match candidate {
            None => Ok(()),
            Some(user_id) if self.is_participant(user_id) => Ok(()),
            Some(_) => Err(AccessError::InvalidParticipant { field }),
        }
    }
}

/// Rejects any attempt to move a task between boards
///
/// A patch that does not mention the board (`None`) or restates the current
/// board is fine; naming any other board is rejected regardless of the
/// requester's permissions.
///
/// # Errors
///
/// Returns [`AccessError::BoardReassignmentForbidden`].
pub fn ensure_board_unchanged(
    current_board: Uuid,
    proposed_board: Option<Uuid>,
) -> Result<(), AccessError> {
    match proposed_board {
        Some(proposed) if proposed != current_board => {
            Err(AccessError::BoardReassignmentForbidden)
        }
        _ => Ok(()),
    }
}

/// Authorizes a comment deletion
///
/// The requester must still be a board participant to even see the comment;
/// past that, only the comment's author and the board owner (acting as
/// moderator) may delete it. A non-participant therefore gets
/// [`AccessError::AccessDenied`] before any author check happens.
///
/// # Errors
///
/// Returns [`AccessError::AccessDenied`] or
/// [`AccessError::CommentDeleteForbidden`].
pub fn authorize_comment_delete(
    policy: &BoardPolicy,
    requester: Uuid,
    comment_author: Uuid,
) -> Result<(), AccessError> {
    policy.authorize(requester)?;

    if requester == comment_author || requester == policy.owner_id() {
        Ok(())
    } else {
        Err(AccessError::CommentDeleteForbidden)
    }
}

/// Normalizes a requested member list for persistence
///
/// Deduplicates while preserving request order and guarantees the owner is
/// present, whatever the caller sent: an omitted owner is re-added, a
/// twice-listed owner collapses to one entry. This is the owner-is-always-
/// a-member invariant as a pure function, applied on every board create and
/// on every member-set replacement.
pub fn normalize_members(owner_id: Uuid, requested: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(requested.len() + 1);

    seen.insert(owner_id);
    normalized.push(owner_id);

    for &user_id in requested {
        if seen.insert(user_id) {
            normalized.push(user_id);
        }
    }

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn test_participant_oracle() {
        let [owner, member, outsider] = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        let policy = BoardPolicy::from_parts(Uuid::new_v4(), owner, [member]);

        assert!(policy.is_participant(owner));
        assert!(policy.is_participant(member));
        assert!(!policy.is_participant(outsider));
    }

    #[test]
    fn test_owner_is_participant_even_without_membership_row() {
        let owner = Uuid::new_v4();
        let policy = BoardPolicy::from_parts(Uuid::new_v4(), owner, []);

        assert!(policy.is_participant(owner));
        assert!(policy.authorize(owner).is_ok());
    }

    #[test]
    fn test_authorize_denies_outsider() {
        let owner = Uuid::new_v4();
        let policy = BoardPolicy::from_parts(Uuid::new_v4(), owner, []);

        let err = policy.authorize(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, AccessError::AccessDenied));
    }

    #[test]
    fn test_require_owner_rejects_plain_member() {
        let [owner, member] = [Uuid::new_v4(), Uuid::new_v4()];
        let policy = BoardPolicy::from_parts(Uuid::new_v4(), owner, [member]);

        assert!(policy.require_owner(owner).is_ok());
        assert!(matches!(
            policy.require_owner(member).unwrap_err(),
            AccessError::NotOwner
        ));
    }

    #[test]
    fn test_validate_participant_accepts_owner_member_and_none() {
        let [owner, member, outsider] = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        let policy = BoardPolicy::from_parts(Uuid::new_v4(), owner, [member]);

        for field in [ParticipantField::Assignee, ParticipantField::Reviewer] {
            assert!(policy.validate_participant(field, None).is_ok());
            assert!(policy.validate_participant(field, Some(owner)).is_ok());
            assert!(policy.validate_participant(field, Some(member)).is_ok());
        }

        let err = policy
            .validate_participant(ParticipantField::Reviewer, Some(outsider))
            .unwrap_err();
        match err {
            AccessError::InvalidParticipant { field } => {
                assert_eq!(field, ParticipantField::Reviewer);
                assert_eq!(field.as_str(), "reviewer");
            }
            other => panic!("expected InvalidParticipant, got {other:?}"),
        }
    }

    #[test]
    fn test_board_reassignment_rejected_for_any_other_board() {
        let current = Uuid::new_v4();

        assert!(ensure_board_unchanged(current, None).is_ok());
        assert!(ensure_board_unchanged(current, Some(current)).is_ok());
        assert!(matches!(
            ensure_board_unchanged(current, Some(Uuid::new_v4())).unwrap_err(),
            AccessError::BoardReassignmentForbidden
        ));
    }

    #[test]
    fn test_comment_delete_author_and_owner_only() {
        let [owner, author, bystander, outsider] =
            [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        let policy = BoardPolicy::from_parts(Uuid::new_v4(), owner, [author, bystander]);

        // Author may delete their own comment.
        assert!(authorize_comment_delete(&policy, author, author).is_ok());

        // The owner moderates everyone's comments.
        assert!(authorize_comment_delete(&policy, owner, author).is_ok());

        // Another member can view but never delete.
        assert!(matches!(
            authorize_comment_delete(&policy, bystander, author).unwrap_err(),
            AccessError::CommentDeleteForbidden
        ));

        // A non-participant fails the access check before the author check.
        assert!(matches!(
            authorize_comment_delete(&policy, outsider, author).unwrap_err(),
            AccessError::AccessDenied
        ));
    }

    #[test]
    fn test_normalize_members_adds_missing_owner() {
        let owner = Uuid::new_v4();
        let others = ids(2);

        let normalized = normalize_members(owner, &others);
        assert_eq!(normalized[0], owner);
        assert_eq!(&normalized[1..], &others[..]);
    }

    #[test]
    fn test_normalize_members_is_idempotent_for_owner() {
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();

        // Owner listed twice plus a duplicate member: owner present exactly
        // once, duplicates collapsed.
        let normalized = normalize_members(owner, &[owner, member, owner, member]);
        assert_eq!(normalized, vec![owner, member]);

        // Re-normalizing the result changes nothing.
        assert_eq!(normalize_members(owner, &normalized), normalized);
    }

    #[test]
    fn test_normalize_members_empty_request_keeps_owner() {
        // Creating a board with no initial members still yields {owner}.
        let owner = Uuid::new_v4();
        assert_eq!(normalize_members(owner, &[]), vec![owner]);
    }

    #[test]
    fn test_member_removal_keeps_owner_and_stale_assignee_unchecked() {
        let [owner, member] = [Uuid::new_v4(), Uuid::new_v4()];

        // Owner adds a member and assigns them.
        let policy = BoardPolicy::from_parts(Uuid::new_v4(), owner, [owner, member]);
        assert!(policy
            .validate_participant(ParticipantField::Assignee, Some(member))
            .is_ok());

        // Owner replaces the member set omitting the member; normalization
        // retains the owner only.
        let replacement = normalize_members(owner, &[owner]);
        assert_eq!(replacement, vec![owner]);

        let updated = BoardPolicy::from_parts(policy.board_id(), owner, replacement);
        assert!(!updated.is_participant(member));

        // A patch that does not touch the assignee is not re-validated, so
        // the stale assignee survives; re-proposing the same assignee now
        // fails.
        assert!(updated
            .validate_participant(ParticipantField::Assignee, None)
            .is_ok());
        assert!(updated
            .validate_participant(ParticipantField::Assignee, Some(member))
            .is_err());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AccessError::AccessDenied.to_string(),
            "You do not have access to this board"
        );
        assert_eq!(
            AccessError::InvalidParticipant {
                field: ParticipantField::Assignee
            }
            .to_string(),
            "Selected assignee must be a board member"
        );
        assert_eq!(AccessError::NotFound("board").to_string(), "board not found");
    }
}
