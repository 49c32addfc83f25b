//! Closed-form identity derivations.
//!
//! Every function maps a position in the generation order to a 1-based
//! identifier without loops, lookups, or state, so independent generators
//! agree on the reference space from configuration alone. Inputs are assumed
//! to be inside a validated [`FixtureLayout`](crate::FixtureLayout); use the
//! layout's checked accessors when that is not guaranteed.

/// First user of the contiguous member block that `group_id` belongs to.
///
/// Groups `1..=m` share users `1..=m`, groups `m+1..=2m` share users
/// `m+1..=2m`, and so on.
pub const fn owner_user_of(group_id: u64, members_per_group: u64) -> u64 {
    (group_id - 1) / members_per_group * members_per_group + 1
}

/// User id of the `member_index`-th (0-based) member of `group_id`.
pub const fn member_user_of(group_id: u64, member_index: u64, members_per_group: u64) -> u64 {
    owner_user_of(group_id, members_per_group) + member_index
}

/// Dense membership row id: memberships are emitted group by group.
pub const fn membership_id_of(group_id: u64, member_index: u64, members_per_group: u64) -> u64 {
    (group_id - 1) * members_per_group + member_index + 1
}

/// First challenge id owned by the `member_index`-th member of `group_id`.
pub const fn base_challenge_of(
    group_id: u64,
    member_index: u64,
    challenges_per_member: u64,
    challenges_per_group: u64,
) -> u64 {
    (group_id - 1) * challenges_per_group + member_index * challenges_per_member + 1
}

/// First task id slot of `challenge_id`.
pub const fn base_task_of(challenge_id: u64, tasks_per_challenge: u64) -> u64 {
    (challenge_id - 1) * tasks_per_challenge + 1
}

/// Index of the member that hunts the failed tasks of `member_index`.
pub const fn hunter_index_of(member_index: u64, members_per_group: u64) -> u64 {
    (member_index + 1) % members_per_group
}

/// User id of the circularly-next member of `group_id`.
///
/// The hunter is resolved inside the group's own member block, so it is
/// always a member of the group and differs from the owner whenever the group
/// has at least two members.
pub const fn hunter_of(group_id: u64, member_index: u64, members_per_group: u64) -> u64 {
    member_user_of(
        group_id,
        hunter_index_of(member_index, members_per_group),
        members_per_group,
    )
}
