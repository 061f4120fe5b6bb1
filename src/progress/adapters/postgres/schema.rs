//! Diesel schema for level catalog and user persistence.

diesel::table! {
    /// Level catalog ordered by XP threshold.
    levels (id) {
        /// Level identifier.
        id -> Uuid,
        /// Display name of the level.
        #[max_length = 100]
        name -> Varchar,
        /// Minimum XP for membership; unique across the catalog.
        xp_required -> Int8,
    }
}

diesel::table! {
    /// User accounts with XP and current level.
    users (id) {
        /// User identifier.
        id -> Uuid,
        /// Display name.
        #[max_length = 200]
        display_name -> Varchar,
        /// Non-negative XP counter.
        xp -> Int8,
        /// Current level membership.
        level_id -> Uuid,
        /// Optimistic-concurrency revision.
        revision -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(users -> levels (level_id));
diesel::allow_tables_to_appear_in_same_query!(levels, users);
