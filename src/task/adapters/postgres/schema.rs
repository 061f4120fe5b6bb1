//! Diesel schema for task lifecycle persistence.

diesel::table! {
    /// Tasks owned by users.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning user.
        owner_id -> Uuid,
        /// Task name.
        #[max_length = 200]
        name -> Varchar,
        /// Free-form note.
        note -> Nullable<Text>,
        /// Category labels as a JSON array of strings.
        categories -> Jsonb,
        /// Importance flag.
        is_important -> Bool,
        /// Urgency flag.
        is_urgent -> Bool,
        /// Deadline.
        deadline -> Timestamptz,
        /// Task status (`NOT_DONE`, `OVERDUE`, `COMPLETED`).
        #[max_length = 20]
        status -> Varchar,
        /// Completion timestamp.
        completed_at -> Nullable<Timestamptz>,
        /// Ordered subtasks as a JSON array.
        subtasks -> Jsonb,
        /// Date of the linked daily record.
        daily_record_date -> Nullable<Date>,
        /// Optimistic-concurrency revision.
        revision -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Per-user, per-day completion records.
    daily_task_records (user_id, date) {
        /// Owning user.
        user_id -> Uuid,
        /// UTC calendar date.
        date -> Date,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(tasks, daily_task_records);
