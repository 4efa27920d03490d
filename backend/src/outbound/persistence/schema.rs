//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation. When migrations change the schema, update this file to match
//! (`diesel print-schema` can regenerate it from a live database).

diesel::table! {
    /// User accounts.
    users (id) {
        id -> Int4,
        /// Unique login name, matched case-sensitively.
        username -> Varchar,
        /// Argon2id PHC-format hash; never leaves the persistence layer.
        password_hash -> Varchar,
        full_name -> Varchar,
        /// One of `admin`, `staff`, `tech`.
        role -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Repair jobs. `job_ref` is the customer-facing reference and primary
    /// key; serial, monotonic, never reused.
    jobs (job_ref) {
        job_ref -> Int4,
        customer_name -> Varchar,
        contact_number -> Varchar,
        job_details -> Text,
        booked_in_by -> Varchar,
        /// Whole pounds, never negative.
        deposit_paid -> Int4,
        manufacturer -> Varchar,
        device_type -> Varchar,
        serial_number -> Nullable<Varchar>,
        additional_notes -> Text,
        /// One of the five status display strings.
        status -> Varchar,
        checked_in_date -> Timestamptz,
        created_by -> Nullable<Int4>,
        updated_by -> Nullable<Int4>,
    }
}

diesel::table! {
    /// Engineer findings; at most one row per job, upsert-enforced.
    engineer_reports (id) {
        id -> Int4,
        job_ref -> Int4,
        engineer_name -> Varchar,
        time_spent -> Varchar,
        repair_notes -> Text,
        updated_by -> Nullable<Int4>,
    }
}

diesel::table! {
    /// Append-only audit trail.
    activity_logs (id) {
        id -> Int4,
        user_id -> Int4,
        activity_type -> Varchar,
        details -> Text,
        timestamp -> Timestamptz,
    }
}

diesel::table! {
    /// One row per SMS attempt, success or failure.
    sms_notifications (id) {
        id -> Int4,
        job_ref -> Int4,
        /// Username, not id: history survives account deletion.
        sent_by -> Varchar,
        recipient -> Varchar,
        message -> Text,
        /// `sent` or `failed`.
        status -> Varchar,
        sent_at -> Timestamptz,
    }
}

diesel::joinable!(engineer_reports -> jobs (job_ref));
diesel::joinable!(activity_logs -> users (user_id));
diesel::joinable!(sms_notifications -> jobs (job_ref));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    jobs,
    engineer_reports,
    activity_logs,
    sms_notifications,
);
