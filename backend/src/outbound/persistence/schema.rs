//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Portal accounts. `email` is unique and stored lower-cased.
    users (id) {
        id -> Uuid,
        name -> Varchar,
        email -> Varchar,
        /// PHC-formatted hash, or a legacy plain value awaiting migration.
        password -> Varchar,
        role -> Varchar,
        student_id -> Nullable<Varchar>,
        department -> Nullable<Varchar>,
        semester -> Nullable<Int2>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Courses. Both `course_code` and `course_name` are unique.
    courses (id) {
        id -> Uuid,
        course_code -> Varchar,
        course_name -> Varchar,
        credits -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Student registrations. `position` preserves registration order.
    course_registrations (course_id, user_id) {
        course_id -> Uuid,
        user_id -> Uuid,
        position -> Int4,
        registered_at -> Timestamptz,
    }
}

diesel::table! {
    /// Graded results, unique per `(user_id, course_id)`.
    results (id) {
        id -> Uuid,
        user_id -> Uuid,
        course_id -> Uuid,
        score -> Int2,
        grade -> Varchar,
        grade_point -> Float8,
        /// Null only for rows written before dates were mandatory.
        date_achieved -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(course_registrations -> courses (course_id));
diesel::joinable!(course_registrations -> users (user_id));
diesel::joinable!(results -> courses (course_id));
diesel::joinable!(results -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(course_registrations, courses, results, users);
