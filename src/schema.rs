// Kept in sync by hand with `CREATE_TABLES` in `store.rs`.

diesel::table! {
    faculty (id) {
        id -> Integer,
        name -> Text,
        credential -> Text,
        created_at -> Timestamp,
    }
}

diesel::table! {
    sections (id) {
        id -> Integer,
        name -> Text,
        is_original -> Bool,
        created_at -> Timestamp,
    }
}

diesel::table! {
    subjects (id) {
        id -> Integer,
        name -> Text,
        program -> Text,
        year -> Text,
        branch -> Text,
        created_at -> Timestamp,
    }
}

diesel::table! {
    students (id) {
        id -> Integer,
        ht_number -> Text,
        name -> Text,
        manipulated_section_id -> Integer,
        original_section_id -> Integer,
        created_at -> Timestamp,
    }
}

diesel::table! {
    attendance (id) {
        id -> Integer,
        student_id -> Integer,
        faculty_id -> Integer,
        subject_id -> Integer,
        section_id -> Integer,
        date -> Date,
        time -> Time,
        period -> Text,
        status -> Text,
        created_at -> Timestamp,
    }
}

diesel::table! {
    faculty_workload (id) {
        id -> Integer,
        faculty_id -> Integer,
        section_id -> Integer,
        subject_id -> Integer,
        date -> Date,
        time -> Time,
        period -> Text,
        created_at -> Timestamp,
    }
}

diesel::joinable!(attendance -> students (student_id));
diesel::joinable!(attendance -> faculty (faculty_id));
diesel::joinable!(attendance -> subjects (subject_id));
diesel::joinable!(attendance -> sections (section_id));
diesel::joinable!(faculty_workload -> faculty (faculty_id));
diesel::joinable!(faculty_workload -> subjects (subject_id));
diesel::joinable!(faculty_workload -> sections (section_id));

diesel::allow_tables_to_appear_in_same_query!(
    attendance,
    faculty,
    faculty_workload,
    sections,
    students,
    subjects,
);
