diesel::table! {
    timeslots (id) {
        id -> Uuid,
        counselor_id -> Int8,
        date -> Date,
        start_hour -> Int2,
        available -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    appointments (id) {
        id -> Uuid,
        student_id -> Int8,
        counselor_id -> Int8,
        timeslot_id -> Nullable<Uuid>,
        program -> Text,
        status -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(appointments -> timeslots (timeslot_id));
diesel::allow_tables_to_appear_in_same_query!(appointments, timeslots);
