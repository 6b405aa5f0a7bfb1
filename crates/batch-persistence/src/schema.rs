//! Esquema Diesel (escrito a mano). Reemplazable con `diesel print-schema`.

diesel::table! {
    step_execution (id) {
        id -> Uuid,
        job_execution_id -> Uuid,
        step_name -> Text,
        status -> Text,
        exit_code -> Text,
        exit_description -> Text,
        start_time -> Nullable<Timestamptz>,
        end_time -> Nullable<Timestamptz>,
        version -> Integer,
        last_updated -> Timestamptz,
    }
}

diesel::table! {
    step_execution_checkpoint (seq) {
        seq -> BigInt,
        step_execution_id -> Uuid,
        status -> Text,
        ts -> Timestamptz,
        payload -> Jsonb,
    }
}

diesel::joinable!(step_execution_checkpoint -> step_execution (step_execution_id));

diesel::allow_tables_to_appear_in_same_query!(
    step_execution,
    step_execution_checkpoint,
);
