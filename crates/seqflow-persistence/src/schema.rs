//! Esquema Diesel (mantenido a mano; reemplazable con `diesel print-schema`).

diesel::table! {
    workflows (id) {
        id -> Uuid,
        name -> Text,
        tag -> Text,
    }
}

diesel::table! {
    workflow_versions (id) {
        id -> Uuid,
        workflow_id -> Uuid,
        version -> Int4,
        url -> Text,
        fields -> Jsonb,
        created -> Timestamptz,
    }
}

diesel::table! {
    workflow_configurations (id) {
        id -> Uuid,
        workflow_id -> Uuid,
        tag -> Text,
        system_job_order -> Jsonb,
        default_vm_strategy_id -> Uuid,
        share_group_id -> Uuid,
    }
}

diesel::table! {
    vm_strategies (id) {
        id -> Uuid,
        name -> Text,
        vm_flavor -> Text,
        vm_settings -> Jsonb,
        volume_size_base -> Int4,
        volume_size_factor -> Int4,
    }
}

diesel::table! {
    share_groups (id) {
        id -> Uuid,
        name -> Text,
        email -> Nullable<Text>,
    }
}

diesel::table! {
    job_file_stage_groups (id) {
        id -> Uuid,
        user_id -> Uuid,
        created -> Timestamptz,
    }
}

diesel::table! {
    dds_job_input_files (id) {
        id -> Uuid,
        stage_group_id -> Uuid,
        project_id -> Text,
        file_id -> Text,
        credential_id -> Uuid,
        destination_path -> Text,
        size -> Int8,
    }
}

diesel::table! {
    url_job_input_files (id) {
        id -> Uuid,
        stage_group_id -> Uuid,
        url -> Text,
        destination_path -> Text,
        size -> Int8,
    }
}

diesel::table! {
    jobs (id) {
        id -> Uuid,
        user_id -> Uuid,
        workflow_version_id -> Uuid,
        vm_strategy_id -> Uuid,
        stage_group_id -> Uuid,
        share_group_id -> Uuid,
        name -> Text,
        fund_code -> Text,
        job_order -> Text,
        state -> Text,
        step -> Text,
        created -> Timestamptz,
        last_updated -> Timestamptz,
    }
}

diesel::table! {
    job_activities (id) {
        id -> Int8,
        job_id -> Uuid,
        state -> Text,
        step -> Text,
        created -> Timestamptz,
    }
}

diesel::table! {
    lando_connections (id) {
        id -> Uuid,
        host -> Text,
        username -> Text,
        password -> Text,
        queue_name -> Text,
    }
}

diesel::allow_tables_to_appear_in_same_query!(workflows,
                                              workflow_versions,
                                              workflow_configurations,
                                              vm_strategies,
                                              share_groups,
                                              job_file_stage_groups,
                                              dds_job_input_files,
                                              url_job_input_files,
                                              jobs,
                                              job_activities,
                                              lando_connections,);
