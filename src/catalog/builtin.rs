//! Connector schemas shipped with the crate.
//!
//! Covers the platform's built-in utilities plus a handful of common
//! connectors. Everything else is resolved through catalog files; see
//! `catalog::file`.

use super::{ProviderSchema, SchemaCatalog, SchemaEntry, ValueKind};

pub fn catalog() -> SchemaCatalog {
    SchemaCatalog::empty()
        // ---------------------------------------------------------------------
        // Platform utilities (no connection)
        // ---------------------------------------------------------------------
        .with_provider(
            ProviderSchema::new("clock")
                .exhaustive()
                .connectionless()
                .operation(
                    SchemaEntry::trigger("scheduled_event")
                        .optional("time_unit", ValueKind::String)
                        .optional("trigger_every", ValueKind::Integer)
                        .optional("start_after", ValueKind::String),
                ),
        )
        .with_provider(
            ProviderSchema::new("logger")
                .exhaustive()
                .connectionless()
                .operation(
                    SchemaEntry::action("log_message")
                        .required("message", ValueKind::String)
                        .optional("user_logger", ValueKind::Boolean),
                ),
        )
        .with_provider(
            ProviderSchema::new("email")
                .exhaustive()
                .connectionless()
                .operation(
                    SchemaEntry::action("send_mail")
                        .required("to", ValueKind::String)
                        .required("subject", ValueKind::String)
                        .optional("message", ValueKind::String)
                        .optional("cc", ValueKind::String),
                ),
        )
        .with_provider(
            ProviderSchema::new("workato_recipe_function")
                .exhaustive()
                .connectionless()
                .operation(SchemaEntry::trigger("execute").optional("parameters_schema_json", ValueKind::String))
                .operation(
                    SchemaEntry::action("call_recipe")
                        .required("flow_id", ValueKind::Any)
                        .optional("parameters", ValueKind::Object),
                )
                .operation(SchemaEntry::action("return_result").optional("result", ValueKind::Object)),
        )
        .with_provider(
            ProviderSchema::new("workato_variable")
                .connectionless()
                .operation(SchemaEntry::action("declare_variable").required("variables", ValueKind::Object))
                .operation(
                    SchemaEntry::action("update_variables")
                        .required("name", ValueKind::DataPillOnly)
                        .optional("value", ValueKind::Any),
                ),
        )
        .with_provider(
            ProviderSchema::new("workato_webhooks")
                .connectionless()
                .operation(SchemaEntry::trigger("new_event").optional("webhook_path", ValueKind::String)),
        )
        // ---------------------------------------------------------------------
        // Connectors
        // ---------------------------------------------------------------------
        .with_provider(
            ProviderSchema::new("salesforce")
                .operation(SchemaEntry::trigger("new_sobject").required("sobject_name", ValueKind::String))
                .operation(SchemaEntry::trigger("updated_sobject").required("sobject_name", ValueKind::String))
                .operation(
                    SchemaEntry::action("create_record")
                        .required("sobject_name", ValueKind::String)
                        .optional("fields", ValueKind::Object),
                )
                .operation(
                    SchemaEntry::action("update_record")
                        .required("sobject_name", ValueKind::String)
                        .required("id", ValueKind::String)
                        .optional("fields", ValueKind::Object),
                )
                .operation(
                    SchemaEntry::action("search_records")
                        .required("sobject_name", ValueKind::String)
                        .optional("limit", ValueKind::Integer),
                )
                .operation(
                    SchemaEntry::action("get_record_by_id")
                        .required("sobject_name", ValueKind::String)
                        .required("id", ValueKind::String),
                ),
        )
        .with_provider(
            ProviderSchema::new("box")
                .operation(SchemaEntry::trigger("new_file_in_folder").required("folder_id", ValueKind::String))
                .operation(
                    SchemaEntry::action("upload_file")
                        .required("folder_id", ValueKind::String)
                        .required("file_name", ValueKind::String)
                        .required("content", ValueKind::Any),
                )
                .operation(SchemaEntry::action("download_file").required("file_id", ValueKind::String)),
        )
        .with_provider(
            ProviderSchema::new("slack")
                .operation(SchemaEntry::trigger("new_message").required("channel", ValueKind::String))
                .operation(
                    SchemaEntry::action("post_message")
                        .required("channel", ValueKind::String)
                        .required("text", ValueKind::String)
                        .optional("thread_ts", ValueKind::String),
                ),
        )
        .with_provider(
            ProviderSchema::new("rest")
                .operation(
                    SchemaEntry::action("make_request")
                        .required("method", ValueKind::String)
                        .required("url", ValueKind::String)
                        .optional("headers", ValueKind::Object)
                        .optional("body", ValueKind::Any),
                ),
        )
}
