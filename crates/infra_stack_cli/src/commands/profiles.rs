use infra_stack_core::ProfileCatalog;

pub fn render_profiles(catalog: &ProfileCatalog) -> String {
    let mut lines = Vec::new();
    for profile in catalog.iter() {
        lines.push(profile.name.clone());
        lines.push(format!("  required: {}", profile.required_keys.join(", ")));
        if !profile.tables.is_empty() {
            let tables: Vec<String> = profile
                .tables
                .iter()
                .map(|table| format!("{} <- {}", table.logical_id, table.setting_key))
                .collect();
            lines.push(format!("  tables: {}", tables.join(", ")));
        }
        if !profile.managed_policies.is_empty() {
            lines.push(format!(
                "  managed policies: {}",
                profile.managed_policies.join(", ")
            ));
        }
        lines.push(format!(
            "  function url auth: {}",
            profile.public_url_auth.as_lambda_str()
        ));
    }
    lines.join("\n")
}
