use infra_stack_core::{
    validate_required, ConfigError, SettingsSource, StackProfile, ValidatedSettings,
};
use tracing::info;

pub fn run_validate(
    profile: &StackProfile,
    source: &SettingsSource,
) -> Result<ValidatedSettings, ConfigError> {
    let validated = validate_required(source, &profile.required_keys)?;
    let keys: Vec<&str> = validated.keys().collect();
    info!(
        profile = %profile.name,
        keys = ?keys,
        "all required settings present"
    );
    Ok(validated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_missing_key_by_name() {
        let profile = StackProfile::minimal();
        let source: SettingsSource = profile
            .required_keys
            .iter()
            .filter(|key| key.as_str() != "S3_BUCKET_NAME")
            .map(|key| (key.clone(), "set".to_string()))
            .collect();

        let error = run_validate(&profile, &source).expect_err("validation should fail");
        assert_eq!(
            error.to_string(),
            "S3_BUCKET_NAME environment variable is not set"
        );
    }

    #[test]
    fn returns_exactly_the_required_keys() {
        let profile = StackProfile::minimal();
        let source: SettingsSource = profile
            .required_keys
            .iter()
            .map(|key| (key.clone(), "set".to_string()))
            .chain([("PATH".to_string(), "/usr/bin".to_string())])
            .collect();

        let validated = run_validate(&profile, &source).expect("validation should pass");
        assert_eq!(validated.len(), profile.required_keys.len());
        assert_eq!(validated.get("PATH"), None);
    }
}
