use serde::Deserialize;

// Session authority configuration.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    // Collection holding privilege records keyed by user id.
    privilege_collection: Option<String>,
    // Whether signup writes a privilege record for the new account.
    grant_admin_on_signup: Option<bool>,
    // Minimum password length accepted by local validation.
    min_password_length: Option<usize>,
}

impl Config {
    const DEFAULT_PRIVILEGE_COLLECTION: &'static str = "admins";
    const DEFAULT_GRANT_ADMIN_ON_SIGNUP: bool = true;
    const DEFAULT_MIN_PASSWORD_LENGTH: usize = 6;

    pub fn set_privilege_collection(&mut self, val: &mut Option<String>) {
        if let Some(val) = val.take() {
            self.privilege_collection = Some(val)
        }
    }
    pub fn set_grant_admin_on_signup(&mut self, val: Option<bool>) {
        if let Some(val) = val {
            self.grant_admin_on_signup = Some(val)
        }
    }
    pub fn set_min_password_length(&mut self, val: Option<usize>) {
        if let Some(val) = val {
            self.min_password_length = Some(std::cmp::max(val, 1));
        }
    }
    pub(crate) fn override_merge(&mut self, other: &mut Config) {
        self.set_privilege_collection(&mut other.privilege_collection);
        self.set_grant_admin_on_signup(other.grant_admin_on_signup);
        self.set_min_password_length(other.min_password_length);
    }

    pub fn privilege_collection(&self) -> &str {
        self.privilege_collection
            .as_deref()
            .unwrap_or(Config::DEFAULT_PRIVILEGE_COLLECTION)
    }

    pub fn grant_admin_on_signup(&self) -> bool {
        self.grant_admin_on_signup
            .unwrap_or(Config::DEFAULT_GRANT_ADMIN_ON_SIGNUP)
    }

    pub fn min_password_length(&self) -> usize {
        self.min_password_length
            .unwrap_or(Config::DEFAULT_MIN_PASSWORD_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.privilege_collection(), "admins");
        assert!(config.grant_admin_on_signup());
        assert_eq!(config.min_password_length(), 6);
    }

    #[test]
    fn override_merge_keeps_unset_values() {
        let mut base: Config = serde_yaml::from_str("privilege_collection: staff").unwrap();
        let mut other = Config::default();
        other.set_grant_admin_on_signup(Some(false));
        other.set_min_password_length(Some(0));

        base.override_merge(&mut other);
        assert_eq!(base.privilege_collection(), "staff");
        assert!(!base.grant_admin_on_signup());
        assert_eq!(base.min_password_length(), 1);
    }
}
