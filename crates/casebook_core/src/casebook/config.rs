/// Name of the Managing Partner account present in every new registry.
pub const DEFAULT_SEED_NAME: &str = "Admin";
/// Email of the Managing Partner account present in every new registry.
pub const DEFAULT_SEED_EMAIL: &str = "admin@example.com";

/// Startup configuration of a casebook.
///
/// The identity registry is created with exactly one approved Managing
/// Partner, so that someone is able to approve the first registrations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CasebookConfig {
    pub seed_name: String,
    pub seed_email: String,
}

impl Default for CasebookConfig {
    fn default() -> Self {
        Self { seed_name: DEFAULT_SEED_NAME.to_string(), seed_email: DEFAULT_SEED_EMAIL.to_string() }
    }
}

impl CasebookConfig {
    pub fn with_seed_partner(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.seed_name = name.into();
        self.seed_email = email.into();
        self
    }
}
