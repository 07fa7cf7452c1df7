use secrecy::SecretString;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub auth_url: String,
    pub firestore_url: String,
    pub project_id: String,
    pub api_key: SecretString,
    pub token_cache: PathBuf,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(auth_url: String, firestore_url: String) -> Self {
        Self {
            auth_url,
            firestore_url,
            project_id: String::new(),
            api_key: SecretString::default(),
            token_cache: PathBuf::new(),
        }
    }

    pub fn set_api_key(&mut self, api_key: SecretString) {
        self.api_key = api_key;
    }
}
